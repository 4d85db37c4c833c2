// ABOUTME: In-memory storage backend for tests, the CLI, and single-process deployments
// ABOUTME: A tokio RwLock guards all aggregates; commits swap the whole plan under the write lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use pierre_training_core::errors::StorageError;
use pierre_training_core::models::{PlanAdaptation, PlanStatus, TrainingPlan, UserProfile};

use super::{AdaptationRepository, PlanCommit, PlanRepository, ProfileRepository};

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<Uuid, UserProfile>,
    plans: HashMap<Uuid, TrainingPlan>,
    adaptations: Vec<PlanAdaptation>,
}

/// Storage backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn insert_plan(&self, plan: &TrainingPlan) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.plans.contains_key(&plan.id) {
            return Err(StorageError::DuplicatePlan { plan_id: plan.id });
        }
        if plan.status == PlanStatus::Active
            && state
                .plans
                .values()
                .any(|p| p.user_id == plan.user_id && p.status == PlanStatus::Active)
        {
            return Err(StorageError::ActivePlanExists {
                user_id: plan.user_id,
            });
        }
        state.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_plan_with_details(&self, plan_id: Uuid) -> Result<TrainingPlan, StorageError> {
        self.state
            .read()
            .await
            .plans
            .get(&plan_id)
            .cloned()
            .ok_or(StorageError::PlanNotFound { plan_id })
    }

    async fn active_plan_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TrainingPlan>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .plans
            .values()
            .find(|p| p.user_id == user_id && p.status == PlanStatus::Active)
            .cloned())
    }

    async fn commit_adaptation(&self, commit: &PlanCommit) -> Result<u64, StorageError> {
        let plan_id = commit.plan.id;
        let mut state = self.state.write().await;
        let stored = state
            .plans
            .get(&plan_id)
            .ok_or(StorageError::PlanNotFound { plan_id })?;
        if stored.version != commit.expected_version {
            return Err(StorageError::ConcurrentConflict {
                plan_id,
                expected_version: commit.expected_version,
            });
        }

        let plan = commit.committed_plan();
        let version = plan.version;
        state.plans.insert(plan_id, plan);
        if let Some(adaptation) = &commit.adaptation {
            state.adaptations.push(adaptation.clone());
        }
        Ok(version)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, StorageError> {
        self.state
            .read()
            .await
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or(StorageError::ProfileNotFound { user_id })
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl AdaptationRepository for InMemoryStore {
    async fn list_adaptations(&self, plan_id: Uuid) -> Result<Vec<PlanAdaptation>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .adaptations
            .iter()
            .filter(|adaptation| adaptation.plan_id == plan_id)
            .cloned()
            .collect())
    }
}
