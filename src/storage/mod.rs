// ABOUTME: Storage ports for the plan, profile, and adaptation aggregates
// ABOUTME: PlanCommit bundles week rewrites and the audit record into one atomic unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Storage Ports
//!
//! One narrow interface per aggregate root. The engine depends only on
//! [`PersistenceGateway`], never on a concrete backend.
//!
//! Adaptations are written through [`PlanRepository::commit_adaptation`]: the
//! plan header, every changed or removed week, and the [`PlanAdaptation`]
//! record are applied in one transaction guarded by the plan version read at
//! load time. A reader sees either the whole adaptation or none of it.
//!
//! Backends:
//! - [`memory::InMemoryStore`]: tokio `RwLock`, whole-aggregate swap
//! - `sqlite::SqliteStore` (feature `sqlite`): sqlx, one transaction per commit

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use pierre_training_core::errors::StorageError;
use pierre_training_core::models::{PlanAdaptation, TrainingPlan, UserProfile};

/// Atomic write of an adapted plan
#[derive(Debug, Clone)]
pub struct PlanCommit {
    /// Plan state after the mutation; its `version` is assigned by the store
    pub plan: TrainingPlan,
    /// Week numbers whose content changed (or that were appended)
    pub changed_weeks: Vec<u32>,
    /// Week numbers that no longer exist (timeline compression)
    pub removed_weeks: Vec<u32>,
    /// Version read before mutating; the commit fails if it moved
    pub expected_version: u64,
    /// Audit record; `None` for workout status updates, which are not adaptations
    pub adaptation: Option<PlanAdaptation>,
}

impl PlanCommit {
    /// Version the plan carries once this commit lands
    #[must_use]
    pub const fn next_version(&self) -> u64 {
        self.expected_version + 1
    }

    /// Plan as stored after the commit
    #[must_use]
    pub fn committed_plan(&self) -> TrainingPlan {
        let mut plan = self.plan.clone();
        plan.version = self.next_version();
        plan
    }
}

/// Plan aggregate storage
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Store a freshly generated plan
    ///
    /// Fails with `ActivePlanExists` when the owner already has an Active plan
    /// and with `DuplicatePlan` when the plan id is taken. Neither overwrites.
    async fn insert_plan(&self, plan: &TrainingPlan) -> Result<(), StorageError>;

    /// Load a plan with all weeks and workouts
    async fn get_plan_with_details(&self, plan_id: Uuid) -> Result<TrainingPlan, StorageError>;

    /// The user's Active plan, if any
    async fn active_plan_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TrainingPlan>, StorageError>;

    /// Apply a commit atomically and return the new plan version
    ///
    /// Fails with `ConcurrentConflict` when the stored version differs from
    /// `expected_version`; nothing is written in that case.
    async fn commit_adaptation(&self, commit: &PlanCommit) -> Result<u64, StorageError>;
}

/// Profile storage
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Load a profile
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, StorageError>;

    /// Insert or replace a profile
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Read access to the append-only adaptation log
#[async_trait]
pub trait AdaptationRepository: Send + Sync {
    /// Adaptation records of a plan, oldest first
    async fn list_adaptations(&self, plan_id: Uuid) -> Result<Vec<PlanAdaptation>, StorageError>;
}

/// Everything the engine needs from storage
pub trait PersistenceGateway: PlanRepository + ProfileRepository + AdaptationRepository {}

impl<T> PersistenceGateway for T where
    T: PlanRepository + ProfileRepository + AdaptationRepository
{
}
