// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Profiles, clocks, scripted completion services, and fault-injecting store wrappers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `pierre_training`

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use uuid::Uuid;

use pierre_training::clock::ManualClock;
use pierre_training::config::EngineConfig;
use pierre_training::core::errors::StorageError;
use pierre_training::core::models::{
    Discipline, DisciplineLevel, FitnessLevel, Goal, GoalStatus, GoalType, PlanAdaptation,
    TrainingPlan, UserProfile, WeeklyAvailability,
};
use pierre_training::llm::{ChatMessage, Completion, CompletionError, NaturalLanguageService};
use pierre_training::service::TrainingService;
use pierre_training::storage::memory::InMemoryStore;
use pierre_training::storage::{
    AdaptationRepository, PersistenceGateway, PlanCommit, PlanRepository, ProfileRepository,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Wednesday 2026-03-04 08:00 UTC; generated plans start Monday 2026-03-09
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 8, 0, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Intermediate runner who also lifts; Mon/Wed/Fri, 2..=3 sessions
pub fn runner_profile() -> UserProfile {
    UserProfile {
        user_id: Uuid::new_v4(),
        fitness_levels: vec![
            DisciplineLevel {
                discipline: Discipline::Run,
                level: FitnessLevel::Intermediate,
            },
            DisciplineLevel {
                discipline: Discipline::Strength,
                level: FitnessLevel::Advanced,
            },
        ],
        availability: WeeklyAvailability::new(
            &[Weekday::Mon, Weekday::Wed, Weekday::Fri],
            2,
            3,
        ),
        goals: vec![Goal {
            id: Uuid::new_v4(),
            goal_type: GoalType::Race,
            discipline: Discipline::Run,
            target_date: date(2026, 5, 3),
            priority: 1,
            status: GoalStatus::Active,
        }],
        injuries: Vec::new(),
    }
}

/// Plan with every plan and workout id cleared, for comparing generated content
pub fn without_ids(mut plan: TrainingPlan) -> TrainingPlan {
    plan.id = Uuid::nil();
    for week in &mut plan.weeks {
        for workout in &mut week.workouts {
            workout.id = Uuid::nil();
        }
    }
    plan
}

/// Completion whose text is the given JSON
pub fn json_completion(json: &str) -> Completion {
    Completion {
        text: json.to_owned(),
        prompt_tokens: 120,
        completion_tokens: 30,
    }
}

/// Completion service that replays queued responses, then fails as unavailable
#[derive(Default)]
pub struct ScriptedService {
    responses: Mutex<VecDeque<Result<Completion, CompletionError>>>,
    calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new(responses: Vec<Result<Completion, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Service answering every call with the same JSON
    pub fn always(json: &str) -> Self {
        Self::new((0..16).map(|_| Ok(json_completion(json))).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NaturalLanguageService for ScriptedService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Unavailable("script exhausted".to_owned())))
    }
}

/// Completion service that never answers within any sane timeout
pub struct SlowService {
    pub delay: Duration,
}

#[async_trait]
impl NaturalLanguageService for SlowService {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok(json_completion(r#"{"intent": "motivation", "reply": "too late"}"#))
    }
}

/// Store whose commits report a version conflict a fixed number of times
///
/// Each injected conflict also bumps the stored plan through a real commit,
/// the way a writer in another process would.
pub struct ConflictingStore {
    inner: InMemoryStore,
    conflicts_left: AtomicU32,
    commits: AtomicU32,
}

impl ConflictingStore {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryStore::new(),
            conflicts_left: AtomicU32::new(conflicts),
            commits: AtomicU32::new(0),
        }
    }

    pub fn commit_attempts(&self) -> u32 {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanRepository for ConflictingStore {
    async fn insert_plan(&self, plan: &TrainingPlan) -> Result<(), StorageError> {
        self.inner.insert_plan(plan).await
    }

    async fn get_plan_with_details(&self, plan_id: Uuid) -> Result<TrainingPlan, StorageError> {
        self.inner.get_plan_with_details(plan_id).await
    }

    async fn active_plan_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TrainingPlan>, StorageError> {
        self.inner.active_plan_for_user(user_id).await
    }

    async fn commit_adaptation(&self, commit: &PlanCommit) -> Result<u64, StorageError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let inject = self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if inject {
            let mut concurrent = self.inner.get_plan_with_details(commit.plan.id).await?;
            concurrent.updated_at = concurrent.updated_at + chrono::Duration::seconds(1);
            let bump = PlanCommit {
                expected_version: concurrent.version,
                plan: concurrent,
                changed_weeks: Vec::new(),
                removed_weeks: Vec::new(),
                adaptation: None,
            };
            self.inner.commit_adaptation(&bump).await?;
        }
        self.inner.commit_adaptation(commit).await
    }
}

#[async_trait]
impl ProfileRepository for ConflictingStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, StorageError> {
        self.inner.get_profile(user_id).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.inner.save_profile(profile).await
    }
}

#[async_trait]
impl AdaptationRepository for ConflictingStore {
    async fn list_adaptations(&self, plan_id: Uuid) -> Result<Vec<PlanAdaptation>, StorageError> {
        self.inner.list_adaptations(plan_id).await
    }
}

/// Store whose commits always fail in the backend
pub struct FailingCommitStore {
    pub inner: InMemoryStore,
}

#[async_trait]
impl PlanRepository for FailingCommitStore {
    async fn insert_plan(&self, plan: &TrainingPlan) -> Result<(), StorageError> {
        self.inner.insert_plan(plan).await
    }

    async fn get_plan_with_details(&self, plan_id: Uuid) -> Result<TrainingPlan, StorageError> {
        self.inner.get_plan_with_details(plan_id).await
    }

    async fn active_plan_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TrainingPlan>, StorageError> {
        self.inner.active_plan_for_user(user_id).await
    }

    async fn commit_adaptation(&self, _commit: &PlanCommit) -> Result<u64, StorageError> {
        Err(StorageError::Backend("disk full".to_owned()))
    }
}

#[async_trait]
impl ProfileRepository for FailingCommitStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, StorageError> {
        self.inner.get_profile(user_id).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.inner.save_profile(profile).await
    }
}

#[async_trait]
impl AdaptationRepository for FailingCommitStore {
    async fn list_adaptations(&self, plan_id: Uuid) -> Result<Vec<PlanAdaptation>, StorageError> {
        self.inner.list_adaptations(plan_id).await
    }
}

/// Service over `store` with default configuration and a manual clock at [`now`]
pub fn service_with(
    store: Arc<dyn PersistenceGateway>,
    completion: Arc<dyn NaturalLanguageService>,
) -> (TrainingService, Arc<ManualClock>) {
    init_test_logging();
    let clock = Arc::new(ManualClock::new(now()));
    let service = TrainingService::new(&EngineConfig::default(), store, completion, clock.clone());
    (service, clock)
}

/// In-memory service with an answering-nothing completion service
pub fn memory_service() -> (TrainingService, Arc<ManualClock>) {
    service_with(
        Arc::new(InMemoryStore::new()),
        Arc::new(ScriptedService::default()),
    )
}
