// ABOUTME: Adaptation engine: dispatches triggers to their policy and commits plan plus audit record atomically
// ABOUTME: Serializes adaptations per plan and retries once on an optimistic version conflict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Adaptation Engine
//!
//! Every trigger runs the same cycle:
//!
//! 1. take the per-plan lock
//! 2. load the plan and profile, refresh the current week from the clock
//! 3. run the trigger's policy on the in-memory copy
//! 4. validate the plan structure
//! 5. commit changed weeks and one [`PlanAdaptation`] record in a single
//!    version-guarded write
//!
//! A policy error or a failed validation returns before step 5, so storage is
//! never touched. A version conflict reloads and recomputes from step 2.

mod locks;
pub mod policies;

pub use locks::PlanLocks;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use pierre_periodization::PlanGenerator;
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{
    AdaptationOutcome, BodyPart, DifficultyDirection, InjuryRecord, MovementPattern,
    PlanAdaptation, PlanStatus, TrainingPlan, TriggerKind, WeeklyAvailability,
};

use crate::clock::Clock;
use crate::config::AdaptationConfig;
use crate::storage::{PersistenceGateway, PlanCommit};
use policies::{difficulty, injury, missed, schedule, timeline, PolicyContext, PolicyOutcome};

/// Reported injury or limitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryReport {
    /// Identifier used to resolve the injury later
    pub injury_id: Uuid,
    /// Affected body part
    pub body_part: BodyPart,
    /// Explicit restrictions; the body part's defaults apply when empty
    #[serde(default)]
    pub movement_restrictions: Vec<MovementPattern>,
}

impl InjuryReport {
    /// New report with a fresh id
    #[must_use]
    pub fn new(body_part: BodyPart, movement_restrictions: Vec<MovementPattern>) -> Self {
        Self {
            injury_id: Uuid::new_v4(),
            body_part,
            movement_restrictions,
        }
    }

    /// Report for an injury already recorded on the profile
    #[must_use]
    pub fn from_record(record: &InjuryRecord) -> Self {
        Self {
            injury_id: record.id,
            body_part: record.body_part,
            movement_restrictions: record.movement_restrictions.clone(),
        }
    }

    /// Patterns to restrict
    #[must_use]
    pub fn patterns(&self) -> Vec<MovementPattern> {
        if self.movement_restrictions.is_empty() {
            self.body_part.default_restrictions().to_vec()
        } else {
            let mut patterns = self.movement_restrictions.clone();
            patterns.sort_unstable();
            patterns.dedup();
            patterns
        }
    }
}

/// Where a difficulty change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultySource {
    /// Explicit "make it easier/harder" request
    UserRequest,
    /// Feedback that sessions felt too easy or too hard
    PerceivedDifficulty,
}

/// Closed set of events the engine adapts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdaptationTrigger {
    /// Workouts not done by their date
    MissedWorkouts {
        /// Workouts to mark missed
        workout_ids: Vec<Uuid>,
    },
    /// New injury or limitation
    Injury(InjuryReport),
    /// Previously reported injury healed
    InjuryResolved {
        /// Injury to lift
        injury_id: Uuid,
    },
    /// Weekly availability changed
    ScheduleChange {
        /// New availability
        availability: WeeklyAvailability,
    },
    /// Goal date moved
    TimelineChange {
        /// New last day of training
        target_date: NaiveDate,
    },
    /// Explicit easier/harder request
    UserRequest {
        /// Requested direction
        direction: DifficultyDirection,
    },
    /// Sessions felt too easy or too hard
    PerceivedDifficulty {
        /// Direction to move
        direction: DifficultyDirection,
    },
}

impl AdaptationTrigger {
    /// Difficulty trigger for the given source
    #[must_use]
    pub const fn difficulty(source: DifficultySource, direction: DifficultyDirection) -> Self {
        match source {
            DifficultySource::UserRequest => Self::UserRequest { direction },
            DifficultySource::PerceivedDifficulty => Self::PerceivedDifficulty { direction },
        }
    }

    /// Kind recorded on the audit record
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        match self {
            Self::MissedWorkouts { .. } => TriggerKind::MissedWorkouts,
            Self::Injury(_) => TriggerKind::Injury,
            Self::InjuryResolved { .. } => TriggerKind::InjuryResolved,
            Self::ScheduleChange { .. } => TriggerKind::ScheduleChange,
            Self::TimelineChange { .. } => TriggerKind::TimelineChange,
            Self::UserRequest { .. } => TriggerKind::UserRequest,
            Self::PerceivedDifficulty { .. } => TriggerKind::PerceivedDifficulty,
        }
    }

    /// Input checks that need no plan
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty workout list or invalid availability.
    pub fn validate(&self) -> TrainingResult<()> {
        match self {
            Self::MissedWorkouts { workout_ids } if workout_ids.is_empty() => Err(
                TrainingError::validation("at least one workout id is required"),
            ),
            Self::ScheduleChange { availability } => availability.validate(),
            _ => Ok(()),
        }
    }
}

/// Workout status change reported by the athlete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutEvent {
    /// Session started
    Start,
    /// Session finished
    Complete,
    /// Session deliberately skipped
    Skip,
    /// Completion recorded by mistake
    UndoCompletion,
}

/// Applies triggers to a user's active plan
pub struct AdaptationEngine {
    store: Arc<dyn PersistenceGateway>,
    generator: PlanGenerator,
    config: AdaptationConfig,
    clock: Arc<dyn Clock>,
    locks: PlanLocks,
}

impl AdaptationEngine {
    /// Create an engine
    #[must_use]
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        generator: PlanGenerator,
        config: AdaptationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            generator,
            config,
            clock,
            locks: PlanLocks::new(),
        }
    }

    /// Adaptation settings in use
    #[must_use]
    pub const fn config(&self) -> &AdaptationConfig {
        &self.config
    }

    /// Apply a trigger to the user's active plan
    ///
    /// # Errors
    ///
    /// - `Validation` / `IllegalTransition` for bad input
    /// - `NotFound` when the user has no active plan or a named workout or
    ///   injury does not exist
    /// - `InfeasibleAdaptation` when the change cannot be satisfied
    /// - `Conflict` when the plan kept changing underneath the retry
    /// - `Storage` / `Invariant` for internal failures
    ///
    /// The stored plan is unchanged whenever an error is returned.
    #[instrument(skip(self, trigger), fields(%user_id, trigger = %trigger.kind()))]
    pub async fn adapt(
        &self,
        user_id: Uuid,
        trigger: AdaptationTrigger,
    ) -> TrainingResult<AdaptationOutcome> {
        trigger.validate()?;
        let plan_id = self.active_plan_id(user_id).await?;

        let result = {
            let _guard = self.locks.acquire(plan_id).await;
            self.adapt_with_retry(plan_id, &trigger).await
        };
        self.locks.prune_idle();
        result
    }

    /// Apply an athlete-reported status change to one workout
    ///
    /// Status changes are not adaptations: the plan version moves but no
    /// audit record is written.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown plan or workout, `IllegalTransition` for a
    /// change the workout state machine forbids, `Conflict` as for [`Self::adapt`].
    #[instrument(skip(self), fields(%user_id, %workout_id, ?event))]
    pub async fn record_workout_event(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        event: WorkoutEvent,
    ) -> TrainingResult<u64> {
        let plan_id = self.active_plan_id(user_id).await?;
        let result = {
            let _guard = self.locks.acquire(plan_id).await;
            self.apply_event(plan_id, workout_id, event).await
        };
        self.locks.prune_idle();
        result
    }

    /// Move the user's active plan to a terminal status
    ///
    /// Like workout events, closing a plan writes no audit record. Once closed
    /// the user may generate a new plan.
    ///
    /// # Errors
    ///
    /// `Validation` when `status` is not terminal, `NotFound` when the user
    /// has no active plan, `Conflict` as for [`Self::adapt`].
    #[instrument(skip(self), fields(%user_id, status = status.as_str()))]
    pub async fn close_plan(&self, user_id: Uuid, status: PlanStatus) -> TrainingResult<u64> {
        if !status.is_terminal() {
            return Err(TrainingError::validation(format!(
                "a plan cannot be closed as {}",
                status.as_str()
            )));
        }
        let plan_id = self.active_plan_id(user_id).await?;
        let result = {
            let _guard = self.locks.acquire(plan_id).await;
            self.close_with_retry(plan_id, status).await
        };
        self.locks.prune_idle();
        result
    }

    async fn active_plan_id(&self, user_id: Uuid) -> TrainingResult<Uuid> {
        self.store
            .active_plan_for_user(user_id)
            .await?
            .map(|plan| plan.id)
            .ok_or_else(|| TrainingError::not_found("active plan", user_id))
    }

    async fn adapt_with_retry(
        &self,
        plan_id: Uuid,
        trigger: &AdaptationTrigger,
    ) -> TrainingResult<AdaptationOutcome> {
        let mut retries = 0;
        loop {
            match self.attempt(plan_id, trigger).await {
                Err(TrainingError::Conflict { .. }) if retries < self.config.conflict_retries => {
                    retries += 1;
                    warn!(%plan_id, retries, "plan changed concurrently, recomputing adaptation");
                }
                result => return result,
            }
        }
    }

    async fn load_active(&self, plan_id: Uuid) -> TrainingResult<TrainingPlan> {
        let plan = self.store.get_plan_with_details(plan_id).await?;
        if plan.status != PlanStatus::Active {
            return Err(TrainingError::validation(format!(
                "plan {plan_id} is {} and cannot be adapted",
                plan.status.as_str()
            )));
        }
        Ok(plan)
    }

    async fn attempt(
        &self,
        plan_id: Uuid,
        trigger: &AdaptationTrigger,
    ) -> TrainingResult<AdaptationOutcome> {
        let mut plan = self.load_active(plan_id).await?;
        let profile = self.store.get_profile(plan.user_id).await?;
        let now = self.clock.now();
        let today = now.date_naive();
        let expected_version = plan.version;
        plan.refresh_current_week(today);

        let ctx = PolicyContext {
            config: &self.config,
            generator: &self.generator,
            profile: &profile,
            today,
        };
        let outcome = run_policy(&ctx, &mut plan, trigger)?;
        plan.updated_at = now;
        plan.validate_structure()?;

        let adaptation = PlanAdaptation::new(
            plan.id,
            trigger.kind(),
            outcome.adaptation_type,
            now,
            outcome.description,
        );
        let adaptation_id = adaptation.id;
        let adaptation_type = adaptation.adaptation_type;
        let commit = PlanCommit {
            plan,
            changed_weeks: outcome.changed_weeks,
            removed_weeks: outcome.removed_weeks,
            expected_version,
            adaptation: Some(adaptation),
        };
        let plan_version = self.store.commit_adaptation(&commit).await?;

        info!(
            %plan_id,
            %adaptation_id,
            %adaptation_type,
            plan_version,
            changed_weeks = commit.changed_weeks.len(),
            "plan adapted"
        );
        Ok(AdaptationOutcome {
            success: true,
            adaptation_id,
            plan_version,
        })
    }

    async fn apply_event(
        &self,
        plan_id: Uuid,
        workout_id: Uuid,
        event: WorkoutEvent,
    ) -> TrainingResult<u64> {
        let mut retries = 0;
        loop {
            match self.try_apply_event(plan_id, workout_id, event).await {
                Err(TrainingError::Conflict { .. }) if retries < self.config.conflict_retries => {
                    retries += 1;
                    warn!(%plan_id, retries, "plan changed concurrently, reapplying workout event");
                }
                result => return result,
            }
        }
    }

    async fn close_with_retry(&self, plan_id: Uuid, status: PlanStatus) -> TrainingResult<u64> {
        let mut retries = 0;
        loop {
            match self.try_close(plan_id, status).await {
                Err(TrainingError::Conflict { .. }) if retries < self.config.conflict_retries => {
                    retries += 1;
                    warn!(%plan_id, retries, "plan changed concurrently, retrying close");
                }
                result => return result,
            }
        }
    }

    async fn try_close(&self, plan_id: Uuid, status: PlanStatus) -> TrainingResult<u64> {
        let mut plan = self.load_active(plan_id).await?;
        let expected_version = plan.version;
        plan.status = status;
        plan.updated_at = self.clock.now();

        let commit = PlanCommit {
            plan,
            changed_weeks: Vec::new(),
            removed_weeks: Vec::new(),
            expected_version,
            adaptation: None,
        };
        let version = self.store.commit_adaptation(&commit).await?;
        info!(%plan_id, status = status.as_str(), version, "plan closed");
        Ok(version)
    }

    async fn try_apply_event(
        &self,
        plan_id: Uuid,
        workout_id: Uuid,
        event: WorkoutEvent,
    ) -> TrainingResult<u64> {
        let mut plan = self.load_active(plan_id).await?;
        let now = self.clock.now();
        let expected_version = plan.version;

        let (week_index, workout_index) = plan
            .locate_workout(workout_id)
            .ok_or_else(|| TrainingError::not_found("workout", workout_id))?;
        let week = &mut plan.weeks[week_index];
        let week_number = week.week_number;
        apply_workout_event(&mut week.workouts[workout_index], event, now)?;
        plan.refresh_current_week(now.date_naive());
        plan.updated_at = now;

        let commit = PlanCommit {
            plan,
            changed_weeks: vec![week_number],
            removed_weeks: Vec::new(),
            expected_version,
            adaptation: None,
        };
        let version = self.store.commit_adaptation(&commit).await?;
        info!(%plan_id, %workout_id, ?event, version, "workout status updated");
        Ok(version)
    }
}

fn apply_workout_event(
    workout: &mut pierre_training_core::models::Workout,
    event: WorkoutEvent,
    now: DateTime<Utc>,
) -> TrainingResult<()> {
    match event {
        WorkoutEvent::Start => workout.start(),
        WorkoutEvent::Complete => workout.complete(now),
        WorkoutEvent::Skip => workout.skip(),
        WorkoutEvent::UndoCompletion => workout.undo_completion(),
    }
}

fn run_policy(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    trigger: &AdaptationTrigger,
) -> TrainingResult<PolicyOutcome> {
    match trigger {
        AdaptationTrigger::MissedWorkouts { workout_ids } => missed::apply(ctx, plan, workout_ids),
        AdaptationTrigger::Injury(report) => injury::apply(ctx, plan, report),
        AdaptationTrigger::InjuryResolved { injury_id } => injury::resolve(ctx, plan, *injury_id),
        AdaptationTrigger::ScheduleChange { availability } => {
            schedule::redistribute(ctx, plan, *availability)
        }
        AdaptationTrigger::TimelineChange { target_date } => {
            timeline::retarget(ctx, plan, *target_date)
        }
        AdaptationTrigger::UserRequest { direction }
        | AdaptationTrigger::PerceivedDifficulty { direction } => {
            Ok(difficulty::shift(ctx, plan, *direction))
        }
    }
}
