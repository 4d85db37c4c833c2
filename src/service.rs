// ABOUTME: TrainingService facade: plan generation, adaptations, intent classification, progress
// ABOUTME: Conversational bridge routes classified messages to the matching adaptation path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Service
//!
//! The operations a transport or conversational layer calls. Construction
//! wires every component from one [`EngineConfig`], a storage gateway, a
//! completion service, and a clock; nothing is read from the environment here.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use pierre_periodization::{
    MissedWorkoutSignal, PlanGenerator, PlanRequest, ProgressReport, ProgressTracker,
};
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{
    AdaptationOutcome, DifficultyDirection, PlanAdaptation, PlanStatus, TrainingPlan, UserProfile,
    WeeklyAvailability,
};

use crate::adaptation::{
    AdaptationEngine, AdaptationTrigger, DifficultySource, InjuryReport, WorkoutEvent,
};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::intent::{Classification, Intent, IntentClassifier};
use crate::llm::{ChatMessage, NaturalLanguageService};
use crate::storage::PersistenceGateway;

/// Result of handling one conversational message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOutcome {
    /// How the message was understood
    pub classification: Classification,
    /// Adaptation applied because of the message, if any
    pub adaptation: Option<AdaptationOutcome>,
}

/// Entry point for plan, adaptation, conversation, and progress operations
pub struct TrainingService {
    store: Arc<dyn PersistenceGateway>,
    generator: PlanGenerator,
    engine: AdaptationEngine,
    classifier: IntentClassifier,
    tracker: ProgressTracker,
    clock: Arc<dyn Clock>,
}

impl TrainingService {
    /// Wire all components from an explicit configuration
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn PersistenceGateway>,
        completion: Arc<dyn NaturalLanguageService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let generator = PlanGenerator::new(config.phases.clone());
        Self {
            engine: AdaptationEngine::new(
                Arc::clone(&store),
                generator.clone(),
                config.adaptation,
                Arc::clone(&clock),
            ),
            classifier: IntentClassifier::new(
                completion,
                Arc::clone(&clock),
                config.intent.clone(),
            ),
            tracker: ProgressTracker::new(config.progress),
            generator,
            store,
            clock,
        }
    }

    /// Storage gateway in use
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PersistenceGateway> {
        &self.store
    }

    // ── Plans ───────────────────────────────────────────────────────────

    /// Generate and store a plan starting next Monday (or today if Monday)
    ///
    /// # Errors
    ///
    /// `Validation` for an invalid profile, a bad length, or an existing
    /// active plan; `InfeasibleAdaptation` when the length is below the phase
    /// minimums.
    pub async fn generate_initial_plan(
        &self,
        profile: &UserProfile,
        total_weeks: u32,
    ) -> TrainingResult<TrainingPlan> {
        let request = PlanRequest {
            total_weeks,
            start_date: self.clock.today(),
            seed: None,
        };
        self.generate_plan(profile, &request).await
    }

    /// Generate and store a plan from an explicit request
    ///
    /// The profile is saved alongside the plan.
    ///
    /// # Errors
    ///
    /// As for [`Self::generate_initial_plan`].
    #[instrument(skip_all, fields(user_id = %profile.user_id, total_weeks = request.total_weeks))]
    pub async fn generate_plan(
        &self,
        profile: &UserProfile,
        request: &PlanRequest,
    ) -> TrainingResult<TrainingPlan> {
        let plan = self.generator.generate(profile, request, self.clock.now())?;
        if self.store.active_plan_for_user(profile.user_id).await?.is_some() {
            return Err(TrainingError::validation(format!(
                "user {} already has an active plan",
                profile.user_id
            )));
        }
        self.store.save_profile(profile).await?;
        self.store.insert_plan(&plan).await?;
        Ok(plan)
    }

    /// The user's active plan
    ///
    /// # Errors
    ///
    /// `NotFound` when the user has no active plan.
    pub async fn active_plan(&self, user_id: Uuid) -> TrainingResult<TrainingPlan> {
        self.store
            .active_plan_for_user(user_id)
            .await?
            .ok_or_else(|| TrainingError::not_found("active plan", user_id))
    }

    /// Adaptation records of the user's active plan, oldest first
    ///
    /// # Errors
    ///
    /// `NotFound` when the user has no active plan.
    pub async fn adaptation_history(&self, user_id: Uuid) -> TrainingResult<Vec<PlanAdaptation>> {
        let plan = self.active_plan(user_id).await?;
        Ok(self.store.list_adaptations(plan.id).await?)
    }

    // ── Adaptations ─────────────────────────────────────────────────────

    /// Mark workouts missed and ease the next sessions
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_missed_workouts(
        &self,
        user_id: Uuid,
        workout_ids: Vec<Uuid>,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::MissedWorkouts { workout_ids })
            .await
    }

    /// Restrict the plan around an injury
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_injury(
        &self,
        user_id: Uuid,
        injury: InjuryReport,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::Injury(injury))
            .await
    }

    /// Lift a resolved injury's restriction
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_injury_resolved(
        &self,
        user_id: Uuid,
        injury_id: Uuid,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::InjuryResolved { injury_id })
            .await
    }

    /// Move remaining sessions onto a new weekly schedule
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_schedule_change(
        &self,
        user_id: Uuid,
        availability: WeeklyAvailability,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::ScheduleChange { availability })
            .await
    }

    /// Fit the plan to a new goal date
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_timeline_change(
        &self,
        user_id: Uuid,
        target_date: NaiveDate,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::TimelineChange { target_date })
            .await
    }

    /// Shift upcoming sessions easier or harder
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::adapt`].
    pub async fn adapt_for_difficulty(
        &self,
        user_id: Uuid,
        source: DifficultySource,
        direction: DifficultyDirection,
    ) -> TrainingResult<AdaptationOutcome> {
        self.engine
            .adapt(user_id, AdaptationTrigger::difficulty(source, direction))
            .await
    }

    /// Record a start, completion, skip, or undo on one workout
    ///
    /// Returns the new plan version.
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::record_workout_event`].
    pub async fn record_workout_event(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        event: WorkoutEvent,
    ) -> TrainingResult<u64> {
        self.engine
            .record_workout_event(user_id, workout_id, event)
            .await
    }

    /// Mark the user's active plan completed
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::close_plan`].
    pub async fn complete_plan(&self, user_id: Uuid) -> TrainingResult<u64> {
        self.engine.close_plan(user_id, PlanStatus::Completed).await
    }

    /// Abandon the user's active plan
    ///
    /// # Errors
    ///
    /// See [`AdaptationEngine::close_plan`].
    pub async fn abandon_plan(&self, user_id: Uuid) -> TrainingResult<u64> {
        self.engine.close_plan(user_id, PlanStatus::Abandoned).await
    }

    // ── Conversation ────────────────────────────────────────────────────

    /// Classify a message; never fails
    pub async fn classify_intent(&self, message: &str, history: &[ChatMessage]) -> Classification {
        self.classifier.classify(message, history).await
    }

    /// Classify a message and apply the adaptation it asks for
    ///
    /// Injury reports need a body part, schedule changes a day list, and plan
    /// modifications a direction or a target date; anything else is answered
    /// without touching the plan.
    ///
    /// # Errors
    ///
    /// Adaptation errors are returned as-is; classification never fails.
    #[instrument(skip_all, fields(%user_id))]
    pub async fn handle_message(
        &self,
        user_id: Uuid,
        message: &str,
        history: &[ChatMessage],
    ) -> TrainingResult<MessageOutcome> {
        let classification = self.classify_intent(message, history).await;
        let adaptation = self.route(user_id, &classification).await?;
        if let Some(outcome) = &adaptation {
            info!(
                intent = %classification.intent,
                adaptation_id = %outcome.adaptation_id,
                "message triggered adaptation"
            );
        }
        Ok(MessageOutcome {
            classification,
            adaptation,
        })
    }

    async fn route(
        &self,
        user_id: Uuid,
        classification: &Classification,
    ) -> TrainingResult<Option<AdaptationOutcome>> {
        let slots = &classification.slots;
        let outcome = match classification.intent {
            Intent::InjuryReport => match slots.body_part {
                Some(body_part) => Some(
                    self.adapt_for_injury(user_id, InjuryReport::new(body_part, Vec::new()))
                        .await?,
                ),
                None => None,
            },
            Intent::ScheduleChange if !slots.days.is_empty() => {
                let current = self.active_plan(user_id).await?.availability;
                let availability = availability_for_days(&current, &slots.days);
                Some(self.adapt_for_schedule_change(user_id, availability).await?)
            }
            Intent::PlanModification => match (slots.direction, slots.target_date) {
                (Some(direction), _) => Some(
                    self.adapt_for_difficulty(user_id, DifficultySource::UserRequest, direction)
                        .await?,
                ),
                (None, Some(target_date)) => {
                    Some(self.adapt_for_timeline_change(user_id, target_date).await?)
                }
                (None, None) => None,
            },
            _ => None,
        };
        if outcome.is_none() {
            debug!(intent = %classification.intent, "message needs no adaptation");
        }
        Ok(outcome)
    }

    // ── Progress ────────────────────────────────────────────────────────

    /// Completion statistics for the user's active plan as of today
    ///
    /// # Errors
    ///
    /// `NotFound` when the user has no active plan.
    pub async fn progress(&self, user_id: Uuid) -> TrainingResult<ProgressReport> {
        let plan = self.active_plan(user_id).await?;
        Ok(self.tracker.report(plan.workouts(), self.clock.today()))
    }

    /// Misses in the trailing window, when they reach the configured threshold
    ///
    /// A scheduler can pass the returned ids to
    /// [`Self::adapt_for_missed_workouts`].
    ///
    /// # Errors
    ///
    /// `NotFound` when the user has no active plan.
    pub async fn check_missed_workouts(
        &self,
        user_id: Uuid,
    ) -> TrainingResult<Option<MissedWorkoutSignal>> {
        let plan = self.active_plan(user_id).await?;
        Ok(self
            .tracker
            .missed_workout_signal(plan.workouts(), self.clock.today()))
    }
}

/// Availability on `days` with the current bounds clamped to the day count
#[must_use]
pub fn availability_for_days(
    current: &WeeklyAvailability,
    days: &[Weekday],
) -> WeeklyAvailability {
    let day_count = u8::try_from(days.len()).unwrap_or(u8::MAX).max(1);
    let max_sessions = current.max_sessions.clamp(1, day_count);
    let min_sessions = current.min_sessions.clamp(1, max_sessions);
    WeeklyAvailability::new(days, min_sessions, max_sessions)
}
