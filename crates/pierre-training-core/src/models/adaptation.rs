// ABOUTME: Append-only adaptation audit records and the trigger/adaptation taxonomies
// ABOUTME: One PlanAdaptation per successful adaptation call, never mutated afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Event class that caused an adaptation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Workouts were not done by their scheduled date
    MissedWorkouts,
    /// An injury or limitation was reported
    Injury,
    /// A previously reported injury was resolved
    InjuryResolved,
    /// Weekly availability changed
    ScheduleChange,
    /// The goal date moved
    TimelineChange,
    /// The athlete asked for an easier or harder plan
    UserRequest,
    /// Sessions felt too easy or too hard
    PerceivedDifficulty,
}

impl TriggerKind {
    /// Stable identifier used by storage adapters
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissedWorkouts => "missed_workouts",
            Self::Injury => "injury",
            Self::InjuryResolved => "injury_resolved",
            Self::ScheduleChange => "schedule_change",
            Self::TimelineChange => "timeline_change",
            Self::UserRequest => "user_request",
            Self::PerceivedDifficulty => "perceived_difficulty",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutation applied to the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationType {
    /// Missed sessions recorded, upcoming intensity temporarily reduced
    IntensityReduction,
    /// Exercises or sessions substituted around an injury
    InjuryModification,
    /// Injury restriction lifted, intensities restored
    RestrictionLifted,
    /// Sessions moved onto new available days
    ScheduleRedistribution,
    /// Remaining phases rescaled to a new end date
    PhaseRescale,
    /// Upcoming intensity shifted one step
    IntensityShift,
    /// Nothing needed changing (e.g. already at an intensity extreme)
    NoChange,
}

impl AdaptationType {
    /// Stable identifier used by storage adapters
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IntensityReduction => "intensity_reduction",
            Self::InjuryModification => "injury_modification",
            Self::RestrictionLifted => "restriction_lifted",
            Self::ScheduleRedistribution => "schedule_redistribution",
            Self::PhaseRescale => "phase_rescale",
            Self::IntensityShift => "intensity_shift",
            Self::NoChange => "no_change",
        }
    }
}

impl fmt::Display for AdaptationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record of one adaptation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAdaptation {
    /// Record identifier (returned to the caller as `adaptation_id`)
    pub id: Uuid,
    /// Adapted plan
    pub plan_id: Uuid,
    /// Trigger that caused the adaptation
    pub trigger: TriggerKind,
    /// Mutation applied
    pub adaptation_type: AdaptationType,
    /// Commit timestamp
    pub applied_at: DateTime<Utc>,
    /// Human-readable description of the changes
    pub description: String,
}

impl PlanAdaptation {
    /// Create a record with a fresh id
    #[must_use]
    pub fn new(
        plan_id: Uuid,
        trigger: TriggerKind,
        adaptation_type: AdaptationType,
        applied_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_id,
            trigger,
            adaptation_type,
            applied_at,
            description: description.into(),
        }
    }
}

/// Result returned to callers of a successful adaptation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationOutcome {
    /// Always `true`; failures are returned as errors
    pub success: bool,
    /// Id of the audit record created by this call
    pub adaptation_id: Uuid,
    /// Plan version after the commit
    pub plan_version: u64,
}
