// ABOUTME: Adaptation policies, one per trigger, operating on an in-memory copy of the plan
// ABOUTME: Shared context, outcome type, and intensity-cap helpers used by every policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Policies mutate a loaded copy of the plan and report which weeks changed.
//! Nothing is persisted here: the engine validates the result and commits it
//! together with the audit record, so an error from a policy leaves storage
//! untouched.
//!
//! Only workouts that are `NotStarted` and scheduled today or later are ever
//! rewritten; weeks ending before today are history.

pub mod difficulty;
pub mod injury;
pub mod missed;
pub mod schedule;
pub mod timeline;

use std::collections::BTreeSet;

use chrono::NaiveDate;

use pierre_periodization::PlanGenerator;
use pierre_training_core::models::{
    AdaptationType, Discipline, FitnessLevel, Intensity, TrainingPlan, UserProfile,
};

use crate::config::AdaptationConfig;

/// Inputs shared by all policies
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// Window sizes and ceilings
    pub config: &'a AdaptationConfig,
    /// Generator used for regenerated segments
    pub generator: &'a PlanGenerator,
    /// Current athlete profile
    pub profile: &'a UserProfile,
    /// Date the adaptation is applied
    pub today: NaiveDate,
}

impl PolicyContext<'_> {
    /// Highest intensity allowed for the discipline on this plan
    ///
    /// Mobility is always low; other disciplines are bounded by the athlete's
    /// level and every active restriction ceiling.
    #[must_use]
    pub fn intensity_cap(&self, plan: &TrainingPlan, discipline: Discipline) -> Intensity {
        if discipline == Discipline::Mobility {
            return Intensity::Low;
        }
        self.profile
            .level_for(discipline)
            .unwrap_or(FitnessLevel::Beginner)
            .intensity_cap()
            .min(plan.intensity_ceiling(discipline))
    }
}

/// What a policy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    /// Mutation applied
    pub adaptation_type: AdaptationType,
    /// Human-readable summary for the audit record
    pub description: String,
    /// Week numbers to persist
    pub changed_weeks: Vec<u32>,
    /// Week numbers to delete
    pub removed_weeks: Vec<u32>,
}

impl PolicyOutcome {
    /// Outcome for a policy that changed `changed` weeks
    #[must_use]
    pub fn changed(
        adaptation_type: AdaptationType,
        description: impl Into<String>,
        changed: &BTreeSet<u32>,
    ) -> Self {
        Self {
            adaptation_type,
            description: description.into(),
            changed_weeks: changed.iter().copied().collect(),
            removed_weeks: Vec::new(),
        }
    }

    /// Outcome for a policy that found nothing to change
    #[must_use]
    pub fn unchanged(description: impl Into<String>) -> Self {
        Self {
            adaptation_type: AdaptationType::NoChange,
            description: description.into(),
            changed_weeks: Vec::new(),
            removed_weeks: Vec::new(),
        }
    }
}

/// `"1 workout"` / `"3 workouts"`
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
