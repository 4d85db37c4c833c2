// ABOUTME: Domain model module exposing profile, plan, workout, and adaptation types
// ABOUTME: Re-exports the closed taxonomies used across generation and adaptation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod adaptation;
mod plan;
mod profile;
mod taxonomy;
mod workout;

pub use adaptation::{AdaptationOutcome, AdaptationType, PlanAdaptation, TriggerKind};
pub use plan::{ActiveRestriction, DisciplineCeiling, PlanStatus, TrainingPlan, TrainingWeek};
pub use profile::{
    DisciplineLevel, Goal, GoalStatus, GoalType, InjuryRecord, UserProfile, WeekdaySet,
    WeeklyAvailability, WEEKDAYS,
};
pub use taxonomy::{
    BodyPart, DifficultyDirection, Discipline, FitnessLevel, Intensity, MovementPattern, Phase,
};
pub use workout::{Exercise, Workout, WorkoutStatus};
