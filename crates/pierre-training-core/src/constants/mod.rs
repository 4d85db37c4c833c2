// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Exercise catalog, session durations, and scheduling constants for plan building
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Pure data used by plan generation and injury substitution. Grouped by domain
//! rather than kept in one flat list.

/// Exercise catalog per discipline
pub mod exercises;

/// Scheduling constants
pub mod scheduling {
    /// Days in a training week
    pub const DAYS_PER_WEEK: i64 = 7;
    /// Exercises placed in a generated workout
    pub const EXERCISES_PER_WORKOUT: usize = 2;
    /// Longest plan the generator accepts by default
    pub const DEFAULT_MAX_PLAN_WEEKS: u32 = 52;
}

/// Base session durations in minutes before fitness-level scaling
pub mod durations {
    use crate::models::Discipline;

    /// Ordinary session duration for a discipline
    #[must_use]
    pub const fn base_minutes(discipline: Discipline) -> u16 {
        match discipline {
            Discipline::Run => 45,
            Discipline::Ride => 75,
            Discipline::Swim => 40,
            Discipline::Strength => 50,
            Discipline::Mobility => 30,
        }
    }

    /// Extra minutes a key session gets
    pub const KEY_SESSION_BONUS_MINUTES: u16 = 20;
}
