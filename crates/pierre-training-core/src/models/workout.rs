// ABOUTME: Workout entity with its completion-status state machine
// ABOUTME: Exercises with movement patterns, sanctioned status transitions, and undo
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::taxonomy::{Discipline, Intensity, MovementPattern};
use crate::errors::{TrainingError, TrainingResult};

/// Completion status of a workout
///
/// Sanctioned transitions:
/// - `NotStarted` → `InProgress`, `Skipped`, `Missed`
/// - `InProgress` → `Completed`
/// - `Completed` → `NotStarted` (explicit undo only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    /// Scheduled, untouched
    NotStarted,
    /// Started by the athlete
    InProgress,
    /// Finished
    Completed,
    /// Deliberately skipped by the athlete
    Skipped,
    /// Not done by its scheduled date
    Missed,
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Missed => "missed",
        };
        f.write_str(label)
    }
}

/// One exercise inside a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise name from the catalog
    pub name: String,
    /// Movement patterns the exercise loads
    #[serde(default)]
    pub patterns: Vec<MovementPattern>,
}

impl Exercise {
    /// Whether the exercise loads any of the given patterns
    #[must_use]
    pub fn touches(&self, restricted: &[MovementPattern]) -> bool {
        self.patterns.iter().any(|pattern| restricted.contains(pattern))
    }
}

/// A scheduled training session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Workout identifier
    pub id: Uuid,
    /// Day of week (always matches `scheduled_date`)
    pub day: Weekday,
    /// Calendar date
    pub scheduled_date: NaiveDate,
    /// Discipline trained
    pub discipline: Discipline,
    /// Current prescribed intensity
    pub intensity: Intensity,
    /// Intensity on the plan's curve before temporary adjustments
    pub planned_intensity: Intensity,
    /// Completion status
    pub status: WorkoutStatus,
    /// Central to the week's training intent
    pub is_key: bool,
    /// Planned duration
    pub duration_minutes: u16,
    /// Exercises making up the session
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// When the workout was completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workout {
    /// Whether adaptation logic may rewrite this workout on `today`
    #[must_use]
    pub fn is_adaptable(&self, today: NaiveDate) -> bool {
        self.status == WorkoutStatus::NotStarted && self.scheduled_date >= today
    }

    /// Whether any exercise loads a restricted pattern
    #[must_use]
    pub fn touches(&self, restricted: &[MovementPattern]) -> bool {
        self.exercises.iter().any(|exercise| exercise.touches(restricted))
    }

    fn transition(
        &mut self,
        allowed_from: &[WorkoutStatus],
        to: WorkoutStatus,
    ) -> TrainingResult<()> {
        if !allowed_from.contains(&self.status) {
            return Err(TrainingError::IllegalTransition {
                workout_id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `NotStarted` → `InProgress`
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` from any other status.
    pub fn start(&mut self) -> TrainingResult<()> {
        self.transition(&[WorkoutStatus::NotStarted], WorkoutStatus::InProgress)
    }

    /// `InProgress` → `Completed`
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` from any other status.
    pub fn complete(&mut self, at: DateTime<Utc>) -> TrainingResult<()> {
        self.transition(&[WorkoutStatus::InProgress], WorkoutStatus::Completed)?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// `NotStarted` → `Skipped`
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` from any other status.
    pub fn skip(&mut self) -> TrainingResult<()> {
        self.transition(&[WorkoutStatus::NotStarted], WorkoutStatus::Skipped)
    }

    /// `NotStarted` → `Missed`; a no-op when already `Missed`
    ///
    /// Returns whether the status changed.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` from `InProgress`, `Completed`, or `Skipped`.
    pub fn mark_missed(&mut self) -> TrainingResult<bool> {
        if self.status == WorkoutStatus::Missed {
            return Ok(false);
        }
        self.transition(&[WorkoutStatus::NotStarted], WorkoutStatus::Missed)?;
        Ok(true)
    }

    /// Explicit undo: `Completed` → `NotStarted`
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` from any other status.
    pub fn undo_completion(&mut self) -> TrainingResult<()> {
        self.transition(&[WorkoutStatus::Completed], WorkoutStatus::NotStarted)?;
        self.completed_at = None;
        Ok(())
    }
}
