// ABOUTME: Training plan aggregate root with its ordered weeks and active restrictions
// ABOUTME: Structural invariants (contiguous weeks, contained workouts) and lookup helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::profile::WeeklyAvailability;
use super::taxonomy::{BodyPart, Discipline, Intensity, MovementPattern, Phase};
use super::workout::Workout;
use crate::errors::{TrainingError, TrainingResult};

/// Plan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// The plan the athlete follows; at most one per user
    Active,
    /// Reached its end date
    Completed,
    /// Dropped by the athlete
    Abandoned,
    /// Temporarily suspended
    Paused,
}

impl PlanStatus {
    /// Stable identifier used by storage adapters
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
            Self::Paused => "paused",
        }
    }

    /// Whether the plan has ended for good
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

/// Intensity ceiling imposed on one discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineCeiling {
    /// Affected discipline
    pub discipline: Discipline,
    /// Highest intensity allowed while the restriction is active
    pub ceiling: Intensity,
}

/// Injury-driven restriction applied to future workouts until resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRestriction {
    /// Injury record this restriction tracks
    pub injury_id: Uuid,
    /// Affected body part
    pub body_part: BodyPart,
    /// Movement patterns excluded from future workouts
    pub patterns: Vec<MovementPattern>,
    /// Per-discipline intensity ceilings
    pub ceilings: Vec<DisciplineCeiling>,
    /// Date the restriction was applied
    pub since: NaiveDate,
}

/// One week of a training plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingWeek {
    /// 1-based week number
    pub week_number: u32,
    /// Periodization phase
    pub phase: Phase,
    /// First day of the week (a Monday)
    pub start_date: NaiveDate,
    /// Last day of the week (a Sunday)
    pub end_date: NaiveDate,
    /// Workouts ordered by scheduled date
    pub workouts: Vec<Workout>,
}

impl TrainingWeek {
    /// Whether the date falls inside the week's range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Keep workouts ordered by date
    pub fn sort_workouts(&mut self) {
        self.workouts.sort_by_key(|workout| workout.scheduled_date);
    }
}

/// The plan aggregate: exclusively owns its weeks and their workouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Plan identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Lifecycle status
    pub status: PlanStatus,
    /// Number of weeks (always `weeks.len()`)
    pub total_weeks: u32,
    /// 1-based pointer to the week containing "today"
    pub current_week: u32,
    /// First day of week 1
    pub start_date: NaiveDate,
    /// Last day of the final week
    pub end_date: NaiveDate,
    /// Optimistic concurrency token, bumped on every committed adaptation
    pub version: u64,
    /// Seed used for generation; reused when a segment is regenerated
    pub seed: u64,
    /// Availability the plan is currently laid out against
    pub availability: WeeklyAvailability,
    /// Injury restrictions in force
    #[serde(default)]
    pub restrictions: Vec<ActiveRestriction>,
    /// Ordered weeks
    pub weeks: Vec<TrainingWeek>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl TrainingPlan {
    /// Locate a workout as `(week index, workout index)`
    #[must_use]
    pub fn locate_workout(&self, workout_id: Uuid) -> Option<(usize, usize)> {
        self.weeks.iter().enumerate().find_map(|(week_index, week)| {
            week.workouts
                .iter()
                .position(|workout| workout.id == workout_id)
                .map(|workout_index| (week_index, workout_index))
        })
    }

    /// Look up a workout by id
    #[must_use]
    pub fn workout(&self, workout_id: Uuid) -> Option<&Workout> {
        self.locate_workout(workout_id)
            .map(|(week, index)| &self.weeks[week].workouts[index])
    }

    /// Index of the week containing `date`
    #[must_use]
    pub fn week_index_for(&self, date: NaiveDate) -> Option<usize> {
        self.weeks.iter().position(|week| week.contains(date))
    }

    /// Point `current_week` at the week containing `today`
    ///
    /// Before the start it is week 1; after the end it is the last week.
    pub fn refresh_current_week(&mut self, today: NaiveDate) {
        self.current_week = if today < self.start_date {
            1
        } else {
            self.week_index_for(today)
                .map_or(self.total_weeks, |index| index as u32 + 1)
        };
    }

    /// All workouts in date order
    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.weeks.iter().flat_map(|week| week.workouts.iter())
    }

    /// Ids of adaptable workouts (NotStarted, scheduled today or later) in date order
    #[must_use]
    pub fn upcoming_workout_ids(&self, today: NaiveDate) -> Vec<Uuid> {
        let mut upcoming: Vec<&Workout> = self
            .workouts()
            .filter(|workout| workout.is_adaptable(today))
            .collect();
        upcoming.sort_by_key(|workout| workout.scheduled_date);
        upcoming.into_iter().map(|workout| workout.id).collect()
    }

    /// Mutable access to a workout by id
    pub fn workout_mut(&mut self, workout_id: Uuid) -> Option<&mut Workout> {
        self.locate_workout(workout_id)
            .map(move |(week, index)| &mut self.weeks[week].workouts[index])
    }

    /// Lowest ceiling any active restriction imposes on the discipline
    #[must_use]
    pub fn intensity_ceiling(&self, discipline: Discipline) -> Intensity {
        self.restrictions
            .iter()
            .flat_map(|restriction| restriction.ceilings.iter())
            .filter(|ceiling| ceiling.discipline == discipline)
            .map(|ceiling| ceiling.ceiling)
            .min()
            .unwrap_or(Intensity::Maximum)
    }

    /// Union of movement patterns excluded by active restrictions
    #[must_use]
    pub fn restricted_patterns(&self) -> Vec<MovementPattern> {
        self.restrictions
            .iter()
            .flat_map(|restriction| restriction.patterns.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Verify the structural invariants of the aggregate
    ///
    /// - `total_weeks == weeks.len()` and `current_week` within range
    /// - week numbers are `1..=n` without gaps
    /// - each week spans Monday..Sunday and follows the previous one directly
    /// - every workout lies inside its week and its `day` matches its date
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::Invariant` naming the first violation.
    pub fn validate_structure(&self) -> TrainingResult<()> {
        if self.weeks.is_empty() {
            return Err(TrainingError::Invariant("plan has no weeks".into()));
        }
        if self.total_weeks as usize != self.weeks.len() {
            return Err(TrainingError::Invariant(format!(
                "total_weeks {} does not match {} weeks",
                self.total_weeks,
                self.weeks.len()
            )));
        }
        if self.current_week == 0 || self.current_week > self.total_weeks {
            return Err(TrainingError::Invariant(format!(
                "current week {} outside 1..={}",
                self.current_week, self.total_weeks
            )));
        }
        if self.weeks[0].start_date != self.start_date {
            return Err(TrainingError::Invariant(
                "first week does not begin on the plan start date".into(),
            ));
        }

        let mut expected_start = self.start_date;
        for (index, week) in self.weeks.iter().enumerate() {
            let expected_number = index as u32 + 1;
            if week.week_number != expected_number {
                return Err(TrainingError::Invariant(format!(
                    "week at position {index} is numbered {} (expected {expected_number})",
                    week.week_number
                )));
            }
            if week.start_date != expected_start
                || week.end_date != week.start_date + Duration::days(6)
            {
                return Err(TrainingError::Invariant(format!(
                    "week {} range {}..{} is not contiguous",
                    week.week_number, week.start_date, week.end_date
                )));
            }
            for workout in &week.workouts {
                if !week.contains(workout.scheduled_date) {
                    return Err(TrainingError::Invariant(format!(
                        "workout {} on {} lies outside week {}",
                        workout.id, workout.scheduled_date, week.week_number
                    )));
                }
                if workout.scheduled_date.weekday() != workout.day {
                    return Err(TrainingError::Invariant(format!(
                        "workout {} day {} does not match date {}",
                        workout.id, workout.day, workout.scheduled_date
                    )));
                }
            }
            expected_start = week.end_date + Duration::days(1);
        }

        let last_end = expected_start - Duration::days(1);
        if self.end_date != last_end {
            return Err(TrainingError::Invariant(format!(
                "plan end date {} does not match final week end {last_end}",
                self.end_date
            )));
        }
        Ok(())
    }
}
