// ABOUTME: Completion statistics and streaks computed from workout history
// ABOUTME: Read-only; also supplies the configurable miss-threshold signal for adaptation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use pierre_training_core::models::{Workout, WorkoutStatus};

use crate::config::ProgressConfig;

/// Progress summary as of a reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Date the statistics are computed for
    pub reference_date: NaiveDate,
    /// Completed share of due workouts this calendar week; `None` when nothing was due
    pub weekly_completion_pct: Option<f64>,
    /// Completed share of due workouts this calendar month; `None` when nothing was due
    pub monthly_completion_pct: Option<f64>,
    /// Completed workouts overall
    pub total_completed: usize,
    /// Missed workouts overall
    pub total_missed: usize,
    /// Skipped workouts overall
    pub total_skipped: usize,
    /// Consecutive days with a completed workout, ending today or yesterday
    pub current_daily_streak: u32,
    /// Longest run of consecutive training days
    pub longest_daily_streak: u32,
    /// Consecutive weeks with a completed workout, ending this week or last week
    pub current_weekly_streak: u32,
    /// Longest run of consecutive training weeks
    pub longest_weekly_streak: u32,
    /// Date of the first completed workout
    pub first_workout_date: Option<NaiveDate>,
    /// Date of the most recent completed workout
    pub last_workout_date: Option<NaiveDate>,
}

/// Raised when misses in the trailing window reach the threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedWorkoutSignal {
    /// Missed workouts in date order, ready for the missed-workouts adaptation
    pub workout_ids: Vec<Uuid>,
    /// First day of the window (inclusive)
    pub window_start: NaiveDate,
    /// Day the check ran; the window ends the day before
    pub checked_on: NaiveDate,
}

/// Pure statistics over persisted workout history
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    config: ProgressConfig,
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn completion_date(workout: &Workout) -> NaiveDate {
    workout
        .completed_at
        .map_or(workout.scheduled_date, |at| at.date_naive())
}

fn is_due(workout: &Workout, reference: NaiveDate) -> bool {
    workout.scheduled_date < reference
        || matches!(
            workout.status,
            WorkoutStatus::Completed | WorkoutStatus::Skipped | WorkoutStatus::Missed
        )
}

fn completion_pct(workouts: &[&Workout], from: NaiveDate, reference: NaiveDate) -> Option<f64> {
    let due: Vec<&&Workout> = workouts
        .iter()
        .filter(|w| w.scheduled_date >= from && w.scheduled_date <= reference)
        .filter(|w| is_due(w, reference))
        .collect();
    if due.is_empty() {
        return None;
    }
    let completed = due
        .iter()
        .filter(|w| w.status == WorkoutStatus::Completed)
        .count();
    let pct = completed as f64 * 100.0 / due.len() as f64;
    Some((pct * 10.0).round() / 10.0)
}

fn longest_run(dates: &BTreeSet<NaiveDate>, step: Duration) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        run = match previous {
            Some(prev) if prev + step == *date => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*date);
    }
    longest
}

// Run ending at `anchor`, or at the step before it when `anchor` itself is absent
fn current_run(dates: &BTreeSet<NaiveDate>, anchor: NaiveDate, step: Duration) -> u32 {
    let mut cursor = if dates.contains(&anchor) {
        anchor
    } else {
        anchor - step
    };
    let mut run = 0;
    while dates.contains(&cursor) {
        run += 1;
        cursor -= step;
    }
    run
}

impl ProgressTracker {
    /// Create a tracker with explicit thresholds
    #[must_use]
    pub const fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Completion percentages, streaks, and first/last dates as of `reference`
    pub fn report<'a, I>(&self, workouts: I, reference: NaiveDate) -> ProgressReport
    where
        I: IntoIterator<Item = &'a Workout>,
    {
        let workouts: Vec<&Workout> = workouts.into_iter().collect();
        let count = |status: WorkoutStatus| workouts.iter().filter(|w| w.status == status).count();

        let training_days: BTreeSet<NaiveDate> = workouts
            .iter()
            .filter(|w| w.status == WorkoutStatus::Completed)
            .map(|w| completion_date(w))
            .filter(|date| *date <= reference)
            .collect();
        let training_weeks: BTreeSet<NaiveDate> =
            training_days.iter().copied().map(monday_of).collect();

        let day = Duration::days(1);
        let week = Duration::weeks(1);
        let month_start = reference.with_day(1).unwrap_or(reference);

        ProgressReport {
            reference_date: reference,
            weekly_completion_pct: completion_pct(&workouts, monday_of(reference), reference),
            monthly_completion_pct: completion_pct(&workouts, month_start, reference),
            total_completed: count(WorkoutStatus::Completed),
            total_missed: count(WorkoutStatus::Missed),
            total_skipped: count(WorkoutStatus::Skipped),
            current_daily_streak: current_run(&training_days, reference, day),
            longest_daily_streak: longest_run(&training_days, day),
            current_weekly_streak: current_run(&training_weeks, monday_of(reference), week),
            longest_weekly_streak: longest_run(&training_weeks, week),
            first_workout_date: training_days.first().copied(),
            last_workout_date: training_days.last().copied(),
        }
    }

    /// Misses in the trailing window when they reach the configured threshold
    ///
    /// The window covers the `miss_window_days` days before `today`. A workout
    /// counts as missed when it is `Missed`, or still `NotStarted` after its
    /// scheduled date has passed.
    pub fn missed_workout_signal<'a, I>(
        &self,
        workouts: I,
        today: NaiveDate,
    ) -> Option<MissedWorkoutSignal>
    where
        I: IntoIterator<Item = &'a Workout>,
    {
        let window_start = today - Duration::days(i64::from(self.config.miss_window_days));
        let mut misses: Vec<&Workout> = workouts
            .into_iter()
            .filter(|w| w.scheduled_date >= window_start && w.scheduled_date < today)
            .filter(|w| {
                matches!(w.status, WorkoutStatus::Missed | WorkoutStatus::NotStarted)
            })
            .collect();
        misses.sort_by_key(|w| w.scheduled_date);

        let count = misses.len();
        let threshold = self.config.miss_threshold as usize;
        debug!(%today, count, threshold, "missed workout threshold check");
        if count < threshold {
            return None;
        }
        Some(MissedWorkoutSignal {
            workout_ids: misses.iter().map(|w| w.id).collect(),
            window_start,
            checked_on: today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pierre_training_core::models::{Discipline, Intensity};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn workout(day: u32, status: WorkoutStatus) -> Workout {
        let scheduled_date = date(day);
        Workout {
            id: Uuid::new_v4(),
            day: scheduled_date.weekday(),
            scheduled_date,
            discipline: Discipline::Run,
            intensity: Intensity::Moderate,
            planned_intensity: Intensity::Moderate,
            status,
            is_key: false,
            duration_minutes: 45,
            exercises: Vec::new(),
            completed_at: (status == WorkoutStatus::Completed).then(|| {
                Utc.from_utc_datetime(&scheduled_date.and_hms_opt(18, 0, 0).unwrap())
            }),
        }
    }

    #[test]
    fn test_empty_history() {
        let history: Vec<Workout> = Vec::new();
        let report = ProgressTracker::default().report(&history, date(10));
        assert_eq!(report.weekly_completion_pct, None);
        assert_eq!(report.current_daily_streak, 0);
        assert_eq!(report.longest_weekly_streak, 0);
        assert!(report.first_workout_date.is_none());
    }

    #[test]
    fn test_completion_and_streaks() {
        // 2026-03-09 is a Monday
        let history = vec![
            workout(2, WorkoutStatus::Completed),
            workout(3, WorkoutStatus::Completed),
            workout(4, WorkoutStatus::Completed),
            workout(6, WorkoutStatus::Missed),
            workout(9, WorkoutStatus::Completed),
            workout(10, WorkoutStatus::Completed),
            workout(11, WorkoutStatus::Skipped),
            workout(12, WorkoutStatus::NotStarted),
        ];
        let report = ProgressTracker::default().report(&history, date(12));

        // week of the 9th: completed 9, 10; skipped 11; the 12th is not yet due
        assert_eq!(report.weekly_completion_pct, Some(66.7));
        // month: 5 completed of 7 due
        assert_eq!(report.monthly_completion_pct, Some(71.4));
        assert_eq!(report.longest_daily_streak, 3);
        assert_eq!(report.current_daily_streak, 0);
        assert_eq!(report.current_weekly_streak, 2);
        assert_eq!(report.longest_weekly_streak, 2);
        assert_eq!(report.first_workout_date, Some(date(2)));
        assert_eq!(report.last_workout_date, Some(date(10)));
        assert_eq!(report.total_missed, 1);
        assert_eq!(report.total_skipped, 1);
    }

    #[test]
    fn test_current_daily_streak_counts_from_yesterday() {
        let history = vec![
            workout(9, WorkoutStatus::Completed),
            workout(10, WorkoutStatus::Completed),
        ];
        let report = ProgressTracker::default().report(&history, date(11));
        assert_eq!(report.current_daily_streak, 2);
    }

    #[test]
    fn test_signal_raised_at_threshold() {
        let history = vec![
            workout(9, WorkoutStatus::Missed),
            workout(11, WorkoutStatus::NotStarted),
            workout(12, WorkoutStatus::Completed),
            workout(13, WorkoutStatus::NotStarted),
        ];
        let signal = ProgressTracker::default()
            .missed_workout_signal(&history, date(13))
            .unwrap();
        assert_eq!(signal.workout_ids, vec![history[0].id, history[1].id]);
        assert_eq!(signal.window_start, date(6));
    }

    #[test]
    fn test_signal_below_threshold_or_outside_window() {
        let history = vec![
            workout(2, WorkoutStatus::Missed),
            workout(11, WorkoutStatus::Missed),
        ];
        assert!(ProgressTracker::default()
            .missed_workout_signal(&history, date(13))
            .is_none());

        let strict = ProgressTracker::new(ProgressConfig {
            miss_threshold: 1,
            miss_window_days: 7,
        });
        assert!(strict.missed_workout_signal(&history, date(13)).is_some());
    }
}
