// ABOUTME: Integration tests for progress reporting and the missed-workout threshold check
// ABOUTME: Drives workout events through the service and reads back the tracker's view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use pierre_training::adaptation::WorkoutEvent;
use pierre_training::clock::ManualClock;
use pierre_training::core::errors::TrainingError;
use pierre_training::core::models::{TrainingPlan, Workout};
use pierre_training::service::TrainingService;

async fn complete_on_schedule(
    service: &TrainingService,
    clock: &ManualClock,
    user_id: Uuid,
    workout: &Workout,
) {
    let evening = workout.scheduled_date.and_hms_opt(18, 0, 0).unwrap();
    clock.set(Utc.from_utc_datetime(&evening));
    service
        .record_workout_event(user_id, workout.id, WorkoutEvent::Start)
        .await
        .unwrap();
    service
        .record_workout_event(user_id, workout.id, WorkoutEvent::Complete)
        .await
        .unwrap();
}

fn first_week(plan: &TrainingPlan) -> Vec<Workout> {
    plan.weeks[0].workouts.clone()
}

#[tokio::test]
async fn test_progress_before_any_training() {
    let (service, _clock) = common::memory_service();
    let profile = common::runner_profile();
    service.generate_initial_plan(&profile, 8).await.unwrap();

    let report = service.progress(profile.user_id).await.unwrap();

    assert_eq!(report.reference_date, common::date(2026, 3, 4));
    assert_eq!(report.total_completed, 0);
    assert_eq!(report.weekly_completion_pct, None);
    assert_eq!(report.current_weekly_streak, 0);
    assert_eq!(report.first_workout_date, None);
}

#[tokio::test]
async fn test_progress_after_completing_one_session() {
    let (service, clock) = common::memory_service();
    let profile = common::runner_profile();
    let plan = service.generate_initial_plan(&profile, 8).await.unwrap();
    let week = first_week(&plan);
    complete_on_schedule(&service, &clock, profile.user_id, &week[0]).await;
    clock.set(Utc.with_ymd_and_hms(2026, 3, 15, 20, 0, 0).unwrap());

    let report = service.progress(profile.user_id).await.unwrap();

    let expected = (100.0 / week.len() as f64 * 10.0).round() / 10.0;
    assert_eq!(report.total_completed, 1);
    assert_eq!(report.weekly_completion_pct, Some(expected));
    assert_eq!(report.current_weekly_streak, 1);
    assert_eq!(report.longest_daily_streak, 1);
    assert_eq!(report.first_workout_date, Some(week[0].scheduled_date));
    assert_eq!(report.last_workout_date, Some(week[0].scheduled_date));
}

#[tokio::test]
async fn test_missed_workout_signal_reaches_threshold() {
    let (service, clock) = common::memory_service();
    let profile = common::runner_profile();
    let plan = service.generate_initial_plan(&profile, 8).await.unwrap();
    let week = first_week(&plan);

    assert!(service
        .check_missed_workouts(profile.user_id)
        .await
        .unwrap()
        .is_none());

    clock.set(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap());
    let signal = service
        .check_missed_workouts(profile.user_id)
        .await
        .unwrap()
        .expect("a week of untouched sessions should trip the threshold");

    let expected: Vec<Uuid> = week.iter().map(|w| w.id).collect();
    assert_eq!(signal.workout_ids, expected);
    assert_eq!(signal.window_start, common::date(2026, 3, 7));
    assert_eq!(signal.checked_on, common::date(2026, 3, 14));

    let outcome = service
        .adapt_for_missed_workouts(profile.user_id, signal.workout_ids)
        .await
        .unwrap();
    assert!(outcome.success);
    let report = service.progress(profile.user_id).await.unwrap();
    assert_eq!(report.total_missed, week.len());
}

#[tokio::test]
async fn test_single_miss_stays_below_threshold() {
    let (service, clock) = common::memory_service();
    let profile = common::runner_profile();
    let plan = service.generate_initial_plan(&profile, 8).await.unwrap();
    let week = first_week(&plan);
    for workout in &week[..week.len() - 1] {
        complete_on_schedule(&service, &clock, profile.user_id, workout).await;
    }
    clock.set(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap());

    let signal = service.check_missed_workouts(profile.user_id).await.unwrap();

    assert!(signal.is_none());
}

#[tokio::test]
async fn test_progress_without_plan_is_not_found() {
    let (service, _clock) = common::memory_service();
    let error = service.progress(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(error, TrainingError::NotFound { .. }));
}
