// ABOUTME: Schedule policy: move remaining sessions onto the athlete's new available days
// ABOUTME: Session counts are re-clamped per week; missing sessions come from the seeded week planner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use chrono::{Duration, Weekday};

use pierre_periodization::generator::segment_seed;
use pierre_periodization::scheduling::select_days;
use pierre_periodization::{SessionConstraints, WeekPlanner};
use pierre_training_core::errors::TrainingResult;
use pierre_training_core::models::{
    AdaptationType, TrainingPlan, TrainingWeek, WeeklyAvailability, Workout,
};

use super::{plural, PolicyContext, PolicyOutcome};

#[derive(Debug, Default)]
struct Tally {
    moved: usize,
    added: usize,
    dropped: usize,
}

/// Movable sessions to keep: key sessions first, then in date order
fn keep_priority(mut movable: Vec<Workout>, keep: usize) -> (Vec<Workout>, usize) {
    movable.sort_by_key(|workout| (!workout.is_key, workout.scheduled_date));
    let dropped = movable.len().saturating_sub(keep);
    movable.truncate(keep);
    movable.sort_by_key(|workout| workout.scheduled_date);
    (movable, dropped)
}

fn redistribute_week(
    ctx: &PolicyContext<'_>,
    planner: &mut WeekPlanner<'_>,
    week: &mut TrainingWeek,
    availability: &WeeklyAvailability,
    tally: &mut Tally,
) {
    let (fixed, movable): (Vec<Workout>, Vec<Workout>) = std::mem::take(&mut week.workouts)
        .into_iter()
        .partition(|workout| !workout.is_adaptable(ctx.today));

    let occupied: Vec<Weekday> = fixed.iter().map(|workout| workout.day).collect();
    let candidates: Vec<Weekday> = availability
        .days
        .weekdays()
        .into_iter()
        .filter(|day| {
            let date = week.start_date + Duration::days(i64::from(day.num_days_from_monday()));
            date >= ctx.today && !occupied.contains(day)
        })
        .collect();

    let target = availability.clamp_sessions(fixed.len() + movable.len());
    let keep = target.saturating_sub(fixed.len()).min(candidates.len());
    let (mut movable, dropped) = keep_priority(movable, keep);
    tally.dropped += dropped;
    while movable.len() < keep {
        movable.push(planner.plan_session(week.phase, week.start_date));
        tally.added += 1;
    }

    let days = select_days(&candidates, movable.len(), 0);
    for (workout, day) in movable.iter_mut().zip(days) {
        let date = week.start_date + Duration::days(i64::from(day.num_days_from_monday()));
        if workout.scheduled_date != date {
            workout.scheduled_date = date;
            workout.day = day;
            tally.moved += 1;
        }
    }
    if !fixed.iter().any(|workout| workout.is_key) {
        planner.designate_key(&mut movable, week.phase);
    }

    week.workouts = fixed;
    week.workouts.extend(movable);
    week.sort_workouts();
}

/// Redistribute every remaining week onto `availability`
///
/// Completed, missed, and past sessions stay where they are. Sessions added
/// to reach the new minimum respect active restrictions.
///
/// # Errors
///
/// Returns `Validation` for invalid availability.
pub fn redistribute(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    availability: WeeklyAvailability,
) -> TrainingResult<PolicyOutcome> {
    availability.validate()?;
    let mut planner = WeekPlanner::new(
        ctx.profile,
        availability,
        SessionConstraints::from_plan(plan),
        segment_seed(plan.seed, plan.version),
    )?;

    let mut tally = Tally::default();
    let mut changed = BTreeSet::new();
    for week in plan.weeks.iter_mut().filter(|week| week.end_date >= ctx.today) {
        let before = week.workouts.clone();
        redistribute_week(ctx, &mut planner, week, &availability, &mut tally);
        if week.workouts != before {
            changed.insert(week.week_number);
        }
    }

    let availability_changed = plan.availability != availability;
    plan.availability = availability;
    if changed.is_empty() && !availability_changed {
        return Ok(PolicyOutcome::unchanged(
            "Schedule already matches the requested availability",
        ));
    }

    let days = availability
        .days
        .weekdays()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Ok(PolicyOutcome::changed(
        AdaptationType::ScheduleRedistribution,
        format!(
            "Rescheduled onto {days} ({}-{} sessions/week): moved {}, added {}, dropped {}",
            availability.min_sessions,
            availability.max_sessions,
            plural(tally.moved, "session"),
            plural(tally.added, "session"),
            plural(tally.dropped, "session"),
        ),
        &changed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::policies::fixtures;
    use crate::config::AdaptationConfig;
    use chrono::Datelike;
    use pierre_periodization::PlanGenerator;
    use pierre_training_core::models::WorkoutStatus;

    #[test]
    fn test_sessions_move_onto_new_days() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let availability = WeeklyAvailability::new(&[Weekday::Tue, Weekday::Sat], 1, 2);
        let outcome = redistribute(&ctx, &mut plan, availability).unwrap();
        assert_eq!(
            outcome.adaptation_type,
            AdaptationType::ScheduleRedistribution
        );
        for week in &plan.weeks {
            assert!((1..=2).contains(&week.workouts.len()));
            for workout in &week.workouts {
                assert!(matches!(workout.day, Weekday::Tue | Weekday::Sat));
                assert_eq!(workout.scheduled_date.weekday(), workout.day);
            }
        }
        assert_eq!(plan.availability, availability);
        plan.validate_structure().unwrap();
    }

    #[test]
    fn test_past_and_finished_sessions_stay_put() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let first = plan.weeks[0].workouts[0].id;
        plan.workout_mut(first).unwrap().status = WorkoutStatus::Completed;
        let pinned = plan.workout(first).cloned().unwrap();

        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let today = plan.start_date + Duration::days(2);
        let ctx = fixtures::context(&config, &generator, &profile, today);

        let availability =
            WeeklyAvailability::new(&[Weekday::Mon, Weekday::Thu, Weekday::Sun], 2, 3);
        redistribute(&ctx, &mut plan, availability).unwrap();

        assert_eq!(plan.workout(first), Some(&pinned));
        for workout in plan.weeks[0].workouts.iter().filter(|w| w.id != first) {
            assert!(workout.scheduled_date >= today);
        }
        plan.validate_structure().unwrap();
    }

    #[test]
    fn test_more_days_add_sessions_up_to_minimum() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let availability = WeeklyAvailability::new(
            &[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            4,
            5,
        );
        redistribute(&ctx, &mut plan, availability).unwrap();
        assert!(plan.weeks.iter().all(|week| week.workouts.len() >= 4));
    }

    #[test]
    fn test_invalid_availability_is_rejected() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let availability = WeeklyAvailability::new(&[Weekday::Mon], 2, 3);
        assert!(redistribute(&ctx, &mut plan, availability).is_err());
    }
}
