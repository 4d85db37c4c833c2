// ABOUTME: Timeline policy: stretch or compress the not-yet-started weeks to a new goal date
// ABOUTME: Started weeks are kept; the tail is re-phased and regenerated with the seeded planner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{Duration, NaiveDate};

use pierre_periodization::generator::segment_seed;
use pierre_periodization::phases::rescale_tail;
use pierre_periodization::{SessionConstraints, WeekPlanner};
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{AdaptationType, Phase, TrainingPlan, WorkoutStatus};

use super::{PolicyContext, PolicyOutcome};

/// Plan length that makes the final week contain `target_date`
#[must_use]
pub fn weeks_until(start_date: NaiveDate, target_date: NaiveDate) -> u32 {
    u32::try_from((target_date - start_date).num_days() / 7 + 1).unwrap_or(0)
}

/// Move the plan's end to the week containing `target_date`
///
/// Weeks that started on or before today are kept verbatim. The remaining
/// weeks are regenerated from rescaled phase lengths, so earlier difficulty
/// shifts in that span are not carried over; active restrictions are.
///
/// # Errors
///
/// - `Validation` when the target lies in the past, before the plan start, or
///   beyond the maximum plan length
/// - `InfeasibleAdaptation` when the target falls inside already started
///   weeks, when a later week already has recorded activity, or when the
///   remaining phases cannot meet their minimum lengths
pub fn retarget(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    target_date: NaiveDate,
) -> TrainingResult<PolicyOutcome> {
    if target_date < ctx.today {
        return Err(TrainingError::validation(format!(
            "target date {target_date} is in the past"
        )));
    }
    if target_date < plan.start_date {
        return Err(TrainingError::validation(format!(
            "target date {target_date} precedes the plan start {}",
            plan.start_date
        )));
    }
    let config = ctx.generator.phase_config();
    let new_total = weeks_until(plan.start_date, target_date);
    if new_total > config.max_total_weeks {
        return Err(TrainingError::validation(format!(
            "target date {target_date} would stretch the plan to {new_total} weeks (maximum {})",
            config.max_total_weeks
        )));
    }
    let old_total = plan.total_weeks;
    if new_total == old_total {
        return Ok(PolicyOutcome::unchanged(format!(
            "Plan already ends in the week of {target_date}"
        )));
    }

    let split = plan
        .weeks
        .iter()
        .position(|week| week.start_date > ctx.today)
        .unwrap_or(plan.weeks.len());
    let kept_weeks = u32::try_from(split).unwrap_or(u32::MAX);
    if new_total < kept_weeks {
        return Err(TrainingError::infeasible(format!(
            "target date {target_date} falls inside week {new_total}, which has already started"
        )));
    }
    if let Some(week) = plan.weeks[split..].iter().find(|week| {
        week.workouts
            .iter()
            .any(|workout| workout.status != WorkoutStatus::NotStarted)
    }) {
        return Err(TrainingError::infeasible(format!(
            "week {} already has recorded activity and cannot be regenerated",
            week.week_number
        )));
    }

    let kept: Vec<Phase> = plan.weeks[..split].iter().map(|week| week.phase).collect();
    let tail: Vec<Phase> = plan.weeks[split..].iter().map(|week| week.phase).collect();
    let phases = rescale_tail(&kept, &tail, new_total - kept_weeks, config)?;

    let mut planner = WeekPlanner::new(
        ctx.profile,
        plan.availability,
        SessionConstraints::from_plan(plan),
        segment_seed(plan.seed, plan.version),
    )?;
    let first_start = plan.start_date + Duration::weeks(i64::from(kept_weeks));
    let regenerated = planner.plan_weeks(&phases, kept_weeks + 1, first_start);

    let old_end = plan.end_date;
    plan.weeks.truncate(split);
    plan.weeks.extend(regenerated);
    plan.total_weeks = new_total;
    plan.end_date =
        plan.start_date + Duration::weeks(i64::from(plan.total_weeks)) - Duration::days(1);
    plan.refresh_current_week(ctx.today);

    let changed = (kept_weeks + 1..=new_total).collect();
    let mut outcome = PolicyOutcome::changed(
        AdaptationType::PhaseRescale,
        format!(
            "Moved plan end from {old_end} to {}: {old_total} to {new_total} weeks, regenerated weeks {}-{new_total}",
            plan.end_date,
            kept_weeks + 1
        ),
        &changed,
    );
    outcome.removed_weeks = (new_total + 1..=old_total).collect();
    Ok(outcome)
}
