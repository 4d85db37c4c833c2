// ABOUTME: Difficulty policy: shift the next window of sessions one step easier or harder
// ABOUTME: Shared by explicit user requests and perceived-difficulty feedback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use pierre_training_core::models::{AdaptationType, DifficultyDirection, TrainingPlan};

use super::{plural, PolicyContext, PolicyOutcome};

/// Shift the next `difficulty_window` upcoming workouts by one step
///
/// The planned intensity moves with the current one, so later missed-workout
/// recovery returns to the shifted level. Caps from fitness level and
/// restrictions still apply; at an extreme the plan is left unchanged.
#[must_use]
pub fn shift(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    direction: DifficultyDirection,
) -> PolicyOutcome {
    let step = direction.step();
    let mut changed = BTreeSet::new();
    let mut shifted = 0;

    let window: Vec<_> = plan
        .upcoming_workout_ids(ctx.today)
        .into_iter()
        .take(ctx.config.difficulty_window)
        .collect();
    for workout_id in window {
        let Some((week_index, workout_index)) = plan.locate_workout(workout_id) else {
            continue;
        };
        let discipline = plan.weeks[week_index].workouts[workout_index].discipline;
        let cap = ctx.intensity_cap(plan, discipline);

        let week = &mut plan.weeks[week_index];
        let workout = &mut week.workouts[workout_index];
        let planned = workout.planned_intensity.shifted(step).min(cap);
        let current = workout.intensity.shifted(step).min(cap);
        if planned != workout.planned_intensity || current != workout.intensity {
            workout.planned_intensity = planned;
            workout.intensity = current;
            changed.insert(week.week_number);
            shifted += 1;
        }
    }

    if shifted == 0 {
        return PolicyOutcome::unchanged(format!(
            "Upcoming sessions are already at the {direction} limit"
        ));
    }
    PolicyOutcome::changed(
        AdaptationType::IntensityShift,
        format!("Made {} {direction}", plural(shifted, "upcoming session")),
        &changed,
    )
}
