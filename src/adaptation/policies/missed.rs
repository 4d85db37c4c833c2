// ABOUTME: Missed-workouts policy: record misses, then ease the next sessions back into the plan
// ABOUTME: Reduction tapers over a rolling window; later sessions return to their planned intensity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use uuid::Uuid;

use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{AdaptationType, TrainingPlan};

use super::{plural, PolicyContext, PolicyOutcome};

/// Steps removed from the `position`-th upcoming workout (0-based)
///
/// `ceil(steps * (window - position) / window)`: full reduction first, at
/// least one step anywhere inside the window, nothing after it.
#[must_use]
pub fn reduction_at(position: usize, window: usize, steps: u8) -> i32 {
    if window == 0 || position >= window {
        return 0;
    }
    let remaining = window - position;
    (usize::from(steps) * remaining).div_ceil(window) as i32
}

/// Mark `workout_ids` missed and recompute upcoming intensities
///
/// # Errors
///
/// - `NotFound` when an id is not part of the plan
/// - `IllegalTransition` when a named workout is `InProgress`, `Completed`,
///   or `Skipped`; nothing is changed in that case
pub fn apply(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    workout_ids: &[Uuid],
) -> TrainingResult<PolicyOutcome> {
    let mut changed = BTreeSet::new();
    let mut newly_missed = 0;

    for workout_id in workout_ids {
        let (week_index, workout_index) = plan
            .locate_workout(*workout_id)
            .ok_or_else(|| TrainingError::not_found("workout", workout_id))?;
        let week = &mut plan.weeks[week_index];
        if week.workouts[workout_index].mark_missed()? {
            newly_missed += 1;
            changed.insert(week.week_number);
        }
    }

    let window = ctx.config.missed_recovery_window;
    let steps = ctx.config.missed_intensity_steps;
    let mut reduced = 0;
    let mut restored = 0;
    for (position, workout_id) in plan.upcoming_workout_ids(ctx.today).into_iter().enumerate() {
        let Some((week_index, workout_index)) = plan.locate_workout(workout_id) else {
            continue;
        };
        let discipline = plan.weeks[week_index].workouts[workout_index].discipline;
        let cap = ctx.intensity_cap(plan, discipline);
        let reduction = reduction_at(position, window, steps);

        let week = &mut plan.weeks[week_index];
        let workout = &mut week.workouts[workout_index];
        let target = workout.planned_intensity.shifted(-reduction).min(cap);
        if workout.intensity != target {
            workout.intensity = target;
            changed.insert(week.week_number);
            if reduction > 0 {
                reduced += 1;
            } else {
                restored += 1;
            }
        }
    }

    if changed.is_empty() {
        return Ok(PolicyOutcome::unchanged(
            "Workouts were already recorded as missed; upcoming intensities unchanged",
        ));
    }
    let mut description = format!("Marked {} as missed", plural(newly_missed, "workout"));
    if reduced > 0 {
        description.push_str(&format!(
            "; reduced intensity of the next {}",
            plural(reduced, "workout")
        ));
    }
    if restored > 0 {
        description.push_str(&format!(
            "; restored {} to planned intensity",
            plural(restored, "workout")
        ));
    }
    Ok(PolicyOutcome::changed(
        AdaptationType::IntensityReduction,
        description,
        &changed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::policies::fixtures;
    use crate::config::AdaptationConfig;
    use pierre_periodization::PlanGenerator;
    use pierre_training_core::models::WorkoutStatus;

    #[test]
    fn test_reduction_tapers_over_window() {
        assert_eq!(
            (0..4).map(|p| reduction_at(p, 3, 2)).collect::<Vec<_>>(),
            vec![2, 2, 1, 0]
        );
        assert_eq!(
            (0..4).map(|p| reduction_at(p, 3, 1)).collect::<Vec<_>>(),
            vec![1, 1, 1, 0]
        );
    }

    #[test]
    fn test_misses_recorded_and_window_reduced() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let ids: Vec<Uuid> = plan.weeks[0].workouts.iter().take(2).map(|w| w.id).collect();
        let outcome = apply(&ctx, &mut plan, &ids).unwrap();
        assert_eq!(outcome.adaptation_type, AdaptationType::IntensityReduction);
        for id in &ids {
            assert_eq!(plan.workout(*id).unwrap().status, WorkoutStatus::Missed);
        }
        let upcoming = plan.upcoming_workout_ids(ctx.today);
        for id in upcoming.iter().take(config.missed_recovery_window) {
            let w = plan.workout(*id).unwrap();
            let cap = ctx.intensity_cap(&plan, w.discipline);
            assert_eq!(w.intensity, w.planned_intensity.step_down().min(cap));
        }
    }

    #[test]
    fn test_completed_workout_fails_loudly_and_plan_is_unchanged() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let done = plan.weeks[0].workouts[0].id;
        let workout = plan.workout_mut(done).unwrap();
        workout.start().unwrap();
        workout.complete(fixtures::now()).unwrap();
        let before = plan.clone();

        let mut copy = plan.clone();
        let result = apply(&ctx, &mut copy, &[done]);
        assert!(matches!(
            result,
            Err(TrainingError::IllegalTransition { .. })
        ));
        assert_eq!(plan, before);
        assert_eq!(plan.workout(done).unwrap().status, WorkoutStatus::Completed);
    }

    #[test]
    fn test_repeated_miss_is_no_change() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let id = plan.weeks[0].workouts[0].id;
        apply(&ctx, &mut plan, &[id]).unwrap();
        let second = apply(&ctx, &mut plan, &[id]).unwrap();
        assert_eq!(second.adaptation_type, AdaptationType::NoChange);
    }

    #[test]
    fn test_unknown_workout_is_not_found() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);
        let result = apply(&ctx, &mut plan, &[Uuid::new_v4()]);
        assert!(matches!(result, Err(TrainingError::NotFound { .. })));
        assert!(plan
            .workouts()
            .all(|w| w.status == WorkoutStatus::NotStarted));
    }
}
