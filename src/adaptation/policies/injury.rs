// ABOUTME: Injury policy: substitute or drop exercises loading restricted patterns, cap affected disciplines
// ABOUTME: Resolution lifts the ceilings and restores planned intensity within remaining restrictions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeSet;

use pierre_periodization::generator::segment_seed;
use pierre_periodization::{SessionConstraints, WeekPlanner};
use pierre_training_core::constants::durations::base_minutes;
use pierre_training_core::constants::exercises::{for_discipline, safe_alternative};
use pierre_training_core::constants::scheduling::EXERCISES_PER_WORKOUT;
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{
    ActiveRestriction, AdaptationType, Discipline, DisciplineCeiling, Intensity, MovementPattern,
    Phase, TrainingPlan, Workout,
};
use uuid::Uuid;

use super::{plural, PolicyContext, PolicyOutcome};
use crate::adaptation::InjuryReport;

/// Disciplines with at least one catalog exercise loading a restricted pattern
#[must_use]
pub fn affected_disciplines(patterns: &[MovementPattern]) -> Vec<Discipline> {
    Discipline::ALL
        .into_iter()
        .filter(|discipline| *discipline != Discipline::Mobility)
        .filter(|discipline| for_discipline(*discipline).any(|e| e.touches(patterns)))
        .collect()
}

#[derive(Debug, Default)]
struct Tally {
    substituted: usize,
    dropped: usize,
    converted: usize,
    removed: usize,
    capped: usize,
    rekeyed: usize,
}

/// Rewrite one workout around the restricted patterns
///
/// Returns `false` when the session has to be removed entirely.
fn rework(workout: &mut Workout, restricted: &[MovementPattern], tally: &mut Tally) -> bool {
    if !workout.touches(restricted) {
        return true;
    }
    let original = std::mem::take(&mut workout.exercises);
    let mut taken: Vec<String> = original.iter().map(|e| e.name.clone()).collect();
    let mut kept = Vec::with_capacity(original.len());
    for exercise in original {
        if !exercise.touches(restricted) {
            kept.push(exercise);
            continue;
        }
        let exclude: Vec<&str> = taken.iter().map(String::as_str).collect();
        match safe_alternative(workout.discipline, restricted, &exclude) {
            Some(alternative) => {
                taken.push(alternative.name.to_owned());
                kept.push(alternative.to_exercise());
                tally.substituted += 1;
            }
            None => tally.dropped += 1,
        }
    }
    workout.exercises = kept;
    if !workout.exercises.is_empty() {
        return true;
    }

    let mobility: Vec<_> = for_discipline(Discipline::Mobility)
        .filter(|e| !e.touches(restricted))
        .take(EXERCISES_PER_WORKOUT)
        .map(|e| e.to_exercise())
        .collect();
    if mobility.is_empty() {
        tally.removed += 1;
        return false;
    }
    workout.discipline = Discipline::Mobility;
    workout.exercises = mobility;
    workout.intensity = Intensity::Low;
    workout.planned_intensity = Intensity::Low;
    workout.is_key = false;
    workout.duration_minutes = base_minutes(Discipline::Mobility);
    tally.converted += 1;
    true
}

/// Hand the key role to a remaining upcoming session after the key one was dropped or converted
fn rekey(
    planner: &WeekPlanner<'_>,
    workouts: Vec<Workout>,
    phase: Phase,
    ctx: &PolicyContext<'_>,
    tally: &mut Tally,
) -> Vec<Workout> {
    let (mut fixed, mut upcoming): (Vec<Workout>, Vec<Workout>) = workouts
        .into_iter()
        .partition(|workout| !workout.is_adaptable(ctx.today));
    planner.designate_key(&mut upcoming, phase);
    if upcoming.iter().any(|workout| workout.is_key) {
        tally.rekeyed += 1;
    }
    fixed.extend(upcoming);
    fixed.sort_by_key(|workout| workout.scheduled_date);
    fixed
}

/// Apply an injury restriction to every upcoming workout
///
/// Reporting the same injury twice is a no-op.
///
/// # Errors
///
/// Returns `Validation` when the report restricts no movement pattern.
pub fn apply(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    report: &InjuryReport,
) -> TrainingResult<PolicyOutcome> {
    if plan
        .restrictions
        .iter()
        .any(|restriction| restriction.injury_id == report.injury_id)
    {
        return Ok(PolicyOutcome::unchanged(format!(
            "Injury {} is already applied to the plan",
            report.injury_id
        )));
    }
    let patterns = report.patterns();
    if patterns.is_empty() {
        return Err(TrainingError::validation(
            "injury report must restrict at least one movement pattern",
        ));
    }

    let ceiling = ctx.config.injury_intensity_ceiling;
    let affected = affected_disciplines(&patterns);
    plan.restrictions.push(ActiveRestriction {
        injury_id: report.injury_id,
        body_part: report.body_part,
        patterns: patterns.clone(),
        ceilings: affected
            .iter()
            .map(|discipline| DisciplineCeiling {
                discipline: *discipline,
                ceiling,
            })
            .collect(),
        since: ctx.today,
    });
    let restricted = plan.restricted_patterns();
    let planner = WeekPlanner::new(
        ctx.profile,
        plan.availability,
        SessionConstraints::from_plan(plan),
        segment_seed(plan.seed, plan.version),
    )?;

    let mut tally = Tally::default();
    let mut changed = BTreeSet::new();
    for week_index in 0..plan.weeks.len() {
        let phase = plan.weeks[week_index].phase;
        let mut workouts = std::mem::take(&mut plan.weeks[week_index].workouts);
        let before = workouts.clone();
        workouts.retain_mut(|workout| {
            !workout.is_adaptable(ctx.today) || rework(workout, &restricted, &mut tally)
        });
        if before.iter().any(|w| w.is_key) && !workouts.iter().any(|w| w.is_key) {
            workouts = rekey(&planner, workouts, phase, ctx, &mut tally);
        }
        for workout in workouts.iter_mut().filter(|w| w.is_adaptable(ctx.today)) {
            let cap = ctx.intensity_cap(plan, workout.discipline);
            if workout.intensity > cap {
                workout.intensity = cap;
                tally.capped += 1;
            }
        }
        let week = &mut plan.weeks[week_index];
        if workouts != before {
            changed.insert(week.week_number);
        }
        week.workouts = workouts;
    }

    let disciplines = affected
        .iter()
        .map(Discipline::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let description = format!(
        "{} injury: restricted {}; substituted {}, dropped {}, converted {} to mobility, removed {}; capped {} at {} intensity ({}); moved key session in {}",
        report.body_part,
        patterns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        plural(tally.substituted, "exercise"),
        plural(tally.dropped, "exercise"),
        plural(tally.converted, "session"),
        plural(tally.removed, "session"),
        plural(tally.capped, "session"),
        ceiling,
        if disciplines.is_empty() { "no discipline affected".to_owned() } else { disciplines },
        plural(tally.rekeyed, "week"),
    );
    Ok(PolicyOutcome::changed(
        AdaptationType::InjuryModification,
        description,
        &changed,
    ))
}

/// Lift an injury restriction and restore planned intensities it held down
///
/// Substituted exercises stay as they are.
///
/// # Errors
///
/// Returns `NotFound` when the plan has no restriction for `injury_id`.
pub fn resolve(
    ctx: &PolicyContext<'_>,
    plan: &mut TrainingPlan,
    injury_id: Uuid,
) -> TrainingResult<PolicyOutcome> {
    let index = plan
        .restrictions
        .iter()
        .position(|restriction| restriction.injury_id == injury_id)
        .ok_or_else(|| TrainingError::not_found("injury restriction", injury_id))?;
    let lifted = plan.restrictions.remove(index);
    let disciplines: Vec<Discipline> = lifted.ceilings.iter().map(|c| c.discipline).collect();

    let mut restored = 0;
    let mut changed = BTreeSet::new();
    for week_index in 0..plan.weeks.len() {
        for workout_index in 0..plan.weeks[week_index].workouts.len() {
            let workout = &plan.weeks[week_index].workouts[workout_index];
            if !workout.is_adaptable(ctx.today) || !disciplines.contains(&workout.discipline) {
                continue;
            }
            let target = workout
                .planned_intensity
                .min(ctx.intensity_cap(plan, workout.discipline));
            if workout.intensity < target {
                let week = &mut plan.weeks[week_index];
                week.workouts[workout_index].intensity = target;
                changed.insert(week.week_number);
                restored += 1;
            }
        }
    }

    Ok(PolicyOutcome::changed(
        AdaptationType::RestrictionLifted,
        format!(
            "{} injury resolved; restored planned intensity of {}",
            lifted.body_part,
            plural(restored, "session")
        ),
        &changed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::policies::fixtures;
    use crate::config::AdaptationConfig;
    use pierre_periodization::PlanGenerator;
    use pierre_training_core::models::BodyPart;

    #[test]
    fn test_knee_injury_clears_restricted_patterns_from_upcoming_workouts() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let report = InjuryReport::new(BodyPart::Knee, Vec::new());
        let outcome = apply(&ctx, &mut plan, &report).unwrap();
        assert_eq!(outcome.adaptation_type, AdaptationType::InjuryModification);

        let restricted = BodyPart::Knee.default_restrictions();
        for workout in plan.workouts() {
            assert!(!workout.touches(restricted));
            if workout.discipline == Discipline::Run {
                assert!(workout.intensity <= Intensity::Moderate);
            }
        }
        assert_eq!(plan.restrictions.len(), 1);
        assert!(plan.validate_structure().is_ok());
    }

    #[test]
    fn test_converted_key_session_hands_key_to_another_session() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let index = plan
            .weeks
            .iter()
            .position(|w| w.workouts.len() >= 2 && w.workouts.iter().any(|x| x.is_key))
            .unwrap();
        let converted_id = {
            let key = plan.weeks[index]
                .workouts
                .iter_mut()
                .find(|w| w.is_key)
                .unwrap();
            key.discipline = Discipline::Ride;
            key.exercises = for_discipline(Discipline::Ride)
                .take(1)
                .map(|e| e.to_exercise())
                .collect();
            key.id
        };

        let report = InjuryReport::new(
            BodyPart::Knee,
            vec![MovementPattern::KneeFlexion, MovementPattern::Pull],
        );
        let outcome = apply(&ctx, &mut plan, &report).unwrap();

        let week = &plan.weeks[index];
        assert!(outcome.changed_weeks.contains(&week.week_number));
        let converted = week.workouts.iter().find(|w| w.id == converted_id).unwrap();
        assert_eq!(converted.discipline, Discipline::Mobility);
        assert!(!converted.is_key);
        let keys: Vec<_> = week.workouts.iter().filter(|w| w.is_key).collect();
        assert_eq!(keys.len(), 1);
        assert_ne!(keys[0].discipline, Discipline::Mobility);
        assert!(outcome.description.contains("moved key session in 1 week"));
        assert!(plan.validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_report_is_no_change() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let report = InjuryReport::new(BodyPart::Shoulder, Vec::new());
        apply(&ctx, &mut plan, &report).unwrap();
        let again = apply(&ctx, &mut plan, &report).unwrap();
        assert_eq!(again.adaptation_type, AdaptationType::NoChange);
        assert_eq!(plan.restrictions.len(), 1);
    }

    #[test]
    fn test_resolution_restores_planned_intensity() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let original = plan.clone();
        let config = AdaptationConfig {
            injury_intensity_ceiling: Intensity::Low,
            ..AdaptationConfig::default()
        };
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);

        let report = InjuryReport::new(BodyPart::Wrist, vec![MovementPattern::HorizontalPush]);
        apply(&ctx, &mut plan, &report).unwrap();
        assert!(plan
            .workouts()
            .filter(|w| w.discipline == Discipline::Strength)
            .all(|w| w.intensity == Intensity::Low));

        let outcome = resolve(&ctx, &mut plan, report.injury_id).unwrap();
        assert_eq!(outcome.adaptation_type, AdaptationType::RestrictionLifted);
        assert!(plan.restrictions.is_empty());
        for workout in plan.workouts().filter(|w| w.discipline == Discipline::Strength) {
            let before = original.workout(workout.id).unwrap();
            assert_eq!(workout.intensity, before.intensity);
        }
    }

    #[test]
    fn test_resolving_unknown_injury_is_not_found() {
        let profile = fixtures::profile();
        let mut plan = fixtures::plan(&profile, 8);
        let config = AdaptationConfig::default();
        let generator = PlanGenerator::default();
        let ctx = fixtures::context(&config, &generator, &profile, plan.start_date);
        assert!(matches!(
            resolve(&ctx, &mut plan, Uuid::new_v4()),
            Err(TrainingError::NotFound { .. })
        ));
    }

    #[test]
    fn test_swim_is_unaffected_by_ankle_injury() {
        assert!(!affected_disciplines(BodyPart::Ankle.default_restrictions())
            .contains(&Discipline::Swim));
        assert!(affected_disciplines(BodyPart::Ankle.default_restrictions())
            .contains(&Discipline::Run));
    }
}
