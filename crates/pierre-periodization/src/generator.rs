// ABOUTME: Periodized plan generation from a user profile and a target duration
// ABOUTME: Seeded ChaCha RNG keeps plan content reproducible; WeekPlanner is reused for regenerated segments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use pierre_training_core::constants::durations::{base_minutes, KEY_SESSION_BONUS_MINUTES};
use pierre_training_core::constants::exercises::{for_discipline, CatalogExercise};
use pierre_training_core::constants::scheduling::EXERCISES_PER_WORKOUT;
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{
    ActiveRestriction, DisciplineCeiling, Discipline, FitnessLevel, Intensity, MovementPattern,
    Phase, PlanStatus, TrainingPlan, TrainingWeek, UserProfile, WeeklyAvailability, Workout,
    WorkoutStatus,
};

use crate::config::PhaseConfig;
use crate::phases::allocate_weeks;
use crate::scheduling::{select_days, sessions_for_phase, DisciplineRotation};

/// Odd 64-bit constant (golden ratio) for deriving independent segment seeds
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed used when the caller supplies none
#[must_use]
pub fn default_seed(user_id: Uuid) -> u64 {
    let (high, low) = user_id.as_u64_pair();
    high ^ low.rotate_left(32)
}

/// Seed for a regenerated plan segment, stable for a given plan seed and salt
#[must_use]
pub const fn segment_seed(seed: u64, salt: u64) -> u64 {
    seed ^ salt.wrapping_add(1).wrapping_mul(SEED_MIX)
}

/// First Monday on or after `date`
#[must_use]
pub fn align_to_monday(date: NaiveDate) -> NaiveDate {
    let shift = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(i64::from(shift))
}

const fn phase_volume_percent(phase: Phase) -> u32 {
    match phase {
        Phase::Foundation => 90,
        Phase::Build | Phase::Intensity => 100,
        Phase::Peak => 95,
        Phase::Taper => 70,
        Phase::Recovery => 60,
    }
}

fn session_minutes(discipline: Discipline, level: FitnessLevel, phase: Phase) -> u16 {
    let minutes = u32::from(base_minutes(discipline)) * u32::from(level.duration_percent()) / 100
        * phase_volume_percent(phase)
        / 100;
    u16::try_from(minutes).unwrap_or(u16::MAX)
}

/// Generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Number of weeks
    pub total_weeks: u32,
    /// Earliest start; rolled forward to the next Monday
    pub start_date: NaiveDate,
    /// Deterministic seed; derived from the user id when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Pattern exclusions and intensity ceilings new sessions must respect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConstraints {
    /// Movement patterns no new exercise may load
    pub restricted_patterns: Vec<MovementPattern>,
    /// Per-discipline intensity ceilings
    pub ceilings: Vec<DisciplineCeiling>,
}

impl SessionConstraints {
    /// Constraints imposed by a set of active restrictions
    #[must_use]
    pub fn from_restrictions(restrictions: &[ActiveRestriction]) -> Self {
        let mut restricted_patterns: Vec<MovementPattern> = restrictions
            .iter()
            .flat_map(|restriction| restriction.patterns.iter().copied())
            .collect();
        restricted_patterns.sort_unstable();
        restricted_patterns.dedup();
        Self {
            restricted_patterns,
            ceilings: restrictions
                .iter()
                .flat_map(|restriction| restriction.ceilings.iter().copied())
                .collect(),
        }
    }

    /// Constraints currently in force on a plan
    #[must_use]
    pub fn from_plan(plan: &TrainingPlan) -> Self {
        Self::from_restrictions(&plan.restrictions)
    }

    /// Lowest ceiling for the discipline
    #[must_use]
    pub fn ceiling(&self, discipline: Discipline) -> Intensity {
        self.ceilings
            .iter()
            .filter(|ceiling| ceiling.discipline == discipline)
            .map(|ceiling| ceiling.ceiling)
            .min()
            .unwrap_or(Intensity::Maximum)
    }
}

/// Builds weeks and sessions for one profile from a seeded RNG
///
/// Used for whole plans and for segments regenerated by the adaptation engine.
#[derive(Debug)]
pub struct WeekPlanner<'a> {
    profile: &'a UserProfile,
    availability: WeeklyAvailability,
    constraints: SessionConstraints,
    rotation: DisciplineRotation,
    rng: ChaCha8Rng,
}

impl<'a> WeekPlanner<'a> {
    /// Create a planner
    ///
    /// # Errors
    ///
    /// Returns `Validation` for invalid availability or a profile without disciplines.
    pub fn new(
        profile: &'a UserProfile,
        availability: WeeklyAvailability,
        constraints: SessionConstraints,
        seed: u64,
    ) -> TrainingResult<Self> {
        availability.validate()?;
        Ok(Self {
            profile,
            availability,
            constraints,
            rotation: DisciplineRotation::from_profile(profile)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Sessions a week of this phase receives
    #[must_use]
    pub fn session_count(&self, phase: Phase) -> usize {
        sessions_for_phase(phase, &self.availability)
    }

    fn level(&self, discipline: Discipline) -> FitnessLevel {
        self.profile
            .level_for(discipline)
            .unwrap_or(FitnessLevel::Beginner)
    }

    /// Clamp a target intensity to the discipline's level cap and active ceilings
    #[must_use]
    pub fn capped_intensity(&self, discipline: Discipline, target: Intensity) -> Intensity {
        if discipline == Discipline::Mobility {
            return Intensity::Low;
        }
        target
            .min(self.level(discipline).intensity_cap())
            .min(self.constraints.ceiling(discipline))
    }

    fn candidates(&self, discipline: Discipline) -> Vec<&'static CatalogExercise> {
        for_discipline(discipline)
            .filter(|exercise| !exercise.touches(&self.constraints.restricted_patterns))
            .collect()
    }

    /// Consecutive weeks starting at `first_week_number` on `first_start`
    pub fn plan_weeks(
        &mut self,
        phases: &[Phase],
        first_week_number: u32,
        first_start: NaiveDate,
    ) -> Vec<TrainingWeek> {
        phases
            .iter()
            .enumerate()
            .map(|(offset, phase)| {
                let offset = offset as u32;
                self.plan_week(
                    first_week_number + offset,
                    *phase,
                    first_start + Duration::weeks(i64::from(offset)),
                )
            })
            .collect()
    }

    /// One week of sessions on evenly spread available days
    pub fn plan_week(
        &mut self,
        week_number: u32,
        phase: Phase,
        start_date: NaiveDate,
    ) -> TrainingWeek {
        let available = self.availability.days.weekdays();
        let offset = if available.is_empty() {
            0
        } else {
            self.rng.gen_range(0..available.len())
        };
        let days = select_days(&available, self.session_count(phase), offset);
        let mut workouts: Vec<Workout> = days
            .into_iter()
            .map(|day| {
                let date = start_date + Duration::days(i64::from(day.num_days_from_monday()));
                self.plan_session(phase, date)
            })
            .collect();
        self.designate_key(&mut workouts, phase);

        debug!(week_number, %phase, sessions = workouts.len(), "planned week");
        TrainingWeek {
            week_number,
            phase,
            start_date,
            end_date: start_date + Duration::days(6),
            workouts,
        }
    }

    /// One ordinary session on `date`, next discipline in the rotation
    ///
    /// Falls back to mobility when every exercise of the discipline loads a
    /// restricted pattern.
    pub fn plan_session(&mut self, phase: Phase, date: NaiveDate) -> Workout {
        let mut discipline = self.rotation.next_discipline();
        let mut candidates = self.candidates(discipline);
        if candidates.is_empty() {
            discipline = Discipline::Mobility;
            candidates = self.candidates(discipline);
        }
        let exercises = candidates
            .choose_multiple(&mut self.rng, EXERCISES_PER_WORKOUT)
            .map(|exercise| exercise.to_exercise())
            .collect();
        let intensity = self.capped_intensity(discipline, phase.base_intensity());

        Workout {
            id: Uuid::new_v4(),
            day: date.weekday(),
            scheduled_date: date,
            discipline,
            intensity,
            planned_intensity: intensity,
            status: WorkoutStatus::NotStarted,
            is_key: false,
            duration_minutes: session_minutes(discipline, self.level(discipline), phase),
            exercises,
            completed_at: None,
        }
    }

    /// Flag the week's key session if the phase has one and none is flagged yet
    ///
    /// The key session is the first session of the primary discipline (else the
    /// first non-mobility session); it is raised to the phase's key intensity,
    /// which makes it the hardest session of Intensity and Peak weeks.
    pub fn designate_key(&self, workouts: &mut [Workout], phase: Phase) {
        if !phase.has_key_workout() || workouts.iter().any(|workout| workout.is_key) {
            return;
        }
        let primary = self.rotation.primary();
        let index = workouts
            .iter()
            .position(|w| w.discipline == primary && w.discipline != Discipline::Mobility)
            .or_else(|| {
                workouts
                    .iter()
                    .position(|w| w.discipline != Discipline::Mobility)
            });
        if let Some(workout) = index.map(|index| &mut workouts[index]) {
            let intensity = self.capped_intensity(workout.discipline, phase.key_intensity());
            workout.is_key = true;
            workout.intensity = intensity;
            workout.planned_intensity = intensity;
            workout.duration_minutes = workout
                .duration_minutes
                .saturating_add(KEY_SESSION_BONUS_MINUTES);
        }
    }
}

/// Builds complete periodized plans
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    phases: PhaseConfig,
}

impl PlanGenerator {
    /// Create a generator with explicit phase proportions
    #[must_use]
    pub const fn new(phases: PhaseConfig) -> Self {
        Self { phases }
    }

    /// Phase proportions in use
    #[must_use]
    pub const fn phase_config(&self) -> &PhaseConfig {
        &self.phases
    }

    /// Generate a full plan
    ///
    /// Open injuries on the profile become pattern restrictions on the plan.
    /// The seed drives content only (day offsets, exercise picks). Identical
    /// `(profile, request)` input yields identical content; plan and workout
    /// ids are always fresh.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an invalid profile or plan length and
    /// `InfeasibleAdaptation` when the length is below the phase minimums.
    pub fn generate(
        &self,
        profile: &UserProfile,
        request: &PlanRequest,
        now: DateTime<Utc>,
    ) -> TrainingResult<TrainingPlan> {
        profile.validate()?;
        if request.total_weeks == 0 {
            return Err(TrainingError::validation("plan must span at least one week"));
        }
        let phases = allocate_weeks(request.total_weeks, &self.phases)?;
        let start_date = align_to_monday(request.start_date);
        let seed = request
            .seed
            .unwrap_or_else(|| default_seed(profile.user_id));

        let restrictions: Vec<ActiveRestriction> = profile
            .open_injuries()
            .map(|injury| ActiveRestriction {
                injury_id: injury.id,
                body_part: injury.body_part,
                patterns: injury.effective_restrictions(),
                ceilings: Vec::new(),
                since: injury.reported_on,
            })
            .collect();

        let mut planner = WeekPlanner::new(
            profile,
            profile.availability,
            SessionConstraints::from_restrictions(&restrictions),
            seed,
        )?;
        let weeks = planner.plan_weeks(&phases, 1, start_date);
        let total_weeks = weeks.len() as u32;

        let mut plan = TrainingPlan {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            status: PlanStatus::Active,
            total_weeks,
            current_week: 1,
            start_date,
            end_date: start_date + Duration::weeks(i64::from(total_weeks)) - Duration::days(1),
            version: 1,
            seed,
            availability: profile.availability,
            restrictions,
            weeks,
            created_at: now,
            updated_at: now,
        };
        plan.refresh_current_week(now.date_naive());
        plan.validate_structure()?;

        info!(
            plan_id = %plan.id,
            user_id = %plan.user_id,
            total_weeks,
            seed,
            workouts = plan.workouts().count(),
            "generated training plan"
        );
        Ok(plan)
    }
}
