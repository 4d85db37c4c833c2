// ABOUTME: Weekly session placement: session counts per phase, day selection, discipline rotation
// ABOUTME: Smooth weighted round-robin gives higher-priority goal disciplines more sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Weekday;
use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::{Discipline, Phase, UserProfile, WeeklyAvailability};

/// Extra rotation weight per rank step of an active goal
const GOAL_RANK_WEIGHT: i64 = 2;

/// Sessions per week for a phase, within the availability bounds
///
/// Foundation and Recovery use the minimum, Intensity and Peak the maximum,
/// Build the upper midpoint and Taper the lower midpoint.
#[must_use]
pub fn sessions_for_phase(phase: Phase, availability: &WeeklyAvailability) -> usize {
    let min = usize::from(availability.min_sessions);
    let max = usize::from(availability.max_sessions);
    let count = match phase {
        Phase::Foundation | Phase::Recovery => min,
        Phase::Build => (min + max).div_ceil(2),
        Phase::Intensity | Phase::Peak => max,
        Phase::Taper => (min + max) / 2,
    };
    availability
        .clamp_sessions(count)
        .min(availability.days.count())
}

/// Pick `count` of the available days, spread evenly and rotated by `offset`
///
/// The result is in calendar order and never repeats a day.
#[must_use]
pub fn select_days(available: &[Weekday], count: usize, offset: usize) -> Vec<Weekday> {
    let slots = available.len();
    if slots == 0 {
        return Vec::new();
    }
    let count = count.min(slots);
    let mut days: Vec<Weekday> = (0..count)
        .map(|i| available[(i * slots / count + offset) % slots])
        .collect();
    days.sort_by_key(Weekday::num_days_from_monday);
    days
}

#[derive(Debug, Clone)]
struct RotationSlot {
    discipline: Discipline,
    weight: i64,
    current: i64,
}

/// Smooth weighted round-robin over the athlete's disciplines
///
/// Every listed discipline has weight 1; an active goal of rank `r` (0-based,
/// ordered by priority) among `g` goals adds `2 * (g - r)` to its discipline.
#[derive(Debug, Clone)]
pub struct DisciplineRotation {
    slots: Vec<RotationSlot>,
    total: i64,
}

impl DisciplineRotation {
    /// Build the rotation for a profile
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the profile lists no disciplines and has no goals.
    pub fn from_profile(profile: &UserProfile) -> TrainingResult<Self> {
        let mut slots: Vec<RotationSlot> = Vec::new();
        let mut add = |discipline: Discipline, weight: i64| {
            if let Some(slot) = slots.iter_mut().find(|s| s.discipline == discipline) {
                slot.weight += weight;
            } else {
                slots.push(RotationSlot {
                    discipline,
                    weight,
                    current: 0,
                });
            }
        };

        for entry in &profile.fitness_levels {
            add(entry.discipline, 1);
        }
        let goals = profile.active_goals();
        let goal_count = goals.len() as i64;
        for (rank, goal) in goals.iter().enumerate() {
            add(goal.discipline, GOAL_RANK_WEIGHT * (goal_count - rank as i64));
        }

        if slots.is_empty() {
            return Err(TrainingError::validation(
                "profile has no disciplines to schedule",
            ));
        }
        let total = slots.iter().map(|slot| slot.weight).sum();
        Ok(Self { slots, total })
    }

    /// Discipline with the largest weight (earliest listed on ties)
    #[must_use]
    pub fn primary(&self) -> Discipline {
        self.slots
            .iter()
            .fold(None::<&RotationSlot>, |best, slot| match best {
                Some(b) if b.weight >= slot.weight => Some(b),
                _ => Some(slot),
            })
            .map_or(Discipline::Mobility, |slot| slot.discipline)
    }

    /// Next discipline in the rotation
    pub fn next_discipline(&mut self) -> Discipline {
        for slot in &mut self.slots {
            slot.current += slot.weight;
        }
        let mut chosen = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.current > self.slots[chosen].current {
                chosen = index;
            }
        }
        self.slots[chosen].current -= self.total;
        self.slots[chosen].discipline
    }
}
