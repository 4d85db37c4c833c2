// ABOUTME: Static exercise catalog with the movement patterns each exercise loads
// ABOUTME: Source for workout composition and for injury-safe substitutions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{Discipline, Exercise, MovementPattern};

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogExercise {
    /// Discipline the exercise belongs to
    pub discipline: Discipline,
    /// Display name
    pub name: &'static str,
    /// Movement patterns loaded
    pub patterns: &'static [MovementPattern],
}

impl CatalogExercise {
    /// Owned exercise for placement in a workout
    #[must_use]
    pub fn to_exercise(&self) -> Exercise {
        Exercise {
            name: self.name.to_owned(),
            patterns: self.patterns.to_vec(),
        }
    }

    /// Whether the entry loads any restricted pattern
    #[must_use]
    pub fn touches(&self, restricted: &[MovementPattern]) -> bool {
        self.patterns.iter().any(|pattern| restricted.contains(pattern))
    }
}

use MovementPattern::{
    HipHinge, HorizontalPush, Impact, KneeFlexion, OverheadPress, Pull, Rotation, SpinalLoading,
    Squat,
};

const fn entry(
    discipline: Discipline,
    name: &'static str,
    patterns: &'static [MovementPattern],
) -> CatalogExercise {
    CatalogExercise {
        discipline,
        name,
        patterns,
    }
}

/// Full catalog in stable order
pub const CATALOG: &[CatalogExercise] = &[
    entry(Discipline::Run, "Easy aerobic run", &[Impact, KneeFlexion]),
    entry(Discipline::Run, "Tempo intervals", &[Impact, KneeFlexion]),
    entry(Discipline::Run, "Hill repeats", &[Impact, HipHinge]),
    entry(Discipline::Run, "Strides", &[Impact]),
    entry(Discipline::Run, "Deep-water running", &[]),
    entry(Discipline::Ride, "Endurance spin", &[KneeFlexion]),
    entry(Discipline::Ride, "Sweet-spot intervals", &[KneeFlexion]),
    entry(Discipline::Ride, "Standing climbs", &[KneeFlexion, SpinalLoading]),
    entry(Discipline::Ride, "High-cadence drills", &[KneeFlexion]),
    entry(Discipline::Ride, "Arm-ergometer intervals", &[Pull]),
    entry(Discipline::Swim, "Aerobic freestyle set", &[Pull, Rotation]),
    entry(Discipline::Swim, "Technique drills", &[Pull]),
    entry(Discipline::Swim, "Pull-buoy set", &[Pull, OverheadPress]),
    entry(Discipline::Swim, "Kick set", &[]),
    entry(Discipline::Strength, "Back squat", &[Squat, KneeFlexion, SpinalLoading]),
    entry(Discipline::Strength, "Romanian deadlift", &[HipHinge, SpinalLoading]),
    entry(Discipline::Strength, "Overhead press", &[OverheadPress]),
    entry(Discipline::Strength, "Push-up", &[HorizontalPush]),
    entry(Discipline::Strength, "Bent-over row", &[Pull, HipHinge]),
    entry(Discipline::Strength, "Pallof press", &[Rotation]),
    entry(Discipline::Strength, "Dead bug", &[]),
    entry(Discipline::Mobility, "Hip mobility flow", &[]),
    entry(Discipline::Mobility, "Thoracic rotations", &[Rotation]),
    entry(Discipline::Mobility, "Ankle mobility", &[]),
    entry(Discipline::Mobility, "Breathing and stretch", &[]),
];

/// Catalog entries for a discipline in catalog order
pub fn for_discipline(discipline: Discipline) -> impl Iterator<Item = &'static CatalogExercise> {
    CATALOG
        .iter()
        .filter(move |exercise| exercise.discipline == discipline)
}

/// First entry of the discipline that avoids every restricted pattern and is not excluded by name
#[must_use]
pub fn safe_alternative(
    discipline: Discipline,
    restricted: &[MovementPattern],
    exclude: &[&str],
) -> Option<&'static CatalogExercise> {
    for_discipline(discipline)
        .find(|exercise| !exercise.touches(restricted) && !exclude.contains(&exercise.name))
}
