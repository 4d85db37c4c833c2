// ABOUTME: Closed taxonomies for training: disciplines, intensity levels, phases, movement patterns
// ABOUTME: Ordered intensity stepping, body-part to movement-pattern mapping, fitness levels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Training discipline of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Running
    Run,
    /// Cycling
    Ride,
    /// Swimming
    Swim,
    /// Resistance training
    Strength,
    /// Mobility and flexibility work
    Mobility,
}

impl Discipline {
    /// All disciplines in declaration order
    pub const ALL: [Self; 5] = [
        Self::Run,
        Self::Ride,
        Self::Swim,
        Self::Strength,
        Self::Mobility,
    ];

    /// Lowercase identifier used in logs and prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Ride => "ride",
            Self::Swim => "swim",
            Self::Strength => "strength",
            Self::Mobility => "mobility",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete intensity level, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Recovery / conversational effort
    Low,
    /// Steady aerobic effort
    Moderate,
    /// Threshold effort
    High,
    /// Race-pace or above
    Maximum,
}

impl Intensity {
    /// Levels in ascending order
    pub const LEVELS: [Self; 4] = [Self::Low, Self::Moderate, Self::High, Self::Maximum];

    /// Zero-based position in the ascending scale
    #[must_use]
    pub const fn level(&self) -> usize {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::High => 2,
            Self::Maximum => 3,
        }
    }

    /// Shift by `steps` levels (negative = easier), clamped at both ends
    #[must_use]
    pub fn shifted(self, steps: i32) -> Self {
        let max_level = Self::LEVELS.len() as i32 - 1;
        let target = (self.level() as i32 + steps).clamp(0, max_level);
        Self::LEVELS[target as usize]
    }

    /// One level harder, or unchanged at `Maximum`
    #[must_use]
    pub fn step_up(self) -> Self {
        self.shifted(1)
    }

    /// One level easier, or unchanged at `Low`
    #[must_use]
    pub fn step_down(self) -> Self {
        self.shifted(-1)
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Maximum => "maximum",
        };
        f.write_str(label)
    }
}

/// Periodization stage assigned to a training week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Aerobic base and technique
    Foundation,
    /// Progressive volume
    Build,
    /// Threshold and interval work
    Intensity,
    /// Race-specific sharpening
    Peak,
    /// Volume reduction before the target
    Taper,
    /// Post-target regeneration
    Recovery,
}

impl Phase {
    /// Fixed periodization sequence
    pub const SEQUENCE: [Self; 6] = [
        Self::Foundation,
        Self::Build,
        Self::Intensity,
        Self::Peak,
        Self::Taper,
        Self::Recovery,
    ];

    /// Position within [`Phase::SEQUENCE`]
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Foundation => 0,
            Self::Build => 1,
            Self::Intensity => 2,
            Self::Peak => 3,
            Self::Taper => 4,
            Self::Recovery => 5,
        }
    }

    /// Baseline intensity for ordinary sessions of this phase
    #[must_use]
    pub const fn base_intensity(&self) -> Intensity {
        match self {
            Self::Foundation | Self::Recovery => Intensity::Low,
            Self::Build | Self::Taper => Intensity::Moderate,
            Self::Intensity | Self::Peak => Intensity::High,
        }
    }

    /// Intensity of the phase's key session
    #[must_use]
    pub const fn key_intensity(&self) -> Intensity {
        match self {
            Self::Foundation | Self::Recovery => Intensity::Moderate,
            Self::Build | Self::Taper => Intensity::High,
            Self::Intensity | Self::Peak => Intensity::Maximum,
        }
    }

    /// Whether the phase designates a key workout each week
    #[must_use]
    pub const fn has_key_workout(&self) -> bool {
        !matches!(self, Self::Recovery)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Foundation => "foundation",
            Self::Build => "build",
            Self::Intensity => "intensity",
            Self::Peak => "peak",
            Self::Taper => "taper",
            Self::Recovery => "recovery",
        };
        f.write_str(label)
    }
}

/// Self-assessed fitness level for a discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    /// New to the discipline
    Beginner,
    /// Trains regularly
    Intermediate,
    /// Structured training for several seasons
    Advanced,
    /// Competitive athlete
    Elite,
}

impl FitnessLevel {
    /// Highest intensity sessions may reach at this level
    #[must_use]
    pub const fn intensity_cap(&self) -> Intensity {
        match self {
            Self::Beginner => Intensity::High,
            Self::Intermediate | Self::Advanced | Self::Elite => Intensity::Maximum,
        }
    }

    /// Session duration multiplier in percent
    #[must_use]
    pub const fn duration_percent(&self) -> u16 {
        match self {
            Self::Beginner => 75,
            Self::Intermediate => 100,
            Self::Advanced => 120,
            Self::Elite => 140,
        }
    }
}

/// Movement pattern loaded by an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    /// Repeated ground contact (running, jumping)
    Impact,
    /// Loaded knee bending
    KneeFlexion,
    /// Squatting
    Squat,
    /// Hip hinge (deadlift, kettlebell swing)
    HipHinge,
    /// Pressing overhead
    OverheadPress,
    /// Horizontal pressing
    HorizontalPush,
    /// Pulling (rows, swim catch)
    Pull,
    /// Trunk rotation
    Rotation,
    /// Axial loading of the spine
    SpinalLoading,
}

impl fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Impact => "impact",
            Self::KneeFlexion => "knee flexion",
            Self::Squat => "squat",
            Self::HipHinge => "hip hinge",
            Self::OverheadPress => "overhead press",
            Self::HorizontalPush => "horizontal push",
            Self::Pull => "pull",
            Self::Rotation => "rotation",
            Self::SpinalLoading => "spinal loading",
        };
        f.write_str(label)
    }
}

/// Body part named in an injury report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    /// Knee
    Knee,
    /// Ankle or foot
    Ankle,
    /// Hip or groin
    Hip,
    /// Lower back
    LowerBack,
    /// Shoulder
    Shoulder,
    /// Wrist or elbow
    Wrist,
    /// Neck
    Neck,
}

impl BodyPart {
    /// All body parts in declaration order
    pub const ALL: [Self; 7] = [
        Self::Knee,
        Self::Ankle,
        Self::Hip,
        Self::LowerBack,
        Self::Shoulder,
        Self::Wrist,
        Self::Neck,
    ];

    /// Movement patterns restricted when an injury names no explicit restrictions
    #[must_use]
    pub const fn default_restrictions(&self) -> &'static [MovementPattern] {
        match self {
            Self::Knee => &[
                MovementPattern::Impact,
                MovementPattern::KneeFlexion,
                MovementPattern::Squat,
            ],
            Self::Ankle => &[MovementPattern::Impact],
            Self::Hip => &[
                MovementPattern::Impact,
                MovementPattern::HipHinge,
                MovementPattern::Squat,
            ],
            Self::LowerBack => &[
                MovementPattern::HipHinge,
                MovementPattern::SpinalLoading,
                MovementPattern::Rotation,
            ],
            Self::Shoulder => &[
                MovementPattern::OverheadPress,
                MovementPattern::HorizontalPush,
                MovementPattern::Pull,
            ],
            Self::Wrist => &[MovementPattern::HorizontalPush, MovementPattern::Pull],
            Self::Neck => &[MovementPattern::SpinalLoading, MovementPattern::OverheadPress],
        }
    }

    /// Lowercase identifier used in prompts and slot extraction
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Knee => "knee",
            Self::Ankle => "ankle",
            Self::Hip => "hip",
            Self::LowerBack => "lower_back",
            Self::Shoulder => "shoulder",
            Self::Wrist => "wrist",
            Self::Neck => "neck",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a requested difficulty change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyDirection {
    /// Make upcoming sessions easier
    Easier,
    /// Make upcoming sessions harder
    Harder,
}

impl DifficultyDirection {
    /// Signed step for [`Intensity::shifted`]
    #[must_use]
    pub const fn step(&self) -> i32 {
        match self {
            Self::Easier => -1,
            Self::Harder => 1,
        }
    }
}

impl fmt::Display for DifficultyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easier => f.write_str("easier"),
            Self::Harder => f.write_str("harder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_shift_clamps_at_extremes() {
        assert_eq!(Intensity::Maximum.step_up(), Intensity::Maximum);
        assert_eq!(Intensity::Low.step_down(), Intensity::Low);
        assert_eq!(Intensity::Moderate.shifted(5), Intensity::Maximum);
        assert_eq!(Intensity::High.shifted(-2), Intensity::Low);
    }

    #[test]
    fn test_phase_sequence_indices_match_order() {
        for (index, phase) in Phase::SEQUENCE.iter().enumerate() {
            assert_eq!(phase.index(), index);
        }
    }

    #[test]
    fn test_every_body_part_restricts_something() {
        for part in BodyPart::ALL {
            assert!(!part.default_restrictions().is_empty(), "{part}");
        }
    }
}
