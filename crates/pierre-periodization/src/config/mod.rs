// ABOUTME: Periodization configuration: phase proportions, minimum lengths, and miss thresholds
// ABOUTME: Explicit values passed at construction, validated before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod error;

pub use error::ConfigError;

use pierre_training_core::constants::scheduling::DEFAULT_MAX_PLAN_WEEKS;
use pierre_training_core::models::Phase;
use serde::{Deserialize, Serialize};

/// Proportional split of a plan across the phase sequence
///
/// Each phase first receives `min_weeks`; the remaining weeks are split by
/// `weights` with largest-remainder rounding, ties going to the earlier phase.
/// Arrays are indexed by `Phase::index()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Relative share of spare weeks per phase
    pub weights: [f64; 6],
    /// Minimum viable length per phase in weeks
    pub min_weeks: [u32; 6],
    /// Longest plan accepted
    pub max_total_weeks: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            weights: [0.25, 0.25, 0.20, 0.10, 0.10, 0.10],
            min_weeks: [1; 6],
            max_total_weeks: DEFAULT_MAX_PLAN_WEEKS,
        }
    }
}

impl PhaseConfig {
    /// Weight of a phase
    #[must_use]
    pub const fn weight(&self, phase: Phase) -> f64 {
        self.weights[phase.index()]
    }

    /// Minimum viable length of a phase
    #[must_use]
    pub const fn min_weeks(&self, phase: Phase) -> u32 {
        self.min_weeks[phase.index()]
    }

    /// Shortest plan that fits every phase minimum
    #[must_use]
    pub fn minimum_total(&self) -> u32 {
        self.min_weeks.iter().sum()
    }

    /// Validate weights and bounds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a weight is negative or non-finite, all weights
    /// are zero, a minimum is zero, or the minimums exceed `max_total_weeks`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .weights
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(ConfigError::InvalidWeights(
                "phase weights must be finite and non-negative",
            ));
        }
        if self.weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "at least one phase weight must be positive",
            ));
        }
        if self.min_weeks.contains(&0) {
            return Err(ConfigError::ValueOutOfRange(
                "phase minimum length must be at least 1 week",
            ));
        }
        if self.minimum_total() > self.max_total_weeks {
            return Err(ConfigError::ValueOutOfRange(
                "sum of phase minimums exceeds the maximum plan length",
            ));
        }
        Ok(())
    }
}

/// Miss-threshold parameters for the progress tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Misses inside the window that raise a signal
    pub miss_threshold: u32,
    /// Trailing window length in days
    pub miss_window_days: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            miss_threshold: 2,
            miss_window_days: 7,
        }
    }
}

impl ProgressConfig {
    /// Validate thresholds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` for a zero threshold or a window
    /// outside 1..=31 days.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.miss_threshold == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "miss threshold must be at least 1",
            ));
        }
        if !(1..=31).contains(&self.miss_window_days) {
            return Err(ConfigError::ValueOutOfRange(
                "miss window must be between 1 and 31 days",
            ));
        }
        Ok(())
    }
}
