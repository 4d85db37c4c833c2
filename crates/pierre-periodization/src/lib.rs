// ABOUTME: Periodization algorithms for plan generation and progress statistics
// ABOUTME: Pure functions over the core domain model, deterministic for a given seed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Periodization
//!
//! CPU-only algorithms with no I/O and no shared mutable state, so plans for
//! different users can be generated fully in parallel.
//!
//! ## Modules
//!
//! - **config**: phase proportions and miss-threshold parameters
//! - **phases**: phase-length allocation and tail rescaling
//! - **scheduling**: day selection and weighted discipline rotation
//! - **generator**: `PlanGenerator` and the reusable `WeekPlanner`
//! - **progress**: `ProgressTracker` completion statistics and streaks

/// Algorithm configuration with validated defaults
pub mod config;

/// Phase-length allocation
pub mod phases;

/// Day selection and discipline rotation
pub mod scheduling;

/// Plan and week generation
pub mod generator;

/// Completion statistics over workout history
pub mod progress;

pub use config::{ConfigError, PhaseConfig, ProgressConfig};
pub use generator::{PlanGenerator, PlanRequest, SessionConstraints, WeekPlanner};
pub use progress::{MissedWorkoutSignal, ProgressReport, ProgressTracker};
