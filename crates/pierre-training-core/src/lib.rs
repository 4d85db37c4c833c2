// ABOUTME: Core domain types for the Pierre adaptive training engine
// ABOUTME: Foundation crate with the plan aggregate, user profile, taxonomies, and error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Training Core
//!
//! Foundation crate shared by the periodization algorithms and the adaptation
//! engine. It changes rarely, which keeps incremental builds of the engine cheap.
//!
//! ## Modules
//!
//! - **errors**: `TrainingError` taxonomy, `StorageError`, and the transport-facing `AppError`
//! - **models**: `UserProfile`, `TrainingPlan`, `TrainingWeek`, `Workout`, `PlanAdaptation`
//! - **constants**: exercise catalog and scheduling constants

/// Error taxonomy with stable error codes
pub mod errors;

/// Domain model for profiles, plans, workouts, and adaptation records
pub mod models;

/// Exercise catalog and scheduling constants
pub mod constants;
