// ABOUTME: Error facade for the training engine crate
// ABOUTME: Re-exports the domain taxonomy and maps configuration failures onto AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Error types used across the engine
//!
//! - [`TrainingError`]: generation and adaptation failures (validation, conflict,
//!   not found, infeasible, external service, storage)
//! - [`StorageError`]: storage port failures, converted into `TrainingError`
//! - [`CompletionError`]: natural-language service failures, absorbed by the
//!   intent classifier
//! - [`ConfigError`]: invalid configuration values

pub use crate::llm::CompletionError;
pub use pierre_periodization::ConfigError;
pub use pierre_training_core::errors::{
    AppError, ErrorCode, StorageError, TrainingError, TrainingResult,
};

/// Transport-facing error for a rejected configuration
#[must_use]
pub fn config_app_error(error: &ConfigError) -> AppError {
    AppError::new(ErrorCode::ConfigInvalid, error.to_string())
}
