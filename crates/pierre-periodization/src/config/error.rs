// ABOUTME: Configuration error types for periodization and engine validation
// ABOUTME: Defines error variants for invalid ranges, weights, and unparsable values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value outside its acceptable range
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),

    /// Phase weights are negative, non-finite, or all zero
    #[error("Invalid weights: {0}")]
    InvalidWeights(&'static str),

    /// Required configuration field is missing
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Failed to parse an environment value
    #[error("Parse error for {key}: {message}")]
    Parse {
        /// Environment variable name
        key: String,
        /// Parser message
        message: String,
    },
}
