// ABOUTME: Unified error handling for the training engine with stable error codes
// ABOUTME: Defines ErrorCode, the transport-facing AppError, and re-exports domain error enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Domain operations return [`TrainingError`], a closed taxonomy that callers can
//! match on. Transport layers that only need a code and a message convert it into
//! [`AppError`], which carries a stable [`ErrorCode`] with an HTTP-style status.

mod storage;
mod training;

pub use storage::StorageError;
pub use training::{TrainingError, TrainingResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard error codes used throughout the training engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed input such as an invalid availability schedule
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A workout status change the state machine forbids
    #[serde(rename = "ILLEGAL_STATE_TRANSITION")]
    IllegalStateTransition = 3001,

    // Resource Management (4000-4999)
    /// Plan, workout, or profile absent
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Concurrent adaptation on the same plan
    #[serde(rename = "RESOURCE_CONFLICT")]
    ResourceConflict = 4001,
    /// Requested adaptation cannot be satisfied (e.g. phases below minimum length)
    #[serde(rename = "INFEASIBLE_REQUEST")]
    InfeasibleRequest = 4002,

    // External Services (5000-5999)
    /// Natural-language completion service failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,

    // Configuration (6000-6999)
    /// Configuration value out of range
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6000,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure (broken invariant)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage backend failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9001,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::IllegalStateTransition => 400,
            Self::ResourceNotFound => 404,
            Self::ResourceConflict => 409,
            Self::InfeasibleRequest => 422,
            Self::ExternalServiceError => 502,
            Self::ConfigInvalid | Self::InternalError | Self::StorageError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::IllegalStateTransition => "The requested workout status change is not allowed",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceConflict => "Another adaptation is modifying this plan",
            Self::InfeasibleRequest => "The requested plan change cannot be satisfied",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
        }
    }
}

/// Transport-facing error: a stable code, a message, and optional structured details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional structured context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<TrainingError> for AppError {
    fn from(error: TrainingError) -> Self {
        let code = error.code();
        let details = match &error {
            TrainingError::IllegalTransition {
                workout_id,
                from,
                to,
            } => Some(serde_json::json!({
                "workout_id": workout_id,
                "from": from,
                "to": to,
            })),
            TrainingError::Conflict { plan_id } => Some(serde_json::json!({ "plan_id": plan_id })),
            TrainingError::NotFound { resource, id } => {
                Some(serde_json::json!({ "resource": resource, "id": id }))
            }
            _ => None,
        };
        Self {
            code,
            message: error.to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ResourceConflict.http_status(), 409);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_conflict_converts_with_plan_details() {
        let plan_id = Uuid::new_v4();
        let app: AppError = TrainingError::Conflict { plan_id }.into();
        assert_eq!(app.code, ErrorCode::ResourceConflict);
        let details = app.details.unwrap_or_default();
        assert_eq!(details["plan_id"], serde_json::json!(plan_id));
    }

    #[test]
    fn test_error_serialization_uses_stable_code() {
        let app = AppError::new(ErrorCode::InfeasibleRequest, "taper too short");
        let json = serde_json::to_string(&app).unwrap();
        assert!(json.contains("INFEASIBLE_REQUEST"));
        assert!(!json.contains("details"));
    }
}
