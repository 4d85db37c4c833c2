// ABOUTME: Domain error taxonomy for plan generation and adaptation
// ABOUTME: Validation, conflict, not-found, infeasible, and external-service failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;
use uuid::Uuid;

use super::{ErrorCode, StorageError};
use crate::models::WorkoutStatus;

/// Result alias for training engine operations
pub type TrainingResult<T> = Result<T, TrainingError>;

/// Errors surfaced by the plan generator and the adaptation engine.
///
/// Every mutating operation that returns one of these has left the plan exactly
/// as it was before the call.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Malformed input; no mutation was attempted
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A workout status change the state machine forbids
    #[error("workout {workout_id} cannot move from {from} to {to}")]
    IllegalTransition {
        /// Workout whose status change was rejected
        workout_id: Uuid,
        /// Current status
        from: WorkoutStatus,
        /// Requested status
        to: WorkoutStatus,
    },

    /// Another adaptation modified the plan concurrently and the internal retry also conflicted
    #[error("concurrent adaptation conflict on plan {plan_id}")]
    Conflict {
        /// Plan under contention
        plan_id: Uuid,
    },

    /// Plan, workout, or profile absent
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource ("plan", "workout", "profile", ...)
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The requested change cannot be satisfied; the plan is untouched
    #[error("infeasible adaptation: {reason}")]
    InfeasibleAdaptation {
        /// Why the change is infeasible
        reason: String,
    },

    /// External dependency failure
    #[error("external service {service} failed: {message}")]
    ExternalService {
        /// Service name
        service: String,
        /// Failure detail
        message: String,
    },

    /// A structural plan invariant would be broken by the mutation
    #[error("plan invariant violated: {0}")]
    Invariant(String),

    /// Storage backend failure; the transaction was rolled back
    #[error("storage failure: {0}")]
    Storage(String),
}

impl TrainingError {
    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create an infeasible-adaptation error
    #[must_use]
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self::InfeasibleAdaptation {
            reason: reason.into(),
        }
    }

    /// Stable error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::IllegalTransition { .. } => ErrorCode::IllegalStateTransition,
            Self::Conflict { .. } => ErrorCode::ResourceConflict,
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::InfeasibleAdaptation { .. } => ErrorCode::InfeasibleRequest,
            Self::ExternalService { .. } => ErrorCode::ExternalServiceError,
            Self::Invariant(_) => ErrorCode::InternalError,
            Self::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<StorageError> for TrainingError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::ConcurrentConflict { plan_id, .. } => Self::Conflict { plan_id },
            StorageError::PlanNotFound { plan_id } => Self::not_found("plan", plan_id),
            StorageError::ProfileNotFound { user_id } => Self::not_found("profile", user_id),
            StorageError::ActivePlanExists { user_id } => {
                Self::validation(format!("user {user_id} already has an active plan"))
            }
            StorageError::DuplicatePlan { plan_id } => {
                Self::Invariant(format!("plan id {plan_id} is already in use"))
            }
            StorageError::Backend(message) => Self::Storage(message),
        }
    }
}
