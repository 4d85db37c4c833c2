// ABOUTME: Storage port error types shared by every persistence adapter
// ABOUTME: Covers optimistic concurrency conflicts, missing aggregates, and backend failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;
use uuid::Uuid;

/// All errors that can be returned by a storage port implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Optimistic concurrency conflict: the plan was modified after it was read.
    #[error("concurrent conflict on plan {plan_id}: expected version {expected_version}")]
    ConcurrentConflict {
        /// Plan whose version did not match
        plan_id: Uuid,
        /// Version the writer read before mutating
        expected_version: u64,
    },

    /// No plan with the given id.
    #[error("plan not found: {plan_id}")]
    PlanNotFound {
        /// Requested plan id
        plan_id: Uuid,
    },

    /// No profile for the given user.
    #[error("profile not found for user {user_id}")]
    ProfileNotFound {
        /// Requested user id
        user_id: Uuid,
    },

    /// The user already owns an Active plan.
    #[error("user {user_id} already has an active plan")]
    ActivePlanExists {
        /// Owner of the existing active plan
        user_id: Uuid,
    },

    /// A plan with the same id is already stored.
    #[error("plan {plan_id} already exists")]
    DuplicatePlan {
        /// Colliding plan id
        plan_id: Uuid,
    },

    /// A backend-specific failure (connection, serialization, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}
