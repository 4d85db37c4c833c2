// ABOUTME: Per-plan mutual exclusion for adaptations inside one process
// ABOUTME: DashMap of tokio mutexes keyed by plan id; idle entries are pruned after use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-plan locks
#[derive(Debug, Default)]
pub struct PlanLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl PlanLocks {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a plan
    pub async fn acquire(&self, plan_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(plan_id).or_default().value());
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on
    pub fn prune_idle(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of registered locks
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
