// ABOUTME: Main library entry point for the Pierre adaptive training engine
// ABOUTME: Plan adaptation, intent classification, storage ports, and the TrainingService facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Training
//!
//! Periodized training plans that keep up with the athlete. A plan is
//! generated once from a profile and then adapted as life happens: missed
//! sessions, injuries, new training days, a moved race date, or a request
//! to make things easier or harder.
//!
//! ## Components
//!
//! - **Plan generation** (`pierre-periodization`): phase allocation, day
//!   selection, discipline rotation, seeded for reproducible plans
//! - **Adaptation engine**: one policy per trigger, serialized per plan and
//!   committed atomically with an audit record
//! - **Intent classifier**: maps chat messages to a closed intent set through
//!   an `OpenAI`-compatible completion service, with timeout, retries, and a
//!   deterministic fallback
//! - **Progress tracking**: completion percentages, streaks, and the
//!   missed-workout threshold signal
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pierre_training::clock::SystemClock;
//! use pierre_training::config::EngineConfig;
//! use pierre_training::llm::DisabledService;
//! use pierre_training::service::TrainingService;
//! use pierre_training::storage::memory::InMemoryStore;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EngineConfig::from_env()?;
//! let service = TrainingService::new(
//!     &config,
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(DisabledService),
//!     Arc::new(SystemClock),
//! );
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

/// Trigger dispatch, adaptation policies, and per-plan locking
pub mod adaptation;

/// Injectable clock
pub mod clock;

/// Engine configuration and environment loading
pub mod config;

/// Error types re-exported from the domain crates
pub mod errors;

/// Intent taxonomy, slot extraction, and the classifier
pub mod intent;

/// Natural-language completion service contract and clients
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Public facade over every engine operation
pub mod service;

/// Storage ports and backends
pub mod storage;

pub use pierre_periodization as periodization;
pub use pierre_training_core as core;

pub use adaptation::{
    AdaptationEngine, AdaptationTrigger, DifficultySource, InjuryReport, WorkoutEvent,
};
pub use intent::{Classification, Intent, IntentClassifier, IntentSlots};
pub use service::{MessageOutcome, TrainingService};
