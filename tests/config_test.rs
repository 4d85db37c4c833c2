// ABOUTME: Tests for loading the engine configuration from PIERRE_TRAINING_* variables
// ABOUTME: Overrides, defaults, malformed values, and cross-field validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use serial_test::serial;

use pierre_training::config::{ConfigError, EngineConfig};
use pierre_training::core::models::Intensity;

/// Sets variables for the duration of a test and removes them on drop
struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self {
            keys: vars.iter().map(|(key, _)| *key).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    let config = EngineConfig::from_env().unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
#[serial]
fn test_environment_overrides() {
    let _env = EnvGuard::set(&[
        ("PIERRE_TRAINING_PHASE_WEIGHTS", "0.3, 0.3, 0.2, 0.1, 0.05, 0.05"),
        ("PIERRE_TRAINING_MAX_PLAN_WEEKS", "24"),
        ("PIERRE_TRAINING_DIFFICULTY_WINDOW", "3"),
        ("PIERRE_TRAINING_INJURY_INTENSITY_CEILING", "Low"),
        ("PIERRE_TRAINING_MISS_THRESHOLD", "3"),
        ("PIERRE_TRAINING_INTENT_ENABLED", "off"),
        ("PIERRE_TRAINING_INTENT_TIMEOUT_MS", "1500"),
        ("PIERRE_TRAINING_LLM_API_KEY", "sk-test"),
        ("PIERRE_TRAINING_LLM_MODEL", "  "),
    ]);

    let config = EngineConfig::from_env().unwrap();

    assert_eq!(config.phases.weights, [0.3, 0.3, 0.2, 0.1, 0.05, 0.05]);
    assert_eq!(config.phases.max_total_weeks, 24);
    assert_eq!(config.adaptation.difficulty_window, 3);
    assert_eq!(config.adaptation.injury_intensity_ceiling, Intensity::Low);
    assert_eq!(config.progress.miss_threshold, 3);
    assert!(!config.intent.enabled);
    assert_eq!(config.intent.timeout, Duration::from_millis(1500));
    assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.completion.model, "qwen2.5:14b-instruct");
}

#[test]
#[serial]
fn test_phase_list_needs_six_values() {
    let _env = EnvGuard::set(&[("PIERRE_TRAINING_PHASE_MIN_WEEKS", "1,1,1,1,1")]);

    let error = EngineConfig::from_env().unwrap_err();

    match error {
        ConfigError::Parse { key, message } => {
            assert_eq!(key, "PIERRE_TRAINING_PHASE_MIN_WEEKS");
            assert!(message.contains("got 5"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
#[serial]
fn test_malformed_values_are_rejected() {
    for (key, value) in [
        ("PIERRE_TRAINING_CONFLICT_RETRIES", "many"),
        ("PIERRE_TRAINING_INTENT_ENABLED", "maybe"),
        ("PIERRE_TRAINING_INJURY_INTENSITY_CEILING", "gentle"),
        ("PIERRE_TRAINING_PHASE_WEIGHTS", "a,b,c,d,e,f"),
    ] {
        let _env = EnvGuard::set(&[(key, value)]);
        let error = EngineConfig::from_env().unwrap_err();
        assert!(
            matches!(&error, ConfigError::Parse { key: failed, .. } if failed == key),
            "{key}={value} gave {error}"
        );
    }
}

#[test]
#[serial]
fn test_out_of_range_values_fail_validation() {
    let _env = EnvGuard::set(&[("PIERRE_TRAINING_MISSED_INTENSITY_STEPS", "4")]);
    assert!(matches!(
        EngineConfig::from_env(),
        Err(ConfigError::ValueOutOfRange(_))
    ));
}

#[test]
#[serial]
fn test_zero_weights_are_invalid() {
    let _env = EnvGuard::set(&[("PIERRE_TRAINING_PHASE_WEIGHTS", "0,0,0,0,0,0")]);
    assert!(matches!(
        EngineConfig::from_env(),
        Err(ConfigError::InvalidWeights(_))
    ));
}

#[test]
#[serial]
fn test_completion_timeout_override() {
    let _env = EnvGuard::set(&[
        ("PIERRE_TRAINING_INTENT_ENABLED", "false"),
        ("PIERRE_TRAINING_LLM_TIMEOUT_SECS", "5"),
    ]);
    let config = EngineConfig::from_env().unwrap();
    assert_eq!(config.completion.request_timeout, Duration::from_secs(5));
}
