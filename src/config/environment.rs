// ABOUTME: Environment variable loading for the engine configuration sections
// ABOUTME: PIERRE_TRAINING_* keys with documented defaults; malformed values are rejected, not ignored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PIERRE_TRAINING_PHASE_WEIGHTS` | `0.25,0.25,0.20,0.10,0.10,0.10` |
//! | `PIERRE_TRAINING_PHASE_MIN_WEEKS` | `1,1,1,1,1,1` |
//! | `PIERRE_TRAINING_MAX_PLAN_WEEKS` | `52` |
//! | `PIERRE_TRAINING_MISSED_RECOVERY_WINDOW` | `3` |
//! | `PIERRE_TRAINING_MISSED_INTENSITY_STEPS` | `1` |
//! | `PIERRE_TRAINING_DIFFICULTY_WINDOW` | `5` |
//! | `PIERRE_TRAINING_INJURY_INTENSITY_CEILING` | `moderate` |
//! | `PIERRE_TRAINING_CONFLICT_RETRIES` | `1` |
//! | `PIERRE_TRAINING_MISS_THRESHOLD` | `2` |
//! | `PIERRE_TRAINING_MISS_WINDOW_DAYS` | `7` |
//! | `PIERRE_TRAINING_INTENT_ENABLED` | `true` |
//! | `PIERRE_TRAINING_INTENT_TIMEOUT_MS` | `10000` |
//! | `PIERRE_TRAINING_INTENT_MAX_RETRIES` | `2` |
//! | `PIERRE_TRAINING_INTENT_INITIAL_DELAY_MS` | `250` |
//! | `PIERRE_TRAINING_INTENT_MAX_DELAY_MS` | `2000` |
//! | `PIERRE_TRAINING_INTENT_MAX_HISTORY` | `10` |
//! | `PIERRE_TRAINING_FALLBACK_MESSAGE` | built-in message |
//! | `PIERRE_TRAINING_LLM_BASE_URL` | `http://localhost:11434/v1` |
//! | `PIERRE_TRAINING_LLM_MODEL` | `qwen2.5:14b-instruct` |
//! | `PIERRE_TRAINING_LLM_API_KEY` | unset |
//! | `PIERRE_TRAINING_LLM_TIMEOUT_SECS` | `30` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use pierre_training_core::models::Intensity;

use super::{
    AdaptationConfig, CompletionServiceConfig, ConfigError, EngineConfig, IntentConfig,
    PhaseConfig, ProgressConfig, RetryConfig,
};

const PREFIX: &str = "PIERRE_TRAINING_";

fn key(name: &str) -> String {
    format!("{PREFIX}{name}")
}

/// Raw value of a prefixed variable, treating empty strings as unset
fn env_var(name: &str) -> Option<String> {
    env::var(key(name))
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Get a prefixed variable or a default value
fn env_var_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_owned())
}

/// Parse a prefixed variable, falling back to `default` when unset
fn env_parse<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name).map_or(Ok(default), |raw| {
        raw.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key(name),
            message: format!("'{raw}': {e}"),
        })
    })
}

/// Parse a comma-separated list of exactly six values
fn env_list<T>(name: &str, default: [T; 6]) -> Result<[T; 6], ConfigError>
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    let Some(raw) = env_var(name) else {
        return Ok(default);
    };
    let parsed = raw
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| ConfigError::Parse {
            key: key(name),
            message: format!("'{raw}': {e}"),
        })?;
    <[T; 6]>::try_from(parsed).map_err(|values| ConfigError::Parse {
        key: key(name),
        message: format!("expected 6 comma-separated values, got {}", values.len()),
    })
}

/// Parse a boolean with the usual spellings
fn env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = env_var(name) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Parse {
            key: key(name),
            message: format!("'{raw}' is not a boolean"),
        }),
    }
}

fn parse_intensity(name: &str, default: Intensity) -> Result<Intensity, ConfigError> {
    let Some(raw) = env_var(name) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "low" => Ok(Intensity::Low),
        "moderate" => Ok(Intensity::Moderate),
        "high" => Ok(Intensity::High),
        "maximum" => Ok(Intensity::Maximum),
        _ => Err(ConfigError::Parse {
            key: key(name),
            message: format!("'{raw}' is not one of low, moderate, high, maximum"),
        }),
    }
}

/// Load phase proportions from the environment
///
/// # Errors
///
/// Returns `ConfigError::Parse` for malformed values.
pub fn phase_config_from_env() -> Result<PhaseConfig, ConfigError> {
    let defaults = PhaseConfig::default();
    Ok(PhaseConfig {
        weights: env_list("PHASE_WEIGHTS", defaults.weights)?,
        min_weeks: env_list("PHASE_MIN_WEEKS", defaults.min_weeks)?,
        max_total_weeks: env_parse("MAX_PLAN_WEEKS", defaults.max_total_weeks)?,
    })
}

impl AdaptationConfig {
    /// Load adaptation windows from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            missed_recovery_window: env_parse(
                "MISSED_RECOVERY_WINDOW",
                defaults.missed_recovery_window,
            )?,
            missed_intensity_steps: env_parse(
                "MISSED_INTENSITY_STEPS",
                defaults.missed_intensity_steps,
            )?,
            difficulty_window: env_parse("DIFFICULTY_WINDOW", defaults.difficulty_window)?,
            injury_intensity_ceiling: parse_intensity(
                "INJURY_INTENSITY_CEILING",
                defaults.injury_intensity_ceiling,
            )?,
            conflict_retries: env_parse("CONFLICT_RETRIES", defaults.conflict_retries)?,
        })
    }
}

/// Load the miss threshold from the environment
///
/// # Errors
///
/// Returns `ConfigError::Parse` for malformed values.
pub fn progress_config_from_env() -> Result<ProgressConfig, ConfigError> {
    let defaults = ProgressConfig::default();
    Ok(ProgressConfig {
        miss_threshold: env_parse("MISS_THRESHOLD", defaults.miss_threshold)?,
        miss_window_days: env_parse("MISS_WINDOW_DAYS", defaults.miss_window_days)?,
    })
}

impl IntentConfig {
    /// Load intent classifier settings from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let retry = RetryConfig {
            max_retries: env_parse("INTENT_MAX_RETRIES", defaults.retry.max_retries)?,
            initial_delay: Duration::from_millis(env_parse(
                "INTENT_INITIAL_DELAY_MS",
                duration_millis(defaults.retry.initial_delay),
            )?),
            max_delay: Duration::from_millis(env_parse(
                "INTENT_MAX_DELAY_MS",
                duration_millis(defaults.retry.max_delay),
            )?),
        };
        Ok(Self {
            enabled: env_bool("INTENT_ENABLED", defaults.enabled)?,
            timeout: Duration::from_millis(env_parse(
                "INTENT_TIMEOUT_MS",
                duration_millis(defaults.timeout),
            )?),
            retry,
            fallback_message: env_var_or("FALLBACK_MESSAGE", &defaults.fallback_message),
            max_history: env_parse("INTENT_MAX_HISTORY", defaults.max_history)?,
        })
    }
}

impl CompletionServiceConfig {
    /// Load completion endpoint settings from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: env_var_or("LLM_BASE_URL", &defaults.base_url),
            model: env_var_or("LLM_MODEL", &defaults.model),
            api_key: env_var("LLM_API_KEY"),
            request_timeout: Duration::from_secs(env_parse(
                "LLM_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        })
    }
}

impl EngineConfig {
    /// Load and validate every section from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed or out-of-range values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            phases: phase_config_from_env()?,
            adaptation: AdaptationConfig::from_env()?,
            progress: progress_config_from_env()?,
            intent: IntentConfig::from_env()?,
            completion: CompletionServiceConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
