// ABOUTME: Engine configuration passed explicitly at construction time
// ABOUTME: Adaptation windows, intent classifier retry/timeout, and completion service settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration for the training engine
//!
//! There is no global configuration state. [`EngineConfig`] is built once
//! (usually with [`EngineConfig::from_env`]) and handed to the components that
//! need it.
//!
//! - **phases**: proportional phase split and minimum lengths
//! - **adaptation**: rolling windows and ceilings used by the adaptation policies
//! - **progress**: miss threshold for the missed-workouts signal
//! - **intent**: timeout, retry, and fallback behaviour of the intent classifier
//! - **completion**: `OpenAI`-compatible endpoint settings

/// Environment variable loading
pub mod environment;

use std::time::Duration;

use pierre_training_core::models::Intensity;

pub use pierre_periodization::{ConfigError, PhaseConfig, ProgressConfig};

/// Adaptation policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptationConfig {
    /// Upcoming workouts that get reduced intensity after a miss
    pub missed_recovery_window: usize,
    /// Intensity steps removed from the first workout after a miss
    pub missed_intensity_steps: u8,
    /// Upcoming workouts shifted by a difficulty request
    pub difficulty_window: usize,
    /// Ceiling applied to disciplines affected by an injury
    pub injury_intensity_ceiling: Intensity,
    /// Internal retries after an optimistic concurrency conflict
    pub conflict_retries: u32,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            missed_recovery_window: 3,
            missed_intensity_steps: 1,
            difficulty_window: 5,
            injury_intensity_ceiling: Intensity::Moderate,
            conflict_retries: 1,
        }
    }
}

impl AdaptationConfig {
    /// Validate window sizes and step counts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` for empty windows, a step count
    /// outside 1..=3, or more than 5 conflict retries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.missed_recovery_window == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "missed recovery window must cover at least one workout",
            ));
        }
        if !(1..=3).contains(&self.missed_intensity_steps) {
            return Err(ConfigError::ValueOutOfRange(
                "missed intensity steps must be between 1 and 3",
            ));
        }
        if self.difficulty_window == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "difficulty window must cover at least one workout",
            ));
        }
        if self.conflict_retries > 5 {
            return Err(ConfigError::ValueOutOfRange(
                "conflict retries must not exceed 5",
            ));
        }
        Ok(())
    }
}

/// Exponential backoff without jitter
///
/// `delay(attempt) = min(initial_delay * 2^attempt, max_delay)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = no retries)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap for the exponential backoff
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Intent classifier behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentConfig {
    /// Whether the completion service is called at all
    pub enabled: bool,
    /// Per-attempt timeout for the completion call
    pub timeout: Duration,
    /// Backoff for transient failures
    pub retry: RetryConfig,
    /// Reply returned with `Intent::Unknown` when the service fails
    pub fallback_message: String,
    /// Most recent history messages forwarded to the service
    pub max_history: usize,
}

/// Default reply when the completion service is unavailable
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I couldn't process that right now. Your plan is unchanged - please try again in a moment.";

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            max_history: 10,
        }
    }
}

impl IntentConfig {
    /// Validate timeout and backoff bounds
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a zero timeout, a backoff cap below the initial
    /// delay, or an empty fallback message.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ValueOutOfRange(
                "intent timeout must be greater than zero",
            ));
        }
        if self.retry.max_delay < self.retry.initial_delay {
            return Err(ConfigError::ValueOutOfRange(
                "retry max delay must not be below the initial delay",
            ));
        }
        if self.fallback_message.trim().is_empty() {
            return Err(ConfigError::MissingField("fallback_message"));
        }
        Ok(())
    }
}

/// `OpenAI`-compatible completion endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionServiceConfig {
    /// Base URL including the API version path (e.g. `http://localhost:11434/v1`)
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Bearer token; optional for local servers
    pub api_key: Option<String>,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
}

impl Default for CompletionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_owned(),
            model: "qwen2.5:14b-instruct".to_owned(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
            temperature: 0.0,
            max_tokens: 256,
        }
    }
}

impl CompletionServiceConfig {
    /// Validate endpoint settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty URL or model, or a temperature outside 0.0..=2.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField("model"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValueOutOfRange(
                "temperature must be between 0.0 and 2.0",
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    /// Phase split
    pub phases: PhaseConfig,
    /// Adaptation policies
    pub adaptation: AdaptationConfig,
    /// Miss threshold
    pub progress: ProgressConfig,
    /// Intent classifier
    pub intent: IntentConfig,
    /// Completion endpoint
    pub completion: CompletionServiceConfig,
}

impl EngineConfig {
    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.phases.validate()?;
        self.adaptation.validate()?;
        self.progress.validate()?;
        self.intent.validate()?;
        if self.intent.enabled {
            self.completion.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(0), Duration::from_millis(250));
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_secs(1));
        assert_eq!(retry.delay_for_attempt(5), Duration::from_secs(2));
        assert_eq!(retry.delay_for_attempt(40), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_windows_rejected() {
        let config = AdaptationConfig {
            difficulty_window: 0,
            ..AdaptationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_intent_skips_endpoint_validation() {
        let mut config = EngineConfig::default();
        config.completion.base_url = String::new();
        assert!(config.validate().is_err());
        config.intent.enabled = false;
        assert!(config.validate().is_ok());
    }
}
