// ABOUTME: IntentClassifier with timeout, exponential-backoff retries, and deterministic fallback
// ABOUTME: Never returns an error; completion failures degrade to Intent::Unknown with a fixed reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::slots::{extract_slots, parse_model_output};
use super::{Classification, Intent};
use crate::clock::Clock;
use crate::config::IntentConfig;
use crate::llm::prompts::get_intent_system_prompt;
use crate::llm::{ChatMessage, Completion, CompletionError, NaturalLanguageService};

/// Classifies free-text messages through a completion service
pub struct IntentClassifier {
    service: Arc<dyn NaturalLanguageService>,
    clock: Arc<dyn Clock>,
    config: IntentConfig,
}

impl IntentClassifier {
    /// Create a classifier; retry sleeps go through `clock`
    #[must_use]
    pub fn new(
        service: Arc<dyn NaturalLanguageService>,
        clock: Arc<dyn Clock>,
        config: IntentConfig,
    ) -> Self {
        Self {
            service,
            clock,
            config,
        }
    }

    /// Classifier settings in use
    #[must_use]
    pub const fn config(&self) -> &IntentConfig {
        &self.config
    }

    /// Classify a message given the conversation so far
    ///
    /// Only the most recent `max_history` messages are forwarded. Slots the
    /// model leaves empty are filled by keyword extraction; the intent is
    /// always the model's.
    #[instrument(skip_all, fields(service = self.service.name(), message_len = message.len()))]
    pub async fn classify(&self, message: &str, history: &[ChatMessage]) -> Classification {
        if !self.config.enabled {
            debug!("intent classification disabled, using fallback");
            return Classification::fallback(&self.config.fallback_message);
        }
        let recent = &history[history.len().saturating_sub(self.config.max_history)..];

        let outcome = self
            .complete_with_retry(message, recent)
            .await
            .and_then(|completion| Self::interpret(message, completion));
        match outcome {
            Ok(classification) => {
                debug!(intent = %classification.intent, "message classified");
                classification
            }
            Err(e) => {
                warn!(error = %e, "completion service failed, returning fallback");
                Classification::fallback(&self.config.fallback_message)
            }
        }
    }

    /// Call the service with a per-attempt timeout, retrying transient failures
    async fn complete_with_retry(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        let retry = self.config.retry;
        let mut attempt = 0;
        loop {
            let call = self
                .service
                .complete(get_intent_system_prompt(), message, history);
            let result = timeout(self.config.timeout, call)
                .await
                .unwrap_or(Err(CompletionError::Timeout));

            match result {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_transient() && attempt < retry.max_retries => {
                    let delay = retry.delay_for_attempt(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = retry.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "transient completion failure, retrying"
                    );
                    self.clock.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn interpret(message: &str, completion: Completion) -> Result<Classification, CompletionError> {
        let output = parse_model_output(&completion.text).ok_or_else(|| {
            CompletionError::InvalidResponse("completion did not contain an intent object".into())
        })?;
        let mut slots = output.slots;
        if output.intent != Intent::Unknown {
            slots.fill_from(extract_slots(message));
        }
        Ok(Classification {
            intent: output.intent,
            slots,
            reply: output.reply,
            degraded: false,
            prompt_tokens: completion.prompt_tokens,
            completion_tokens: completion.completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pierre_training_core::models::BodyPart;

    use super::*;
    use crate::clock::ManualClock;
    use crate::llm::DisabledService;

    /// Fails `failures` times with `error`, then answers with `text`
    struct FlakyService {
        failures: u32,
        error: CompletionError,
        text: String,
        calls: AtomicU32,
    }

    #[async_trait]
    impl NaturalLanguageService for FlakyService {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn complete(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _history: &[ChatMessage],
        ) -> Result<Completion, CompletionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(self.error.clone());
            }
            Ok(Completion {
                text: self.text.clone(),
                prompt_tokens: 12,
                completion_tokens: 5,
            })
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 9, 7, 0, 0).unwrap(),
        ))
    }

    fn flaky(failures: u32, error: CompletionError) -> Arc<FlakyService> {
        Arc::new(FlakyService {
            failures,
            error,
            text: r#"{"intent":"injury_report","slots":{},"reply":"Take care."}"#.into(),
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried_with_backoff() {
        let service = flaky(2, CompletionError::Unavailable("503".into()));
        let clock = clock();
        let classifier =
            IntentClassifier::new(service.clone(), clock.clone(), IntentConfig::default());

        let result = classifier.classify("my knee hurts", &[]).await;
        assert_eq!(result.intent, Intent::InjuryReport);
        assert_eq!(result.slots.body_part, Some(BodyPart::Knee));
        assert!(!result.degraded);
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(250), Duration::from_millis(500)]
        );
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back() {
        let service = flaky(10, CompletionError::Timeout);
        let classifier = IntentClassifier::new(service.clone(), clock(), IntentConfig::default());
        let result = classifier.classify("my knee hurts", &[]).await;
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.degraded);
        assert_eq!(result.reply, IntentConfig::default().fallback_message);
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rejections_are_not_retried() {
        let service = flaky(1, CompletionError::Rejected("401".into()));
        let clock = clock();
        let classifier =
            IntentClassifier::new(service.clone(), clock.clone(), IntentConfig::default());
        let result = classifier.classify("hello", &[]).await;
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_service_falls_back() {
        let classifier =
            IntentClassifier::new(Arc::new(DisabledService), clock(), IntentConfig::default());
        let result = classifier.classify("make it harder", &[]).await;
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.degraded);
    }
}
