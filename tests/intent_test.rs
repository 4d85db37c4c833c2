// ABOUTME: Integration tests for the intent classifier against scripted completion services
// ABOUTME: Slot merging, history truncation, timeout fallback on paused time, and retry backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Weekday;

use pierre_training::clock::ManualClock;
use pierre_training::config::{IntentConfig, DEFAULT_FALLBACK_MESSAGE};
use pierre_training::core::models::{BodyPart, DifficultyDirection};
use pierre_training::intent::{Intent, IntentClassifier};
use pierre_training::llm::{
    ChatMessage, Completion, CompletionError, DisabledService, NaturalLanguageService,
};

fn classifier(service: Arc<dyn NaturalLanguageService>) -> (IntentClassifier, Arc<ManualClock>) {
    common::init_test_logging();
    let clock = Arc::new(ManualClock::new(common::now()));
    (
        IntentClassifier::new(service, clock.clone(), IntentConfig::default()),
        clock,
    )
}

/// Records the history length of every call
#[derive(Default)]
struct RecordingService {
    history_lengths: Mutex<Vec<usize>>,
}

#[async_trait]
impl NaturalLanguageService for RecordingService {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        self.history_lengths.lock().unwrap().push(history.len());
        Ok(common::json_completion(
            r#"{"intent": "general_question", "slots": {}, "reply": "Sure."}"#,
        ))
    }
}

#[tokio::test]
async fn test_model_intent_with_keyword_slots_filled_in() {
    let service = Arc::new(common::ScriptedService::always(
        r#"```json
{"intent": "injury_report", "slots": {"body_part": null}, "reply": "Sorry to hear that. Let's protect it."}
```"#,
    ));
    let (classifier, _clock) = classifier(service);

    let result = classifier
        .classify("My left knee aches on the stairs since Tuesday", &[])
        .await;

    assert_eq!(result.intent, Intent::InjuryReport);
    assert_eq!(result.slots.body_part, Some(BodyPart::Knee));
    assert_eq!(result.slots.days, vec![Weekday::Tue]);
    assert!(!result.degraded);
    assert_eq!(result.prompt_tokens, 120);
    assert!(result.reply.starts_with("Sorry to hear"));
}

#[tokio::test]
async fn test_model_slots_take_precedence_over_keywords() {
    let service = Arc::new(common::ScriptedService::always(
        r#"{"intent": "plan_modification", "slots": {"direction": "harder"}, "reply": "Turning it up."}"#,
    ));
    let (classifier, _clock) = classifier(service);

    let result = classifier
        .classify("honestly this is too hard, or maybe too easy?", &[])
        .await;

    assert_eq!(result.intent, Intent::PlanModification);
    assert_eq!(result.slots.direction, Some(DifficultyDirection::Harder));
}

#[tokio::test]
async fn test_unknown_label_keeps_slots_empty() {
    let service = Arc::new(common::ScriptedService::always(
        r#"{"intent": "weather_chat", "reply": "Nice day."}"#,
    ));
    let (classifier, _clock) = classifier(service);

    let result = classifier.classify("my knee hurts", &[]).await;
    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.slots.is_empty());
    assert!(!result.degraded);
}

#[tokio::test]
async fn test_history_is_truncated_to_most_recent_messages() {
    let service = Arc::new(RecordingService::default());
    let (classifier, _clock) = classifier(service.clone());
    let history: Vec<ChatMessage> = (0..25)
        .map(|i| ChatMessage::user(format!("message {i}")))
        .collect();

    classifier.classify("what is a tempo run?", &history).await;
    classifier.classify("and intervals?", &history[..3]).await;

    assert_eq!(*service.history_lengths.lock().unwrap(), vec![10, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back_to_unknown() {
    let service = Arc::new(common::SlowService {
        delay: Duration::from_secs(60),
    });
    let (classifier, clock) = classifier(service);

    let result = classifier.classify("why is Friday so long?", &[]).await;

    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.degraded);
    assert_eq!(result.reply, DEFAULT_FALLBACK_MESSAGE);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(250), Duration::from_millis(500)]
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried_before_success() {
    let service = Arc::new(common::ScriptedService::new(vec![
        Err(CompletionError::RateLimited("slow down".to_owned())),
        Err(CompletionError::Transport("connection reset".to_owned())),
        Ok(common::json_completion(
            r#"{"intent": "motivation", "reply": "You've got this."}"#,
        )),
    ]));
    let (classifier, clock) = classifier(service.clone());

    let result = classifier.classify("I don't feel like training", &[]).await;

    assert_eq!(result.intent, Intent::Motivation);
    assert_eq!(service.calls(), 3);
    assert_eq!(clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_malformed_completion_falls_back() {
    let service = Arc::new(common::ScriptedService::always("I think it's an injury report"));
    let (classifier, clock) = classifier(service.clone());

    let result = classifier.classify("ouch, my shoulder", &[]).await;

    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.degraded);
    assert_eq!(service.calls(), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_disabled_configuration_never_calls_the_service() {
    let service = Arc::new(common::ScriptedService::always(
        r#"{"intent": "motivation", "reply": "unused"}"#,
    ));
    let clock = Arc::new(ManualClock::new(common::now()));
    let config = IntentConfig {
        enabled: false,
        ..IntentConfig::default()
    };
    let classifier = IntentClassifier::new(service.clone(), clock, config);

    let result = classifier.classify("hello", &[]).await;
    assert_eq!(result.intent, Intent::Unknown);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_disabled_service_degrades_without_retrying() {
    let (classifier, clock) = classifier(Arc::new(DisabledService));

    let result = classifier.classify("hello", &[]).await;
    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.degraded);
    assert!(clock.sleeps().is_empty());
}
