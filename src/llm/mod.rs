// ABOUTME: Natural-language completion service contract used by the intent classifier
// ABOUTME: Message types, token-counted completions, and a failure taxonomy with transient classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Completion Service Interface
//!
//! The classifier only needs one operation: send a system prompt, the user's
//! message, and recent history, then get back text and token counts.
//! Implementations may fail in any way; [`CompletionError::is_transient`]
//! tells the caller which failures are worth retrying.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pierre_training::llm::{ChatMessage, NaturalLanguageService, OpenAiCompatibleService};
//! use pierre_training::config::CompletionServiceConfig;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = OpenAiCompatibleService::new(CompletionServiceConfig::default())?;
//!     let history = vec![ChatMessage::assistant("How did the tempo run feel?")];
//!     let completion = service
//!         .complete("Reply in one sentence.", "Way too hard", &history)
//!         .await?;
//!     println!("{}", completion.text);
//!     Ok(())
//! }
//! ```

mod openai_compatible;
pub mod prompts;

pub use openai_compatible::OpenAiCompatibleService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Wire representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Completion text with token accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated
    pub completion_tokens: u32,
}

/// Failure of a completion call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The call did not finish within the configured timeout
    #[error("completion request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The service is throttling requests
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The service answered with a 5xx or is not running
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Authentication failure or malformed request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Completion calls are turned off by configuration
    #[error("completion service is disabled")]
    Disabled,

    /// The response body could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Whether a retry may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Transport(_) | Self::RateLimited(_) | Self::Unavailable(_)
        )
    }
}

/// External natural-language completion service
#[async_trait]
pub trait NaturalLanguageService: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    /// Complete `user_message` under `system_prompt` given prior `history`
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, CompletionError>;
}

/// Service used when completion calls are turned off; every call fails with `Disabled`
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledService;

#[async_trait]
impl NaturalLanguageService for DisabledService {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        Err(CompletionError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CompletionError::Timeout.is_transient());
        assert!(CompletionError::Unavailable("502".into()).is_transient());
        assert!(!CompletionError::Rejected("401".into()).is_transient());
        assert!(!CompletionError::Disabled.is_transient());
        assert!(!CompletionError::InvalidResponse("empty".into()).is_transient());
    }

    #[tokio::test]
    async fn test_disabled_service_always_fails() {
        let result = DisabledService.complete("system", "hello", &[]).await;
        assert_eq!(result, Err(CompletionError::Disabled));
    }
}
