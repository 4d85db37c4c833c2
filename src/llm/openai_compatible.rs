// ABOUTME: OpenAI-compatible chat completions client implementing NaturalLanguageService
// ABOUTME: Works against Ollama, vLLM, LocalAI, or hosted endpoints; maps HTTP failures to CompletionError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, Completion, CompletionError, NaturalLanguageService};
use crate::config::CompletionServiceConfig;

/// Connection timeout; local servers can be slow to accept
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest error body kept in messages
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Client for any endpoint implementing the `OpenAI` chat completions API
pub struct OpenAiCompatibleService {
    client: Client,
    config: CompletionServiceConfig,
}

impl OpenAiCompatibleService {
    /// Create a client with the configured timeouts
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Transport` if the HTTP client cannot be built.
    pub fn new(config: CompletionServiceConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CompletionError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Endpoint settings in use
    #[must_use]
    pub const fn config(&self) -> &CompletionServiceConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// Map a non-success status and body onto an error class
    fn parse_error_response(status: StatusCode, body: &str) -> CompletionError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
            |parsed| parsed.error.message,
        );
        match status.as_u16() {
            401 | 403 => CompletionError::Rejected(format!("authentication failed: {message}")),
            429 => CompletionError::RateLimited(message),
            400 | 404 | 422 => CompletionError::Rejected(format!("{status}: {message}")),
            408 => CompletionError::Timeout,
            500..=599 => CompletionError::Unavailable(format!("{status}: {message}")),
            _ => CompletionError::Transport(format!("unexpected status {status}: {message}")),
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout
        } else if e.is_connect() {
            CompletionError::Unavailable(format!(
                "cannot connect to {}: {e}",
                self.config.base_url
            ))
        } else {
            CompletionError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl NaturalLanguageService for OpenAiCompatibleService {
    fn name(&self) -> &'static str {
        "openai_compatible"
    }

    #[instrument(skip_all, fields(model = %self.config.model, history = history.len()))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[ChatMessage],
    ) -> Result<Completion, CompletionError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(OpenAiMessage {
            role: "system",
            content: system_prompt,
        });
        messages.extend(history.iter().map(OpenAiMessage::from));
        messages.push(OpenAiMessage {
            role: "user",
            content: user_message,
        });

        let request = OpenAiRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };
        debug!(messages = request.messages.len(), "sending chat completion request");

        let response = self
            .add_auth_header(self.client.post(self.api_url("chat/completions")))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("completion request failed: {e}");
                self.map_send_error(&e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(&e))?;
        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            CompletionError::InvalidResponse(format!("failed to parse response: {e}"))
        })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::InvalidResponse("response has no content".into()))?;
        let (prompt_tokens, completion_tokens) = parsed
            .usage
            .map_or((0, 0), |usage| (usage.prompt, usage.completion));

        debug!(prompt_tokens, completion_tokens, "completion received");
        Ok(Completion {
            text,
            prompt_tokens,
            completion_tokens,
        })
    }
}
