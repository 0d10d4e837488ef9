//! Chat-completion backend for the coaching layer.
//!
//! The coaching text comes from an OpenAI-compatible chat API (Groq by
//! default). The backend is a trait so the prompt/formatting logic can be
//! exercised against a mock without network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CoachError;
use crate::config::AiConfig;

/// A message in a conversation with the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to the chat backend.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from the chat backend.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait CoachBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoachError>;
}

/// OpenAI-compatible chat-completions request body.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Groq (OpenAI-compatible) backend.
pub struct GroqBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GroqBackend {
    pub fn new(
        base_url: String,
        model: String,
        api_key: String,
        timeout_seconds: u64,
    ) -> Result<Self, CoachError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| CoachError::Backend(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    /// Build a backend from config, resolving the API key from the
    /// configured environment variable. A missing key means the coaching
    /// feature is unavailable, which is distinct from a failed call.
    pub fn from_config(config: &AiConfig) -> Result<Self, CoachError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CoachError::Unavailable(format!("{} env var not set", config.api_key_env))
        })?;

        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            config.timeout_seconds,
        )
    }
}

#[async_trait]
impl CoachBackend for GroqBackend {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = CompletionRequest {
            model: self.model.clone(),
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Sending coaching request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoachError::Backend(format!(
                "chat API returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CoachError::ResponseParse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CoachError::ResponseParse("response had no choices".to_string()))?;

        Ok(ChatResponse {
            content,
            model: completion.model,
        })
    }
}

/// Canned-response backend for tests.
pub struct MockCoachBackend {
    response: String,
}

impl MockCoachBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CoachBackend for MockCoachBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, CoachError> {
        Ok(ChatResponse {
            content: self.response.clone(),
            model: "mock".to_string(),
        })
    }
}
