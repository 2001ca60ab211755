//! Completion backend implementations
//!
//! `HttpCompletionModel` talks to an OpenAI-compatible chat endpoint.
//! Any non-success status, malformed body, or timeout becomes a
//! recoverable `External` error so callers can fall back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use intake_agent_config::CompletionConfig;
use intake_agent_core::{CompletionModel, CompletionOutput, Result};

use crate::LlmError;

/// OpenAI-compatible chat completion backend
pub struct HttpCompletionModel {
    client: Client,
    config: CompletionConfig,
}

impl HttpCompletionModel {
    pub fn new(config: CompletionConfig) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionModel for HttpCompletionModel {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<CompletionOutput> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_text.to_string(),
                },
            ],
            max_tokens,
            temperature,
        };

        let mut builder = self.client.post(self.api_url()).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(LlmError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("status {status}: {body}")).into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

        Ok(CompletionOutput {
            text,
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Scripted backend for tests: returns canned responses in order, or an
/// error when configured to fail.
pub struct MockCompletionModel {
    responses: parking_lot::Mutex<Vec<String>>,
    fail: bool,
    tokens_per_call: u32,
}

impl MockCompletionModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(
                responses.into_iter().rev().map(String::from).collect(),
            ),
            fail: false,
            tokens_per_call: 20,
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: parking_lot::Mutex::new(Vec::new()),
            fail: true,
            tokens_per_call: 0,
        }
    }

    pub fn with_tokens_per_call(mut self, tokens: u32) -> Self {
        self.tokens_per_call = tokens;
        self
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_text: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<CompletionOutput> {
        if self.fail {
            return Err(LlmError::Network("mock failure".to_string()).into());
        }
        let text = self
            .responses
            .lock()
            .pop()
            .unwrap_or_else(|| "unknown".to_string());
        Ok(CompletionOutput {
            text,
            tokens_used: self.tokens_per_call,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let config = CompletionConfig {
            endpoint: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        };
        let model = HttpCompletionModel::new(config).unwrap();
        assert_eq!(model.api_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_mock_responses_in_order() {
        let model = MockCompletionModel::new(vec!["first", "second"]);
        let a = model.complete("s", "u", 10, 0.0).await.unwrap();
        let b = model.complete("s", "u", 10, 0.0).await.unwrap();
        assert_eq!(a.text, "first");
        assert_eq!(b.text, "second");
    }

    #[tokio::test]
    async fn test_failing_mock_is_recoverable() {
        let model = MockCompletionModel::failing();
        let err = model.complete("s", "u", 10, 0.0).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
