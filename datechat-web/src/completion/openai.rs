//! OpenAI-compatible completion backend.

use super::{role_for_position, CompletionError, CompletionService};
use async_trait::async_trait;
use datechat_common::config::LlmConfig;
use datechat_common::util::sanitize_for_log;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Calls `POST {base_url}/v1/chat/completions` with the caller's API key.
pub struct OpenAICompletion {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f64>,
    max_tokens: Option<i64>,
}

impl OpenAICompletion {
    pub fn new(config: &LlmConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError {
                provider: "openai".into(),
                model: config.model.clone(),
                message: format!("Failed to build HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: Some(config.temperature),
            max_tokens: config.max_tokens,
        })
    }

    fn error(&self, message: String, status_code: Option<u16>) -> CompletionError {
        CompletionError {
            provider: "openai".into(),
            model: self.model.clone(),
            message,
            status_code,
        }
    }

    fn build_request(&self, instruction: &str, history: &[String]) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(OpenAIMessage {
            role: "system".into(),
            content: instruction.to_string(),
        });
        let len = history.len();
        messages.extend(history.iter().enumerate().map(|(i, content)| OpenAIMessage {
            role: role_for_position(i, len).into(),
            content: content.clone(),
        }));

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAICompletion {
    fn name(&self) -> &str {
        "openai"
    }

    async fn request_reply(
        &self,
        instruction: &str,
        history: &[String],
        api_key: &str,
    ) -> Result<String, CompletionError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = self.build_request(instruction, history);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error(format!("Request failed: {}", e), None))?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                latency_ms,
                body = %sanitize_for_log(&body),
                "Completion request rejected"
            );
            return Err(self.error(
                format!("API error: {}", sanitize_for_log(&body)),
                Some(status.as_u16()),
            ));
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {}", e), None))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| self.error("Response contained no reply".into(), None))?;

        let model = parsed.model.unwrap_or_else(|| self.model.clone());
        let total_tokens = parsed.usage.map(|u| u.total_tokens);
        tracing::info!(%model, latency_ms, ?total_tokens, "Completion received");

        Ok(content)
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: i64,
}
