//! Anthropic Messages API client.

use async_trait::async_trait;
use serde_json::Value;

use super::{LlmClient, LlmError, MessagesRequest, MessagesResponse};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Plain reqwest client for `POST /v1/messages`.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicClient {
    /// `endpoint` is the full Messages URL, e.g. `https://api.anthropic.com/v1/messages`.
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(status, bytes = body.len(), "Messages API responded");

        parse_messages_response(Some(status), &body)
    }
}

/// Parse a Messages API body. The HTTP status is only carried into errors.
pub fn parse_messages_response(status: Option<u16>, body: &str) -> Result<MessagesResponse, LlmError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LlmError::UnhandledResponse {
        status,
        reason: format!("body is not valid JSON: {}", e),
    })?;

    if value.get("type").and_then(Value::as_str) == Some("error") {
        let message = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        let kind = value
            .pointer("/error/type")
            .and_then(Value::as_str)
            .unwrap_or("error");
        return Err(LlmError::UnhandledResponse {
            status,
            reason: format!("API returned {}: {}", kind, message),
        });
    }

    serde_json::from_value(value).map_err(|e| LlmError::UnhandledResponse {
        status,
        reason: format!("unexpected response shape: {}", e),
    })
}
