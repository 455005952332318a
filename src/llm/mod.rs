//! LLM module - the Messages API wire types and client.

mod anthropic;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use anthropic::{parse_messages_response, AnthropicClient, ANTHROPIC_VERSION};
pub use types::{
    ContentBlock, Message, MessagesRequest, MessagesResponse, Role, ToolDefinition, Usage,
};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the model API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unhandled response{}: {reason}", status_suffix(.status))]
    UnhandledResponse { status: Option<u16>, reason: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

/// A client able to perform one Messages API call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError>;
}
