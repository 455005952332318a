//! One request/response cycle with the model.

use std::io::Write;
use std::sync::Arc;

use crate::config::Config;
use crate::error::RunError;
use crate::llm::{AnthropicClient, ContentBlock, LlmClient, Message, MessagesRequest};
use crate::tools::{RubyEval, Tool};

use super::prompt::build_prompt;
use super::source::render_program_source;

/// Progress of a run. There is no retry or recovery branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    RequestSent,
    ResponseReceived,
    SegmentsProcessed,
}

/// Sends the self-describing prompt once and acts on every segment of the reply.
pub struct Runner {
    config: Config,
    llm: Arc<dyn LlmClient>,
    capability: Arc<dyn Tool>,
    prompt: String,
}

impl Runner {
    /// Runner talking to the Anthropic API and evaluating with a real interpreter.
    pub fn new(config: Config) -> Self {
        let llm = Arc::new(AnthropicClient::new(
            config.api_key.clone(),
            config.messages_url(),
        ));
        let capability = Arc::new(RubyEval::new(
            config.ruby.clone(),
            config.workspace_path.clone(),
        ));
        Self::with_parts(config, llm, capability)
    }

    /// Runner with an explicit client and capability.
    ///
    /// The prompt is rendered here, once, before anything can have been
    /// evaluated.
    pub fn with_parts(config: Config, llm: Arc<dyn LlmClient>, capability: Arc<dyn Tool>) -> Self {
        let prompt = build_prompt(&render_program_source(), capability.as_ref());
        Self {
            config,
            llm,
            capability,
            prompt,
        }
    }

    /// The rendered user prompt, fixed at construction.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The request envelope: one tool, one user message.
    pub fn build_request(&self) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            tools: vec![self.capability.definition()],
            messages: vec![Message::user(self.prompt.clone())],
        }
    }

    /// Send the request and handle each returned segment in order.
    ///
    /// Text is written to `out` followed by a newline. A `tool_use` segment
    /// naming the advertised capability is announced as `Executing: <code>`
    /// and then executed without inspection; its stdout streams into `out`.
    /// `tool_use` segments naming anything else are skipped.
    ///
    /// Executed code has unbounded side effects on this machine and process
    /// environment. Every failure is returned as is, never retried.
    pub async fn run(&self, out: &mut (dyn Write + Send)) -> Result<(), RunError> {
        let mut phase = RunPhase::NotStarted;
        tracing::debug!(?phase, "Starting run");

        let request = self.build_request();
        tracing::info!(
            model = %request.model,
            max_tokens = request.max_tokens,
            tool = %self.capability.name(),
            "Sending request"
        );
        phase = RunPhase::RequestSent;
        tracing::debug!(?phase);

        let response = self.llm.create_message(&request).await?;
        phase = RunPhase::ResponseReceived;
        tracing::info!(
            segments = response.content.len(),
            stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
            "Response received"
        );
        tracing::debug!(?phase);

        for block in &response.content {
            match block {
                ContentBlock::Text { text } => {
                    writeln!(out, "{}", text)?;
                }
                ContentBlock::ToolUse { id, name, input } if name == self.capability.name() => {
                    let code = input
                        .get("code")
                        .and_then(|c| c.as_str())
                        .ok_or_else(|| RunError::UnhandledResponse {
                            status: None,
                            reason: format!("tool_use {} has no string `code` input", id),
                        })?;

                    writeln!(out, "Executing: {}", code)?;
                    out.flush()?;

                    tracing::info!(tool = %name, id = %id, "Executing tool call");
                    self.capability
                        .execute(input.clone(), &mut *out)
                        .await
                        .map_err(|e| RunError::Execution {
                            tool: name.clone(),
                            message: format!("{:#}", e),
                        })?;
                    out.flush()?;
                }
                ContentBlock::ToolUse { name, .. } => {
                    tracing::warn!(tool = %name, "Ignoring call to unadvertised tool");
                }
                ContentBlock::Unknown => {
                    tracing::debug!("Ignoring unsupported content block");
                }
            }
        }

        phase = RunPhase::SegmentsProcessed;
        tracing::debug!(?phase, "Run complete");
        Ok(())
    }
}
