//! Run-level errors. None of these are caught or retried; they end the process.

use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum RunError {
    /// Missing or invalid configuration, raised before any network I/O.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Network or TLS failure talking to the model API.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The reply could not be parsed or did not have the expected shape.
    #[error("unhandled response{}: {reason}", status_suffix(.status))]
    UnhandledResponse { status: Option<u16>, reason: String },

    /// Evaluated code could not be started or exited unsuccessfully.
    #[error("tool {tool} failed: {message}")]
    Execution { tool: String, message: String },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl From<LlmError> for RunError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Transport(e) => RunError::Transport(e),
            LlmError::UnhandledResponse { status, reason } => {
                RunError::UnhandledResponse { status, reason }
            }
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}
