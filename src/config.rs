//! Configuration management for dont.
//!
//! Configuration can be set via environment variables:
//! - `ANTHROPIC_API_KEY` - Required. Sent as the `x-api-key` header.
//! - `ANTHROPIC_BASE_URL` - Optional. API origin. Defaults to `https://api.anthropic.com`.
//! - `DONT_MODEL` - Optional. Model identifier. Defaults to `claude-sonnet-4-20250514`.
//! - `DONT_MAX_TOKENS` - Optional. Maximum output tokens. Defaults to `1024`.
//! - `DONT_RUBY` - Optional. Interpreter used by `ruby_eval`. Defaults to `ruby`.
//! - `WORKSPACE_PATH` - Optional. Working directory for evaluated code. Defaults to current directory.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_RUBY: &str = "ruby";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Runner configuration.
#[derive(Clone)]
pub struct Config {
    /// Anthropic API key
    pub api_key: String,

    /// API origin, without the `/v1/messages` path
    pub base_url: String,

    /// Model identifier placed in the request envelope
    pub model: String,

    /// `max_tokens` placed in the request envelope
    pub max_tokens: u32,

    /// Interpreter program for `ruby_eval`
    pub ruby: String,

    /// Working directory for evaluated code
    pub workspace_path: PathBuf,
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("ruby", &self.ruby)
            .field("workspace_path", &self.workspace_path)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `ANTHROPIC_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ANTHROPIC_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;

        let base_url = lookup("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = lookup("DONT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = lookup("DONT_MAX_TOKENS")
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .map_err(|e| ConfigError::InvalidValue("DONT_MAX_TOKENS".to_string(), format!("{}", e)))
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let ruby = lookup("DONT_RUBY").unwrap_or_else(|| DEFAULT_RUBY.to_string());

        let workspace_path = lookup("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        Ok(Self {
            api_key,
            base_url,
            model,
            max_tokens,
            ruby,
            workspace_path,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            ruby: DEFAULT_RUBY.to_string(),
            workspace_path: PathBuf::from("."),
        }
    }

    /// Full URL of the Messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}
