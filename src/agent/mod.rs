//! Agent module - a single, unguarded tool-call cycle.
//!
//! 1. Render a prompt containing this program's complete source
//! 2. Advertise one tool, `ruby_eval`, and send the request once
//! 3. Print text segments; execute `ruby_eval` calls as they come
//!
//! There is no second turn: tool output is never sent back to the model.

mod prompt;
mod runner;
pub mod source;

use std::io::Write;

use crate::config::Config;
use crate::error::RunError;

pub use prompt::build_prompt;
pub use runner::{RunPhase, Runner};

/// Load configuration from the environment and perform one run against stdout.
///
/// Fails with [`RunError::Configuration`] before any network I/O when
/// `ANTHROPIC_API_KEY` is missing.
pub async fn run() -> Result<(), RunError> {
    run_with(|name| std::env::var(name).ok(), &mut std::io::stdout()).await
}

/// [`run`] with an injected variable lookup and output sink.
pub async fn run_with<F>(lookup: F, out: &mut (dyn Write + Send)) -> Result<(), RunError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    tracing::debug!(?config, "Loaded configuration");

    Runner::new(config).run(out).await
}
