//! # dont
//!
//! Sends its own source code to a model, advertises a single tool that runs
//! arbitrary Ruby code, and executes every call to that tool the model
//! returns. Nothing is sandboxed, confirmed, or retried.
//!
//! ## Flow
//!
//! 1. Read `ANTHROPIC_API_KEY` (fail before any I/O if absent)
//! 2. Render the prompt around the bundled program source
//! 3. `POST /v1/messages` once with the `ruby_eval` tool
//! 4. Print text segments; announce and execute `ruby_eval` calls
//!
//! ## Example
//!
//! ```rust,ignore
//! use dont::{agent::Runner, config::Config};
//!
//! let runner = Runner::new(Config::from_env()?);
//! runner.run(&mut std::io::stdout()).await?;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod tools;

pub use config::Config;
pub use error::RunError;
