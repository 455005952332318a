//! Tools the model may invoke.
//!
//! There is exactly one: [`RubyEval`], which runs arbitrary code with this
//! process's full privileges. Anything it runs may write files, spawn
//! processes, or rewrite this program; none of that is observed or bounded.

mod ruby_eval;

use std::io::Write;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::ToolDefinition;

pub use ruby_eval::RubyEval;

/// A capability that can be advertised to the model and executed on request.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model must use to invoke this tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON-Schema for the tool input.
    fn parameters_schema(&self) -> Value;

    /// Execute with the model-supplied input, writing any output to `out` as
    /// it is produced. Output written before a failure stays written.
    async fn execute(&self, args: Value, out: &mut (dyn Write + Send)) -> anyhow::Result<()>;

    /// Descriptor sent in the request envelope.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}
