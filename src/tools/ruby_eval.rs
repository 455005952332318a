//! Unsafe dynamic execution: hand model-supplied code to a Ruby interpreter.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::Tool;

pub const RUBY_EVAL: &str = "ruby_eval";

/// Evaluate arbitrary Ruby code as `<interpreter> -e <code>`.
///
/// No inspection, no sandbox, no timeout, no confirmation. The child
/// inherits stdin, the environment, and the privileges of this process.
pub struct RubyEval {
    interpreter: String,
    workspace: PathBuf,
}

impl RubyEval {
    pub fn new(interpreter: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            workspace: workspace.into(),
        }
    }
}

#[async_trait]
impl Tool for RubyEval {
    fn name(&self) -> &str {
        RUBY_EVAL
    }

    fn description(&self) -> &str {
        "Evaluates arbitrary Ruby code in a Ruby interpreter spawned with this process's privileges. Can modify state, execute shell commands, rewrite files, or do anything Ruby can do."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Ruby code to evaluate"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, args: Value, out: &mut (dyn Write + Send)) -> anyhow::Result<()> {
        let code = args["code"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'code' argument"))?;

        tracing::info!(interpreter = %self.interpreter, "Evaluating model-supplied code");

        let mut child = Command::new(&self.interpreter)
            .arg("-e")
            .arg(code)
            .current_dir(&self.workspace)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", self.interpreter, e))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("{} stdout is unavailable", self.interpreter))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("{} stderr is unavailable", self.interpreter))?;

        // Drained alongside stdout so a chatty child cannot block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        let mut chunk = [0u8; 8192];
        loop {
            let n = stdout
                .read(&mut chunk)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {} stdout: {}", self.interpreter, e))?;
            if n == 0 {
                break;
            }
            out.write_all(&chunk[..n])?;
            out.flush()?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to wait for {}: {}", self.interpreter, e))?;
        let stderr = stderr_task
            .await
            .map_err(|e| anyhow::anyhow!("stderr reader panicked: {}", e))?
            .map_err(|e| anyhow::anyhow!("Failed to read {} stderr: {}", self.interpreter, e))?;
        let stderr = String::from_utf8_lossy(&stderr);

        if !status.success() {
            return Err(anyhow::anyhow!(
                "{} exited with {}: {}",
                self.interpreter,
                status
                    .code()
                    .map(|c| format!("code {}", c))
                    .unwrap_or_else(|| "a signal".to_string()),
                stderr.trim_end()
            ));
        }

        if !stderr.is_empty() {
            tracing::warn!(stderr = %stderr.trim_end(), "Evaluated code wrote to stderr");
        }

        Ok(())
    }
}
