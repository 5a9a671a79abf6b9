//! Extraction through an external converter process.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ExtractorConfig;
use crate::errors::{LitgraphError, Result};

use super::{normalize, BlockExtractor, RawBlock};

/// Runs a converter that reads a document on stdin and prints its blocks as
/// a JSON array on stdout.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    async fn run(&self, text: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                LitgraphError::extraction(format!("failed to start {}: {}", self.program, e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| LitgraphError::extraction("converter stdin unavailable"))?;

        let write = async move {
            let written = stdin.write_all(text.as_bytes()).await;
            // Dropping stdin closes the pipe.
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(LitgraphError::Extraction {
                message: format!("{} exited with {}", self.program, output.status),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if let Err(e) = written {
            tracing::debug!("Converter closed stdin early: {}", e);
        }

        Ok(output.stdout)
    }
}

impl BlockExtractor for CommandExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<RawBlock>> {
        tracing::debug!(program = %self.program, bytes = text.len(), "Running converter");

        let stdout = tokio::time::timeout(self.timeout, self.run(text))
            .await
            .map_err(|_| {
                LitgraphError::extraction(format!(
                    "{} timed out after {} ms",
                    self.program,
                    self.timeout.as_millis()
                ))
            })??;

        let blocks: Vec<RawBlock> =
            serde_json::from_slice(&stdout).map_err(|e| LitgraphError::Extraction {
                message: format!("{} produced unreadable output", self.program),
                diagnostics: e.to_string(),
            })?;

        Ok(normalize(blocks))
    }
}
