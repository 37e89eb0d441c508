//! Client for the external banner OCR analyzer.
//!
//! The analyzer is a separate program that takes an image path as its last
//! argument and prints exactly one JSON object on stdout. Progress chatter
//! goes to stderr. A non-zero exit means failure; the JSON on stdout (if any)
//! then carries an `error` field.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::models::banner::BannerAnalysis;

#[derive(Debug, Error)]
pub enum BannerError {
    #[error("image not found: {0}")]
    MissingImage(String),

    #[error("failed to start analyzer: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("analyzer exited with {code:?}: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("analyzer reported failure: {0}")]
    Rejected(String),

    #[error("analyzer printed invalid JSON: {0}")]
    InvalidOutput(#[source] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BannerAnalyzer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl BannerAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Parse a whitespace-separated command line such as `python3 ai/banner_analyzer.py`.
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    pub async fn analyze(&self, image: &Path) -> Result<BannerAnalysis, BannerError> {
        if !image.exists() {
            return Err(BannerError::MissingImage(image.display().to_string()));
        }

        tracing::info!(image = %image.display(), program = %self.program, "analyzing banner");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| BannerError::Timeout(self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = serde_json::from_str::<serde_json::Value>(stdout.trim())
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| stderr.trim().to_string());
            tracing::warn!(code = ?output.status.code(), "banner analyzer failed: {}", message);
            return Err(BannerError::Failed {
                code: output.status.code(),
                message,
            });
        }

        let analysis: BannerAnalysis =
            serde_json::from_str(stdout.trim()).map_err(BannerError::InvalidOutput)?;

        if !analysis.success {
            return Err(BannerError::Rejected(
                analysis
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::info!("banner analysis complete");
        Ok(analysis)
    }
}
