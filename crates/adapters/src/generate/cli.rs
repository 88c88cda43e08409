// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generator backed by the model CLI in non-interactive print mode.

use super::prompts::{self, IMAGE_SYSTEM_PROMPT, PAGE_SYSTEM_PROMPT};
use super::{GenerateError, GeneratorAdapter, GeneratorSettings};
use crate::browser::Viewport;
use crate::capture::ScrapedPage;
use crate::design::{self, DesignHints};
use crate::response;
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use rp_core::ArtifactTriple;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

const LABEL: &str = "Claude CLI";

#[derive(Debug, Clone)]
pub struct CliGenerator {
    binary: String,
    model: String,
    timeout: Duration,
    viewport: Viewport,
}

/// `--output-format json` result envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: Option<String>,
}

/// Pull the result text out of the CLI's JSON envelope.
pub fn parse_envelope(stdout: &str) -> Result<String, GenerateError> {
    let envelope: Envelope = serde_json::from_str(stdout).map_err(|e| GenerateError::Envelope {
        label: LABEL.to_string(),
        message: format!("{e}\nOutput: {}", prompts::head(stdout, 500)),
    })?;
    if envelope.is_error {
        return Err(GenerateError::Model(envelope.result.unwrap_or_default()));
    }
    match envelope.result {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(GenerateError::Empty),
    }
}

impl CliGenerator {
    pub fn new(settings: &GeneratorSettings) -> Self {
        Self {
            binary: settings.cli_binary.clone(),
            model: settings.cli_model.clone(),
            timeout: settings.cli_timeout(),
            viewport: settings.viewport,
        }
    }

    async fn call(&self, prompt: &str, system: &str) -> Result<ArtifactTriple, GenerateError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p")
            .args(["--model", &self.model])
            .args(["--output-format", "json"])
            .args(["--permission-mode", "bypassPermissions"])
            .args(["--system-prompt", system]);

        tracing::info!(binary = %self.binary, model = %self.model, prompt_chars = prompt.len(), "calling model CLI");
        let output = run_with_timeout(cmd, Some(prompt.as_bytes()), self.timeout, LABEL).await?;

        if !output.status.success() {
            return Err(GenerateError::Exit {
                label: LABEL.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let text = parse_envelope(&String::from_utf8_lossy(&output.stdout))?;
        let triple = response::parse_triple(&text)?;
        tracing::info!(
            html_bytes = triple.html.len(),
            css_bytes = triple.css.len(),
            js_bytes = triple.js.len(),
            "model CLI response parsed"
        );
        Ok(triple)
    }
}

#[async_trait]
impl GeneratorAdapter for CliGenerator {
    async fn generate(&self, page: &ScrapedPage) -> Result<ArtifactTriple, GenerateError> {
        let hints = design::hints_from_html(&page.html);
        let prompt = prompts::page_prompt(page, Some(&hints));
        self.call(&prompt, PAGE_SYSTEM_PROMPT).await
    }

    async fn generate_from_image(
        &self,
        image: &Path,
        hints: Option<&DesignHints>,
    ) -> Result<ArtifactTriple, GenerateError> {
        let absolute = std::path::absolute(image)
            .map_err(|_| crate::image_prep::ImagePrepError::NotFound(image.to_path_buf()))?;
        let prompt = prompts::image_prompt(self.viewport, hints, Some(&absolute));
        self.call(&prompt, IMAGE_SYSTEM_PROMPT).await
    }

    async fn refine(
        &self,
        current: &ArtifactTriple,
        similarity: f64,
        report: &str,
    ) -> Result<ArtifactTriple, GenerateError> {
        let prompt = prompts::refine_prompt(current, similarity, report);
        self.call(&prompt, PAGE_SYSTEM_PROMPT).await
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
