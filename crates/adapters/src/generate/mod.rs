// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code generation adapters.
//!
//! A generator turns a scraped page, a screenshot, or a previous attempt plus
//! its verification report into an [`ArtifactTriple`].

mod api;
mod cli;
pub mod prompts;

pub use api::ApiGenerator;
pub use cli::{parse_envelope, CliGenerator};

use crate::browser::Viewport;
use crate::capture::ScrapedPage;
use crate::design::DesignHints;
use crate::image_prep::{ImagePrepError, DEFAULT_IMAGE_BUDGET};
use crate::subprocess::SubprocessError;
use async_trait::async_trait;
use rp_core::{ArtifactError, ArtifactTriple};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Process(#[from] SubprocessError),
    #[error("{label} error (code {code}): {stderr}")]
    Exit { label: String, code: i32, stderr: String },
    #[error("Invalid JSON from {label}: {message}")]
    Envelope { label: String, message: String },
    #[error("model returned error: {0}")]
    Model(String),
    #[error("Empty result from model")]
    Empty,
    #[error("Could not extract JSON from response. Response preview: {0}")]
    Extract(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("{label} timed out after {secs}s")]
    Timeout { label: String, secs: u64 },
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error(transparent)]
    Image(#[from] ImagePrepError),
    #[error("background task failed: {0}")]
    Task(String),
    #[error("generator not configured: {0}")]
    NotConfigured(String),
}

impl GenerateError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GenerateError::Timeout { .. } | GenerateError::Process(SubprocessError::TimedOut { .. })
        )
    }
}

/// Which backend produces code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Model CLI subprocess
    #[default]
    Cli,
    /// Messages HTTP API
    Api,
}

rp_core::simple_display! {
    Provider {
        Cli => "cli",
        Api => "api",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub provider: Provider,
    pub cli_binary: String,
    pub cli_model: String,
    pub cli_timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_model: String,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub max_tokens: u32,
    /// Ceiling on the base64 size of uploaded screenshots.
    pub image_budget: usize,
    pub viewport: Viewport,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Cli,
            cli_binary: "claude".to_string(),
            cli_model: "sonnet".to_string(),
            cli_timeout_secs: 300,
            api_key: None,
            api_model: "claude-opus-4-5-20251101".to_string(),
            api_base_url: "https://api.anthropic.com".to_string(),
            api_timeout_secs: 900,
            max_tokens: 20_000,
            image_budget: DEFAULT_IMAGE_BUDGET,
            viewport: Viewport::default(),
        }
    }
}

impl GeneratorSettings {
    pub fn cli_timeout(&self) -> Duration {
        Duration::from_secs(self.cli_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Adapter for producing page code.
#[async_trait]
pub trait GeneratorAdapter: Clone + Send + Sync + 'static {
    /// Code for a scraped page.
    async fn generate(&self, page: &ScrapedPage) -> Result<ArtifactTriple, GenerateError>;

    /// Code for a screenshot or mockup on disk.
    async fn generate_from_image(
        &self,
        image: &Path,
        hints: Option<&DesignHints>,
    ) -> Result<ArtifactTriple, GenerateError>;

    /// Revised code given the last attempt's score and verification report.
    async fn refine(
        &self,
        current: &ArtifactTriple,
        similarity: f64,
        report: &str,
    ) -> Result<ArtifactTriple, GenerateError>;
}

/// Generator chosen from settings at startup.
#[derive(Clone)]
pub enum AnyGenerator {
    Cli(CliGenerator),
    Api(ApiGenerator),
}

impl AnyGenerator {
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GenerateError> {
        tracing::info!(provider = %settings.provider, "configuring generator");
        match settings.provider {
            Provider::Cli => Ok(Self::Cli(CliGenerator::new(settings))),
            Provider::Api => Ok(Self::Api(ApiGenerator::new(settings)?)),
        }
    }
}

#[async_trait]
impl GeneratorAdapter for AnyGenerator {
    async fn generate(&self, page: &ScrapedPage) -> Result<ArtifactTriple, GenerateError> {
        match self {
            Self::Cli(g) => g.generate(page).await,
            Self::Api(g) => g.generate(page).await,
        }
    }

    async fn generate_from_image(
        &self,
        image: &Path,
        hints: Option<&DesignHints>,
    ) -> Result<ArtifactTriple, GenerateError> {
        match self {
            Self::Cli(g) => g.generate_from_image(image, hints).await,
            Self::Api(g) => g.generate_from_image(image, hints).await,
        }
    }

    async fn refine(
        &self,
        current: &ArtifactTriple,
        similarity: f64,
        report: &str,
    ) -> Result<ArtifactTriple, GenerateError> {
        match self {
            Self::Cli(g) => g.refine(current, similarity, report).await,
            Self::Api(g) => g.refine(current, similarity, report).await,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{GenerateError, GeneratorAdapter};
    use crate::capture::ScrapedPage;
    use crate::design::DesignHints;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rp_core::ArtifactTriple;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded generator call
    #[derive(Debug, Clone, PartialEq)]
    pub enum GenerateCall {
        Generate { url: String },
        FromImage { path: PathBuf, hints: Option<DesignHints> },
        Refine { similarity: f64, report: String },
    }

    struct FakeGeneratorState {
        outcomes: VecDeque<Result<ArtifactTriple, GenerateError>>,
        default: ArtifactTriple,
        delay: Option<Duration>,
        calls: Vec<GenerateCall>,
    }

    /// Fake generator returning scripted outcomes, then a default triple
    #[derive(Clone)]
    pub struct FakeGenerator {
        inner: Arc<Mutex<FakeGeneratorState>>,
    }

    impl Default for FakeGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeGenerator {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeGeneratorState {
                    outcomes: VecDeque::new(),
                    default: ArtifactTriple {
                        html: "<!DOCTYPE html>\n<html>\n<head>\n<title>Fake</title>\n</head>\n<body>\n<h1>Fake</h1>\n</body>\n</html>\n".to_string(),
                        css: "h1 { color: #333; }\n".to_string(),
                        js: "console.log('ready');\n".to_string(),
                    },
                    delay: None,
                    calls: Vec::new(),
                })),
            }
        }

        pub fn push_ok(&self, triple: ArtifactTriple) {
            self.inner.lock().outcomes.push_back(Ok(triple));
        }

        pub fn push_err(&self, err: GenerateError) {
            self.inner.lock().outcomes.push_back(Err(err));
        }

        pub fn set_default(&self, triple: ArtifactTriple) {
            self.inner.lock().default = triple;
        }

        /// Sleep this long inside every call.
        pub fn set_delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<GenerateCall> {
            self.inner.lock().calls.clone()
        }

        pub fn refine_count(&self) -> usize {
            self.inner.lock().calls.iter().filter(|c| matches!(c, GenerateCall::Refine { .. })).count()
        }

        async fn answer(&self, call: GenerateCall) -> Result<ArtifactTriple, GenerateError> {
            let delay = self.inner.lock().delay;
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            let mut state = self.inner.lock();
            state.calls.push(call);
            let fallback = state.default.clone();
            state.outcomes.pop_front().unwrap_or(Ok(fallback))
        }
    }

    #[async_trait]
    impl GeneratorAdapter for FakeGenerator {
        async fn generate(&self, page: &ScrapedPage) -> Result<ArtifactTriple, GenerateError> {
            self.answer(GenerateCall::Generate { url: page.url.clone() }).await
        }

        async fn generate_from_image(
            &self,
            image: &Path,
            hints: Option<&DesignHints>,
        ) -> Result<ArtifactTriple, GenerateError> {
            self.answer(GenerateCall::FromImage { path: image.to_path_buf(), hints: hints.cloned() })
                .await
        }

        async fn refine(
            &self,
            _current: &ArtifactTriple,
            similarity: f64,
            report: &str,
        ) -> Result<ArtifactTriple, GenerateError> {
            self.answer(GenerateCall::Refine { similarity, report: report.to_string() }).await
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGenerator, GenerateCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
