// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica.toml` loading and environment overrides.

use crate::env;
use rp_adapters::{BrowserSettings, CrawlSettings, GeneratorSettings, Provider};
use rp_engine::RunnerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Everything the commands need, one table per concern:
///
/// ```toml
/// [runner]
/// output_base = "./output"
/// max_concurrent_jobs = 2
///
/// [generator]
/// provider = "api"
///
/// [crawl]
/// listing_base = "https://example.com/category/all/"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub generator: GeneratorSettings,
    pub crawl: CrawlSettings,
    /// Chromium binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
}

impl AppConfig {
    /// Defaults, then the file (if any), then `REPLICA_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(base) = env::output_base() {
            self.runner.output_base = base;
        }
        if let Some(value) = env::provider() {
            self.generator.provider = match value.as_str() {
                "cli" => Provider::Cli,
                "api" => Provider::Api,
                _ => return Err(ConfigError::InvalidEnv { var: "REPLICA_PROVIDER", value }),
            };
        }
        if let Some(key) = env::api_key() {
            self.generator.api_key = Some(key);
        }
        if let Some(binary) = env::cli_binary() {
            self.generator.cli_binary = binary;
        }
        if let Some(path) = env::chrome_path() {
            self.chrome_path = Some(path);
        }
        if let Some(value) = env::max_concurrent_jobs() {
            self.runner.max_concurrent_jobs = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "REPLICA_MAX_CONCURRENT_JOBS", value })?;
        }
        if let Some(value) = env::similarity_threshold() {
            self.runner.similarity_threshold = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "REPLICA_SIMILARITY_THRESHOLD", value })?;
        }
        Ok(())
    }

    /// Browser settings shared by capture and crawl.
    pub fn browser(&self) -> BrowserSettings {
        BrowserSettings {
            viewport: self.runner.viewport,
            chrome_path: self.chrome_path.clone(),
            ..BrowserSettings::default()
        }
    }

    /// Generator settings rendering at the runner's viewport.
    pub fn generator(&self) -> GeneratorSettings {
        GeneratorSettings { viewport: self.runner.viewport, ..self.generator.clone() }
    }

    pub fn crawl(&self) -> CrawlSettings {
        CrawlSettings { browser: self.browser(), ..self.crawl.clone() }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
