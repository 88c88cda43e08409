// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration

use crate::retry::RetryPolicy;
use rp_adapters::Viewport;
use rp_core::MAX_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Knobs for the replication and crawl runners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Root under which every job's output directory is created.
    pub output_base: PathBuf,
    pub viewport: Viewport,
    /// Verification passes per job; at most [`MAX_ITERATIONS`].
    pub max_iterations: u32,
    /// Similarity (percent) at which the loop stops early.
    pub similarity_threshold: f64,
    /// Jobs allowed through the admission gate at once.
    pub max_concurrent_jobs: usize,
    pub retry: RetryPolicy,
    /// Serialized page size above which styles and sheets are trimmed.
    pub payload_limit: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output_base: PathBuf::from("./output"),
            viewport: Viewport::default(),
            max_iterations: MAX_ITERATIONS,
            similarity_threshold: 95.0,
            max_concurrent_jobs: 2,
            retry: RetryPolicy::default(),
            payload_limit: 100_000,
        }
    }
}

impl RunnerConfig {
    rp_core::setters! {
        into { output_base: PathBuf }
        set {
            viewport: Viewport,
            max_iterations: u32,
            similarity_threshold: f64,
            max_concurrent_jobs: usize,
            retry: RetryPolicy,
            payload_limit: usize,
        }
    }

    /// `max_iterations` clamped to what the status machine can represent.
    pub fn iteration_limit(&self) -> u32 {
        self.max_iterations.clamp(1, MAX_ITERATIONS)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
