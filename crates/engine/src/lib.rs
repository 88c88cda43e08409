// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-engine: replication pipeline, verification and crawl orchestration.

mod artifacts;
mod config;
mod crawl;
mod crawl_report;
mod error;
mod events;
mod gate;
mod job_logger;
mod payload;
mod report;
mod retry;
mod runner;
mod verifier;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use artifacts::{write_artifacts, ARTIFACT_SUBDIR};
pub use config::RunnerConfig;
pub use crawl::{CrawlRunner, SCREENSHOT_SUBDIR};
pub use crawl_report::{write_report, REPORT_FILE};
pub use error::RunnerError;
pub use events::EventBus;
pub use gate::{AdmissionGate, AdmissionPermit};
pub use job_logger::{JobLogger, JOB_LOG_FILE};
pub use payload::degrade;
pub use report::{diff_report, RegionHint, Verdict};
pub use retry::RetryPolicy;
pub use runner::Runner;
pub use verifier::{VerificationResult, Verifier};
