// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Visual verification of a generated page against its source.

use crate::report::diff_report;
use crate::retry::RetryPolicy;
use rp_adapters::{CaptureAdapter, CaptureError, CaptureTarget};
use rp_compare::{Comparison, DiffRegion};
use rp_core::ReplicationError;
use std::path::Path;

/// Outcome of one verification pass.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// 0–100, two decimals.
    pub similarity: f64,
    pub regions: Vec<DiffRegion>,
    pub diff_pixels: u64,
    /// Compared size.
    pub width: u32,
    pub height: u32,
    pub source_png: Vec<u8>,
    pub candidate_png: Vec<u8>,
    pub report: String,
}

/// Screenshots both pages and compares them.
///
/// Never touches job state; the caller records the result.
#[derive(Clone)]
pub struct Verifier<C> {
    capture: C,
    max_iterations: u32,
    retry: RetryPolicy,
}

impl<C: CaptureAdapter> Verifier<C> {
    pub fn new(capture: C, max_iterations: u32, retry: RetryPolicy) -> Self {
        Self { capture, max_iterations, retry }
    }

    pub async fn verify(
        &self,
        source_url: &str,
        generated_html: &Path,
        iteration: u32,
    ) -> Result<VerificationResult, ReplicationError> {
        if !generated_html.is_file() {
            return Err(ReplicationError::Verification(format!(
                "Generated HTML not found: {}",
                generated_html.display()
            )));
        }
        tracing::info!(
            source_url,
            generated = %generated_html.display(),
            iteration,
            "verifying generated page"
        );

        let source = self
            .screenshot(CaptureTarget::Url(source_url.to_string()))
            .await
            .map_err(|e| ReplicationError::Verification(format!("Failed to capture URL screenshot: {e}")))?;
        let candidate = self
            .screenshot(CaptureTarget::File(generated_html.to_path_buf()))
            .await
            .map_err(|e| {
                ReplicationError::Verification(format!("Failed to capture file screenshot: {e}"))
            })?;

        let (cmp, source_png, candidate_png) = tokio::task::spawn_blocking(move || {
            let cmp = rp_compare::compare(&source, &candidate);
            (cmp, source, candidate)
        })
        .await
        .map_err(|e| ReplicationError::Unexpected(format!("comparison task failed: {e}")))?;
        let cmp: Comparison = cmp.map_err(|e| ReplicationError::Verification(e.to_string()))?;

        tracing::info!(
            iteration,
            similarity = cmp.similarity,
            diff_pixels = cmp.diff_pixels,
            regions = cmp.regions.len(),
            "comparison finished"
        );

        let report = diff_report(&cmp, iteration, self.max_iterations);
        Ok(VerificationResult {
            similarity: cmp.similarity,
            regions: cmp.regions,
            diff_pixels: cmp.diff_pixels,
            width: cmp.width,
            height: cmp.height,
            source_png,
            candidate_png,
            report,
        })
    }

    async fn screenshot(&self, target: CaptureTarget) -> Result<Vec<u8>, CaptureError> {
        let label = format!("screenshot {target}");
        self.retry
            .run(&label, || self.capture.screenshot(&target), CaptureError::is_retryable)
            .await
    }
}

#[cfg(test)]
#[path = "verifier_tests.rs"]
mod tests;
