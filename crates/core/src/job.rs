// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication job record and its status machine.

use crate::artifact::{CSS_FILENAME, HTML_FILENAME, JS_FILENAME};
use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on verification passes per job. The status enum carries one
/// `Verifying` state per pass, so this cannot be raised without new variants.
pub const MAX_ITERATIONS: u32 = 3;

crate::define_id! {
    /// Unique identifier for a replication job.
    pub struct JobId("rpl-");
}

/// Stage a replication job is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationStatus {
    Pending,
    Scraping,
    Generating,
    #[serde(rename = "verifying_1")]
    Verifying1,
    #[serde(rename = "verifying_2")]
    Verifying2,
    #[serde(rename = "verifying_3")]
    Verifying3,
    Completed,
    Failed,
}

crate::simple_display! {
    ReplicationStatus {
        Pending => "pending",
        Scraping => "scraping",
        Generating => "generating",
        Verifying1 => "verifying_1",
        Verifying2 => "verifying_2",
        Verifying3 => "verifying_3",
        Completed => "completed",
        Failed => "failed",
    }
}

impl ReplicationStatus {
    /// The `Verifying` state for a 1-based iteration, if one exists.
    pub fn verifying(iteration: u32) -> Option<Self> {
        match iteration {
            1 => Some(Self::Verifying1),
            2 => Some(Self::Verifying2),
            3 => Some(Self::Verifying3),
            _ => None,
        }
    }

    /// Iteration number carried by a `Verifying` state.
    pub fn iteration(self) -> Option<u32> {
        match self {
            Self::Verifying1 => Some(1),
            Self::Verifying2 => Some(2),
            Self::Verifying3 => Some(3),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is an edge of the status machine.
    ///
    /// `Completed -> Generating` exists only for on-demand refinement of a
    /// finished job; `Failed` has no outgoing edges.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ReplicationStatus::*;
        match (self, next) {
            (Failed, _) | (Completed, Failed) => false,
            (_, Failed) => true,
            (Pending, Scraping | Generating) => true,
            (Scraping, Generating) => true,
            (Generating, next) => next.iteration().is_some(),
            (Completed, Generating) => true,
            (current, Generating) => current.iteration().is_some_and(|k| k < MAX_ITERATIONS),
            (current, Completed) => current.iteration().is_some(),
            _ => false,
        }
    }
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: ReplicationStatus,
    pub to: ReplicationStatus,
}

/// How a `Completed` job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// A verification pass reached the similarity threshold.
    ThresholdMet,
    /// The iteration budget ran out below the threshold.
    BelowThreshold,
}

crate::simple_display! {
    CompletionOutcome {
        ThresholdMet => "threshold_met",
        BelowThreshold => "below_threshold",
    }
}

/// Input the first generation works from, chosen once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    FromUrl,
    FromImage(PathBuf),
}

impl GenerationMode {
    /// Image mode when a reference image is given and present on disk.
    pub fn select(image_ref: Option<&Path>) -> Self {
        match image_ref {
            Some(path) if path.is_file() => Self::FromImage(path.to_path_buf()),
            _ => Self::FromUrl,
        }
    }
}

/// A replication job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationJob {
    pub id: JobId,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<PathBuf>,
    pub status: ReplicationStatus,
    /// Last verification pass entered (0 before the first).
    pub current_iteration: u32,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    /// Single path segment under the output base.
    pub output_dir: String,
    #[serde(default)]
    pub html_filename: Option<String>,
    #[serde(default)]
    pub css_filename: Option<String>,
    #[serde(default)]
    pub js_filename: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CompletionOutcome>,
    /// On-demand refinement passes run after completion.
    #[serde(default)]
    pub extra_refinements: u32,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl ReplicationJob {
    pub fn new(
        source_url: impl Into<String>,
        output_dir: impl Into<String>,
        image_ref: Option<PathBuf>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.epoch_ms();
        Self {
            id: JobId::new(),
            source_url: source_url.into(),
            image_ref,
            status: ReplicationStatus::Pending,
            current_iteration: 0,
            similarity_score: None,
            output_dir: output_dir.into(),
            html_filename: None,
            css_filename: None,
            js_filename: None,
            error_message: None,
            outcome: None,
            extra_refinements: 0,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `next`, returning the previous status.
    ///
    /// Entering a `Verifying` state records its iteration. Only the next
    /// iteration may be entered, except that an on-demand refinement
    /// re-verifies the current one; the count never goes down.
    pub fn advance(
        &mut self,
        next: ReplicationStatus,
        epoch_ms: u64,
    ) -> Result<ReplicationStatus, TransitionError> {
        let from = self.status;
        if !from.can_transition_to(next) || !self.accepts_iteration(next) {
            return Err(TransitionError { from, to: next });
        }
        if let Some(k) = next.iteration() {
            self.current_iteration = k;
        }
        if next != ReplicationStatus::Completed {
            self.outcome = None;
        }
        self.status = next;
        self.updated_at_ms = epoch_ms;
        Ok(from)
    }

    fn accepts_iteration(&self, next: ReplicationStatus) -> bool {
        match next.iteration() {
            Some(k) if k == self.current_iteration + 1 => true,
            Some(k) => k == self.current_iteration && self.extra_refinements > 0,
            None => true,
        }
    }

    pub fn complete(
        &mut self,
        outcome: CompletionOutcome,
        epoch_ms: u64,
    ) -> Result<ReplicationStatus, TransitionError> {
        let from = self.advance(ReplicationStatus::Completed, epoch_ms)?;
        self.outcome = Some(outcome);
        Ok(from)
    }

    pub fn fail(
        &mut self,
        message: impl Into<String>,
        epoch_ms: u64,
    ) -> Result<ReplicationStatus, TransitionError> {
        let from = self.advance(ReplicationStatus::Failed, epoch_ms)?;
        self.error_message = Some(message.into());
        Ok(from)
    }

    pub fn record_similarity(&mut self, score: f64, epoch_ms: u64) {
        self.similarity_score = Some(score);
        self.updated_at_ms = epoch_ms;
    }

    pub fn record_artifacts(&mut self, epoch_ms: u64) {
        self.html_filename = Some(HTML_FILENAME.to_string());
        self.css_filename = Some(CSS_FILENAME.to_string());
        self.js_filename = Some(JS_FILENAME.to_string());
        self.updated_at_ms = epoch_ms;
    }
}

crate::builder! {
    pub struct ReplicationJobBuilder => ReplicationJob {
        into {
            id: JobId = "rpl-test",
            source_url: String = "https://example.com/",
            output_dir: String = "site_a",
        }
        set {
            status: ReplicationStatus = ReplicationStatus::Pending,
            current_iteration: u32 = 0,
            similarity_score: Option<f64> = None,
            outcome: Option<CompletionOutcome> = None,
            extra_refinements: u32 = 0,
            created_at_ms: u64 = 1_000_000,
            updated_at_ms: u64 = 1_000_000,
        }
        option {
            image_ref: PathBuf = None,
            html_filename: String = None,
            css_filename: String = None,
            js_filename: String = None,
            error_message: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
