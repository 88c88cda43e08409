// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published while jobs run.
//!
//! Serializes with `{"type": "scope:name", ...fields}` format so a push
//! transport can forward them unchanged.

use crate::crawl::{CrawlJobId, CrawlStatus, RecordId, RecordStatus};
use crate::error::ErrorKind;
use crate::job::{CompletionOutcome, JobId, ReplicationStatus};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job:created")]
    JobCreated { id: JobId, source_url: String, output_dir: String },

    #[serde(rename = "job:status")]
    StatusChanged {
        id: JobId,
        from: ReplicationStatus,
        to: ReplicationStatus,
        current_iteration: u32,
    },

    #[serde(rename = "job:similarity")]
    SimilarityUpdated { id: JobId, iteration: u32, score: f64 },

    #[serde(rename = "job:artifacts")]
    ArtifactsWritten { id: JobId, dir: PathBuf },

    #[serde(rename = "job:completed")]
    JobCompleted {
        id: JobId,
        outcome: CompletionOutcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        similarity: Option<f64>,
    },

    #[serde(rename = "job:failed")]
    JobFailed { id: JobId, kind: ErrorKind, message: String },

    #[serde(rename = "crawl:status")]
    CrawlStatusChanged { id: CrawlJobId, status: CrawlStatus },

    #[serde(rename = "crawl:record")]
    RecordUpdated { id: CrawlJobId, record_id: RecordId, status: RecordStatus },

    #[serde(rename = "crawl:progress")]
    CrawlProgress { id: CrawlJobId, processed: usize, total: usize },
}

impl Event {
    /// The serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job:created",
            Event::StatusChanged { .. } => "job:status",
            Event::SimilarityUpdated { .. } => "job:similarity",
            Event::ArtifactsWritten { .. } => "job:artifacts",
            Event::JobCompleted { .. } => "job:completed",
            Event::JobFailed { .. } => "job:failed",
            Event::CrawlStatusChanged { .. } => "crawl:status",
            Event::RecordUpdated { .. } => "crawl:record",
            Event::CrawlProgress { .. } => "crawl:progress",
        }
    }

    /// One-line summary for log output.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::JobCreated { id, source_url, output_dir } => {
                format!("{t} id={id} url={source_url} dir={output_dir}")
            }
            Event::StatusChanged { id, from, to, .. } => format!("{t} id={id} {from}->{to}"),
            Event::SimilarityUpdated { id, iteration, score } => {
                format!("{t} id={id} iteration={iteration} score={score:.2}")
            }
            Event::ArtifactsWritten { id, dir } => format!("{t} id={id} dir={}", dir.display()),
            Event::JobCompleted { id, outcome, .. } => format!("{t} id={id} outcome={outcome}"),
            Event::JobFailed { id, kind, .. } => format!("{t} id={id} kind={kind}"),
            Event::CrawlStatusChanged { id, status } => format!("{t} id={id} status={status}"),
            Event::RecordUpdated { id, record_id, status } => {
                format!("{t} id={id} record={record_id} status={status}")
            }
            Event::CrawlProgress { id, processed, total } => {
                format!("{t} id={id} {processed}/{total}")
            }
        }
    }

    /// Replication job this event belongs to, if any.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Event::JobCreated { id, .. }
            | Event::StatusChanged { id, .. }
            | Event::SimilarityUpdated { id, .. }
            | Event::ArtifactsWritten { id, .. }
            | Event::JobCompleted { id, .. }
            | Event::JobFailed { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
