// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner API errors

use rp_core::{CrawlJobId, CrawlStatus, JobId, RecordId, RecordStatus, ReplicationStatus};
use rp_storage::StoreError;
use thiserror::Error;

/// Misuse of the runner API. Pipeline failures are recorded on the job
/// instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("crawl job not found: {0}")]
    CrawlNotFound(CrawlJobId),

    #[error("record {record} not found in crawl {crawl}")]
    RecordNotFound { crawl: CrawlJobId, record: RecordId },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("job {id} is {status}; expected {expected}")]
    WrongStatus { id: JobId, status: ReplicationStatus, expected: ReplicationStatus },

    #[error("job {0} has already been started")]
    AlreadyStarted(JobId),

    #[error("crawl {id} is {status}")]
    CrawlWrongStatus { id: CrawlJobId, status: CrawlStatus },

    #[error("record {id} is {status}; only failed or skipped records can be retried")]
    RecordWrongStatus { id: RecordId, status: RecordStatus },

    #[error("admission gate closed")]
    GateClosed,

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("report error: {0}")]
    Report(String),
}
