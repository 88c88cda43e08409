// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-core: job model, status machine, events and errors shared by the
//! replica workspace.

pub mod macros;

pub mod artifact;
pub mod clock;
pub mod crawl;
pub mod error;
pub mod event;
pub mod filename;
pub mod id;
pub mod job;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{ArtifactError, ArtifactTriple};
pub use clock::{Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use crawl::CrawlRecordBuilder;
pub use crawl::{CrawlJob, CrawlJobId, CrawlRecord, CrawlStatus, RecordId, RecordStatus};
pub use error::{ErrorKind, ReplicationError};
pub use event::Event;
pub use filename::{
    sanitize_filename, unique_filename, validate_output_dir, FilenameError, OutputDirError,
};
#[cfg(any(test, feature = "test-support"))]
pub use job::ReplicationJobBuilder;
pub use job::{
    CompletionOutcome, GenerationMode, JobId, ReplicationJob, ReplicationStatus, TransitionError,
    MAX_ITERATIONS,
};
