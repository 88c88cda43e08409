// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-storage: on-disk metadata records for replication and crawl jobs.

mod record_file;
mod store;

pub use record_file::{
    quarantine, read_record, write_record, Envelope, StoreError, CURRENT_RECORD_VERSION,
};
pub use store::{CrawlStore, JobStore, RecordStore, StoredRecord, CRAWL_RECORD_FILE, JOB_RECORD_FILE};
