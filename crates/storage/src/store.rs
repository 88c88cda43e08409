// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job tables mirrored to one record file per output directory.

use crate::record_file::{quarantine, read_record, write_record, StoreError};
use parking_lot::Mutex;
use rp_core::{CrawlJob, CrawlJobId, JobId, ReplicationJob};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Metadata record of a replication job, relative to its output directory.
pub const JOB_RECORD_FILE: &str = "replication.json";

/// Metadata record of a crawl job, relative to its output directory.
pub const CRAWL_RECORD_FILE: &str = "crawl.json";

/// A job record that lives in its own output directory.
pub trait StoredRecord: Clone + Serialize + DeserializeOwned + Send + 'static {
    type Id: Clone + Eq + Hash + std::fmt::Display + Send + Sync + 'static;

    /// File name of the record inside the output directory.
    const FILE_NAME: &'static str;

    fn record_id(&self) -> &Self::Id;
    fn output_dir(&self) -> &str;
    fn created_at_ms(&self) -> u64;
}

impl StoredRecord for ReplicationJob {
    type Id = JobId;
    const FILE_NAME: &'static str = JOB_RECORD_FILE;

    fn record_id(&self) -> &JobId {
        &self.id
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

impl StoredRecord for CrawlJob {
    type Id = CrawlJobId;
    const FILE_NAME: &'static str = CRAWL_RECORD_FILE;

    fn record_id(&self) -> &CrawlJobId {
        &self.id
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

/// Shared table of records, written through to disk on every change.
///
/// Clones share the same table.
pub struct RecordStore<T: StoredRecord> {
    output_base: PathBuf,
    records: Arc<Mutex<HashMap<T::Id, T>>>,
}

impl<T: StoredRecord> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self { output_base: self.output_base.clone(), records: Arc::clone(&self.records) }
    }
}

pub type JobStore = RecordStore<ReplicationJob>;
pub type CrawlStore = RecordStore<CrawlJob>;

impl<T: StoredRecord> RecordStore<T> {
    pub fn new(output_base: impl Into<PathBuf>) -> Self {
        Self { output_base: output_base.into(), records: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    /// `<output_base>/<output_dir>`
    pub fn dir_for(&self, output_dir: &str) -> PathBuf {
        self.output_base.join(output_dir)
    }

    pub fn record_path(&self, output_dir: &str) -> PathBuf {
        self.dir_for(output_dir).join(T::FILE_NAME)
    }

    /// Persist and register a new record.
    pub fn insert(&self, record: T) -> Result<(), StoreError> {
        write_record(&self.record_path(record.output_dir()), &record)?;
        self.records.lock().insert(record.record_id().clone(), record);
        Ok(())
    }

    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.records.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.records.lock().contains_key(id)
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<T> {
        let mut all: Vec<T> = self.records.lock().values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at_ms()
                .cmp(&b.created_at_ms())
                .then_with(|| a.record_id().to_string().cmp(&b.record_id().to_string()))
        });
        all
    }

    /// Whether any registered record already uses `output_dir`.
    pub fn dir_in_use(&self, output_dir: &str) -> bool {
        self.records.lock().values().any(|r| r.output_dir() == output_dir)
    }

    /// Apply `f` to the record and write the result through.
    ///
    /// The in-memory change stands even when the write fails; the error is
    /// still returned so the caller can decide what it means.
    pub fn update<R>(&self, id: &T::Id, f: impl FnOnce(&mut T) -> R) -> Result<(R, T), StoreError> {
        let (out, snapshot) = {
            let mut records = self.records.lock();
            let record = records.get_mut(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let out = f(record);
            (out, record.clone())
        };
        write_record(&self.record_path(snapshot.output_dir()), &snapshot)?;
        Ok((out, snapshot))
    }

    /// Load the record stored under `output_dir` and register it.
    ///
    /// A record already registered under the same id wins over the file.
    /// Unreadable files are moved aside before the error is returned.
    pub fn load(&self, output_dir: &str) -> Result<T, StoreError> {
        let path = self.record_path(output_dir);
        let record: T = match read_record(&path) {
            Ok(record) => record,
            Err(StoreError::Json(e)) => {
                quarantine(&path)?;
                return Err(StoreError::Json(e));
            }
            Err(e) => return Err(e),
        };
        let mut records = self.records.lock();
        let entry = records.entry(record.record_id().clone()).or_insert(record);
        tracing::debug!(id = %entry.record_id(), path = %path.display(), "loaded record");
        Ok(entry.clone())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
