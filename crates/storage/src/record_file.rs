// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned JSON record files.
//!
//! Each record is wrapped in an envelope carrying a schema version and the
//! time it was saved. Writes go to a sibling temp file that is renamed over
//! the target, so a crash never leaves a half-written record behind.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current record schema version
pub const CURRENT_RECORD_VERSION: u32 = 1;

const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported record version {found} (newest known is {CURRENT_RECORD_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("not found: {0}")]
    NotFound(String),
}

/// On-disk wrapper around a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "v")]
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub record: T,
}

/// Write `record` to `path`, creating parent directories as needed.
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let envelope = Envelope { version: CURRENT_RECORD_VERSION, saved_at: Utc::now(), record };
    let bytes = serde_json::to_vec_pretty(&envelope)?;

    let tmp = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read the record stored at `path`.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
        _ => StoreError::Io(e),
    })?;
    let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
    if envelope.version > CURRENT_RECORD_VERSION {
        return Err(StoreError::UnsupportedVersion { found: envelope.version });
    }
    Ok(envelope.record)
}

/// Move an unreadable record aside, returning where it went.
pub fn quarantine(path: &Path) -> Result<PathBuf, StoreError> {
    let bak = rotate_bak_path(path);
    fs::rename(path, &bak)?;
    tracing::warn!(from = %path.display(), to = %bak.display(), "moved unreadable record aside");
    Ok(bak)
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "record_file_tests.rs"]
mod tests;
