// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job activity logs.

use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Activity log of a job, relative to its output directory.
pub const JOB_LOG_FILE: &str = "replication.log";

/// Writes human-readable timestamped lines to
/// `<output_base>/<output_dir>/replication.log`.
///
/// Each `append()` call opens, writes, and closes the file.
#[derive(Clone)]
pub struct JobLogger {
    output_base: PathBuf,
}

impl JobLogger {
    pub fn new(output_base: PathBuf) -> Self {
        Self { output_base }
    }

    pub fn log_path(&self, output_dir: &str) -> PathBuf {
        self.output_base.join(output_dir).join(JOB_LOG_FILE)
    }

    /// Append a line for a job.
    ///
    /// Format: `2026-01-30T08:14:09Z [stage] message`
    ///
    /// Failures are logged via tracing and never propagate.
    pub fn append(&self, output_dir: &str, stage: &str, message: &str) {
        let path = self.log_path(output_dir);
        if let Err(e) = write_line(&path, stage, message) {
            tracing::warn!(output_dir, error = %e, "failed to write job log");
        }
    }

    /// Append a fenced multi-line block, e.g. a diff report.
    pub fn append_fenced(&self, output_dir: &str, stage: &str, label: &str, content: &str) {
        let path = self.log_path(output_dir);
        if let Err(e) = write_fenced(&path, stage, label, content) {
            tracing::warn!(output_dir, error = %e, "failed to write job log");
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn open(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_line(path: &Path, stage: &str, message: &str) -> std::io::Result<()> {
    let mut file = open(path)?;
    writeln!(file, "{} [{}] {}", timestamp(), stage, message)
}

fn write_fenced(path: &Path, stage: &str, label: &str, content: &str) -> std::io::Result<()> {
    let mut file = open(path)?;
    writeln!(file, "{} [{}] ```{}", timestamp(), stage, label)?;
    write!(file, "{}", content)?;
    if !content.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{} [{}] ```", timestamp(), stage)
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
