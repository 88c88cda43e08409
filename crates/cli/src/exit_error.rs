// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit codes for `main()`.

/// A job or crawl finished in a failed state.
pub const JOB_FAILED: i32 = 1;

/// Arguments were rejected before any work started.
pub const INVALID_INPUT: i32 = 2;

/// Error that chooses the process exit code; anything else exits 1.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}
