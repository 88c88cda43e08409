// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with a hard wall-clock limit.

use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{label} could not be started: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{label} I/O failed: {source}")]
    Io {
        label: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{label} timed out after {secs}s")]
    TimedOut { label: String, secs: u64 },
}

/// Run `cmd` to completion, feeding `stdin` and capturing stdout/stderr.
///
/// The child is spawned with `kill_on_drop`, so when `timeout` elapses the
/// in-flight future is dropped and the process is killed before the
/// `TimedOut` error is returned.
pub async fn run_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    label: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child =
        cmd.spawn().map_err(|source| SubprocessError::Spawn { label: label.to_string(), source })?;

    let io_err = |source| SubprocessError::Io { label: label.to_string(), source };
    let run = async {
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input).await.map_err(io_err)?;
            pipe.shutdown().await.map_err(io_err)?;
        }
        child.wait_with_output().await.map_err(io_err)
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(label, secs = timeout.as_secs(), "subprocess timed out, killed");
            Err(SubprocessError::TimedOut { label: label.to_string(), secs: timeout.as_secs() })
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
