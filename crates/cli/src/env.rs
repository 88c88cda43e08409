// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Version string with the commit it was built from.
pub const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")");

/// Config file: `REPLICA_CONFIG`, else `./replica.toml` when present.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = non_empty("REPLICA_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from("replica.toml");
    local.is_file().then_some(local)
}

/// Root under which every job's output directory lives.
pub fn output_base() -> Option<PathBuf> {
    non_empty("REPLICA_OUTPUT_BASE").map(PathBuf::from)
}

/// Generator backend, `cli` or `api`.
pub fn provider() -> Option<String> {
    non_empty("REPLICA_PROVIDER")
}

/// API key: `REPLICA_API_KEY`, falling back to `ANTHROPIC_API_KEY`.
pub fn api_key() -> Option<String> {
    non_empty("REPLICA_API_KEY").or_else(|| non_empty("ANTHROPIC_API_KEY"))
}

/// Model CLI binary override.
pub fn cli_binary() -> Option<String> {
    non_empty("REPLICA_CLI_BINARY")
}

/// Chromium binary override.
pub fn chrome_path() -> Option<PathBuf> {
    non_empty("REPLICA_CHROME_PATH").map(PathBuf::from)
}

pub fn max_concurrent_jobs() -> Option<String> {
    non_empty("REPLICA_MAX_CONCURRENT_JOBS")
}

pub fn similarity_threshold() -> Option<String> {
    non_empty("REPLICA_SIMILARITY_THRESHOLD")
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}
