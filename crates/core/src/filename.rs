// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File and directory name hygiene for job output.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest sanitized name, in characters.
pub const MAX_FILENAME_CHARS: usize = 100;

/// Highest numeric suffix tried by [`unique_filename`].
pub const MAX_DUPLICATE_SUFFIX: u32 = 999;

#[allow(clippy::expect_used)]
static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()（）\[\]【】]").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static OUTPUT_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("constant regex pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("too many duplicates for filename: {0}")]
pub struct FilenameError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("output directory must match [A-Za-z0-9_-]+, got '{0}'")]
pub struct OutputDirError(pub String);

/// Turn a free-form name (e.g. a shop name) into a portable file stem.
///
/// Strips characters forbidden on common filesystems, turns whitespace runs
/// into `_`, drops brackets, collapses repeated `_`, and trims `_`/`.` from
/// both ends. Empty results become `unnamed`.
pub fn sanitize_filename(name: &str) -> String {
    let name = FORBIDDEN.replace_all(name, "");
    let name = WHITESPACE.replace_all(&name, "_");
    let name = BRACKETS.replace_all(&name, "");
    let name = UNDERSCORES.replace_all(&name, "_");
    let name = name.trim_matches(|c| c == '_' || c == '.');
    if name.is_empty() {
        return "unnamed".to_string();
    }
    if name.chars().count() > MAX_FILENAME_CHARS {
        let cut: String = name.chars().take(MAX_FILENAME_CHARS).collect();
        return cut.trim_end_matches(|c| c == '_' || c == '.').to_string();
    }
    name.to_string()
}

/// `base` if unused, else the first free `base_001` .. `base_999`.
pub fn unique_filename(base: &str, existing: &HashSet<String>) -> Result<String, FilenameError> {
    if !existing.contains(base) {
        return Ok(base.to_string());
    }
    (1..=MAX_DUPLICATE_SUFFIX)
        .map(|n| format!("{base}_{n:03}"))
        .find(|candidate| !existing.contains(candidate))
        .ok_or_else(|| FilenameError(base.to_string()))
}

/// Accept only a single safe path segment.
pub fn validate_output_dir(dir: &str) -> Result<(), OutputDirError> {
    if OUTPUT_DIR.is_match(dir) {
        Ok(())
    } else {
        Err(OutputDirError(dir.to_string()))
    }
}

#[cfg(test)]
#[path = "filename_tests.rs"]
mod tests;
