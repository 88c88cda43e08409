// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writing generated pages to disk.

use rp_core::artifact::{CSS_FILENAME, HTML_FILENAME, JS_FILENAME};
use rp_core::ArtifactTriple;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of a job's output directory holding the generated page.
pub const ARTIFACT_SUBDIR: &str = "replicated";

/// Write (or overwrite) `index.html`, `styles.css` and `script.js` into
/// `<job_dir>/replicated/`, returning the HTML path.
///
/// The HTML gets stylesheet and script references if it lacks them.
pub fn write_artifacts(job_dir: &Path, triple: &ArtifactTriple) -> std::io::Result<PathBuf> {
    let dir = job_dir.join(ARTIFACT_SUBDIR);
    fs::create_dir_all(&dir)?;
    let html = dir.join(HTML_FILENAME);
    fs::write(&html, triple.linked_html())?;
    fs::write(dir.join(CSS_FILENAME), &triple.css)?;
    fs::write(dir.join(JS_FILENAME), &triple.js)?;
    tracing::debug!(dir = %dir.display(), "artifacts written");
    Ok(html)
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
