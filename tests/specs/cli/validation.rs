// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arguments rejected before any page is loaded.

use crate::prelude::*;

#[test]
fn non_http_url_is_rejected() {
    let ws = Workspace::new();
    cli()
        .current_dir(ws.path())
        .args(&["replicate", "ftp://example.com/", "--output-dir", "site_a"])
        .args(&["--output-base", ws.path().to_str().unwrap()])
        .fails_with(2)
        .stderr_has("http(s) URL");
    assert!(!ws.path().join("site_a").exists());
}

#[test]
fn unsafe_output_dir_is_rejected() {
    let ws = Workspace::new();
    cli()
        .current_dir(ws.path())
        .args(&["replicate", "https://example.com/", "--output-dir", "../escape"])
        .args(&["--output-base", ws.path().to_str().unwrap()])
        .fails_with(2)
        .stderr_has("output directory");
}

#[test]
fn reversed_page_range_is_rejected() {
    let ws = Workspace::new();
    cli()
        .current_dir(ws.path())
        .args(&["crawl", "--start-page", "5", "--end-page", "2", "--output-dir", "crawl_a"])
        .args(&["--output-base", ws.path().to_str().unwrap()])
        .fails_with(2)
        .stderr_has("end_page");
}

#[test]
fn refine_of_unknown_directory_fails() {
    let ws = Workspace::new();
    cli()
        .current_dir(ws.path())
        .args(&["refine", "missing_site", "--output-base", ws.path().to_str().unwrap()])
        .fails_with(1)
        .stderr_has("error:");
}

#[test]
fn bad_config_file_is_reported() {
    let ws = Workspace::new();
    let config = ws.path().join("replica.toml");
    std::fs::write(&config, "[runner\n").unwrap();
    cli()
        .current_dir(ws.path())
        .args(&["replicate", "https://example.com/", "--output-dir", "site_a"])
        .args(&["--config", config.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("invalid config");
}
