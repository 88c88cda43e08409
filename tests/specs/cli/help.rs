// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("replicate")
        .stdout_has("refine")
        .stdout_has("compare")
        .stdout_has("crawl");
}

#[test]
fn replicate_help_shows_options() {
    cli()
        .args(&["replicate", "--help"])
        .passes()
        .stdout_has("--output-dir")
        .stdout_has("--image");
}

#[test]
fn version_shows_package_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}
