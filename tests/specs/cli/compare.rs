// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica compare` on screenshots written to disk.

use crate::prelude::*;

#[test]
fn identical_images_score_100() {
    let ws = Workspace::new();
    let a = ws.png("a.png", 50, 50, 0);
    let b = ws.png("b.png", 50, 50, 0);

    let run = cli()
        .args(&["compare", a.to_str().unwrap(), b.to_str().unwrap(), "-o", "json"])
        .passes();
    let json = run.stdout_json();
    assert_eq!(json["similarity"], 100.0);
    assert_eq!(json["diff_pixels"], 0);
    assert_eq!(json["regions"].as_array().unwrap().len(), 0);
    assert!(json["report"].as_str().unwrap().contains("High similarity"));
}

#[test]
fn differing_block_is_reported() {
    let ws = Workspace::new();
    let a = ws.png("a.png", 100, 100, 0);
    let b = ws.png("b.png", 100, 100, 20);

    cli()
        .args(&["compare", a.to_str().unwrap(), b.to_str().unwrap(), "--iteration", "2"])
        .passes()
        .stdout_has("Similarity: 96%")
        .stdout_has("1 regions")
        .stdout_has("iteration 2/3")
        .stdout_has("x=0, y=0, size=20x20px");
}

#[test]
fn comparison_is_symmetric() {
    let ws = Workspace::new();
    let a = ws.png("a.png", 80, 60, 0);
    let b = ws.png("b.png", 80, 60, 15);

    let forward = cli()
        .args(&["compare", a.to_str().unwrap(), b.to_str().unwrap(), "-o", "json"])
        .passes()
        .stdout_json();
    let backward = cli()
        .args(&["compare", b.to_str().unwrap(), a.to_str().unwrap(), "-o", "json"])
        .passes()
        .stdout_json();
    similar_asserts::assert_eq!(forward["similarity"], backward["similarity"]);
    similar_asserts::assert_eq!(forward["regions"], backward["regions"]);
}

#[test]
fn unreadable_image_fails() {
    let ws = Workspace::new();
    let a = ws.png("a.png", 10, 10, 0);
    let bogus = ws.path().join("bogus.png");
    std::fs::write(&bogus, b"not an image").unwrap();

    cli()
        .args(&["compare", a.to_str().unwrap(), bogus.to_str().unwrap()])
        .fails_with(1)
        .stderr_has("error:");
}
