// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::ArtifactError;

const TRIPLE: &str = r#"{"html": "<p>hi</p>", "css": "p{}", "js": ""}"#;

fn expected() -> ArtifactTriple {
    ArtifactTriple { html: "<p>hi</p>".into(), css: "p{}".into(), js: String::new() }
}

#[yare::parameterized(
    bare = { TRIPLE.to_string() },
    json_fence = { format!("Here you go:\n```json\n{TRIPLE}\n```\nEnjoy.") },
    plain_fence = { format!("```\n{TRIPLE}\n```") },
    surrounded_by_prose = { format!("Sure! {TRIPLE} Let me know.") },
)]
fn extracts_triple(text: String) {
    assert_eq!(parse_triple(&text).unwrap(), expected());
}

#[test]
fn json_fence_wins_over_earlier_plain_fence() {
    let text = format!("```html\n<p>x</p>\n```\n```json\n{TRIPLE}\n```");
    assert_eq!(parse_triple(&text).unwrap(), expected());
}

#[test]
fn truncated_fence_is_repaired() {
    let text = "```json\n{\n  \"html\": \"<div>\\n  <p>a \\\"b\\\"</p>\\n</div>\",\n  \"css\": \"body { color: red; }\",\n  \"js\": \"console.log(1)";
    let triple = parse_triple(text).unwrap();
    assert_eq!(triple.html, "<div>\n  <p>a \"b\"</p>\n</div>");
    assert_eq!(triple.css, "body { color: red; }");
    assert_eq!(triple.js, "console.log(1)");
}

#[test]
fn truncated_without_fence_is_repaired_from_first_brace() {
    let text = "result: {\"html\": \"<h1>T</h1>\", \"css\": \"h1{}\", \"js\": \"let a = 1;";
    let triple = parse_triple(text).unwrap();
    assert_eq!(triple.js, "let a = 1;");
}

#[test]
fn missing_css_is_named() {
    let err = parse_triple(r#"{"html": "<p></p>", "js": ""}"#).unwrap_err();
    assert!(matches!(err, GenerateError::Artifact(ArtifactError::MissingField("css"))));
    assert!(err.to_string().contains("css"));
}

#[test]
fn repair_missing_key_is_still_rejected() {
    let text = "```json\n{\"html\": \"<p>cut";
    let err = parse_triple(text).unwrap_err();
    assert!(matches!(err, GenerateError::Artifact(ArtifactError::MissingField("css"))));
}

#[test]
fn prose_only_is_an_extraction_error_with_preview() {
    let text = "I cannot help with that.";
    match parse_triple(text).unwrap_err() {
        GenerateError::Extract(preview) => assert_eq!(preview, text),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn preview_is_capped() {
    let text = "x".repeat(2000);
    match parse_triple(&text).unwrap_err() {
        GenerateError::Extract(preview) => assert_eq!(preview.len(), PREVIEW_CHARS),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn string_reader_handles_escapes_and_end_of_input() {
    assert_eq!(read_string_value(r#"a\tb\\c" tail"#).as_deref(), Some("a\tb\\c"));
    assert_eq!(read_string_value("open ended").as_deref(), Some("open ended"));
    assert_eq!(read_string_value(""), None);
}
