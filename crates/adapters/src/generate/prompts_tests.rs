// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::capture::{ElementRect, ElementStyle};
use std::collections::BTreeMap;

fn page() -> ScrapedPage {
    ScrapedPage {
        url: "https://example.com/".into(),
        title: "Example".into(),
        html: "<html><body>".to_string() + &"x".repeat(20_000),
        viewport: Viewport::default(),
        computed_styles: (0..80)
            .map(|i| ElementStyle {
                tag: format!("el{i}"),
                id: None,
                classes: None,
                rect: ElementRect { x: 0, y: 0, width: 1, height: 1 },
                styles: BTreeMap::new(),
            })
            .collect(),
        stylesheets: vec!["a".repeat(5000), "b{}".into(), "c{}".into(), "d{}".into()],
        screenshot: Vec::new(),
    }
}

#[test]
fn head_is_char_safe() {
    assert_eq!(head("日本語テキスト", 3), "日本語");
    assert_eq!(head("ab", 10), "ab");
}

#[test]
fn page_prompt_truncates_inputs() {
    let prompt = page_prompt(&page(), None);
    assert!(prompt.contains("URL: https://example.com/"));
    assert!(prompt.contains("Viewport size: 1366x768px"));
    assert!(prompt.contains("\"tag\": \"el49\""));
    assert!(!prompt.contains("\"tag\": \"el50\""));
    assert!(prompt.contains(&format!("{}\n---\nb{{}}\n---\nc{{}}", "a".repeat(2000))));
    assert!(!prompt.contains("d{}"));
    assert!(!prompt.contains(&"x".repeat(PAGE_HTML_CHARS)));
    assert!(prompt.ends_with(OUTPUT_FORMAT));
}

#[test]
fn page_prompt_lists_hints() {
    let hints = DesignHints { colors: vec!["#fff".into()], fonts: vec!["Roboto".into()] };
    let prompt = page_prompt(&page(), Some(&hints));
    assert!(prompt.contains("- Colours: #fff"));
    assert!(prompt.contains("- Fonts: Roboto"));
}

#[test]
fn empty_hints_are_omitted() {
    let prompt = image_prompt(Viewport::default(), Some(&DesignHints::default()), None);
    assert!(!prompt.contains("Design hints"));
    assert!(prompt.contains("1366px width"));
}

#[test]
fn image_prompt_names_file_when_given() {
    let prompt = image_prompt(Viewport::default(), None, Some(Path::new("/tmp/shot.png")));
    assert!(prompt.starts_with("The image at /tmp/shot.png"));
}

#[test]
fn refine_prompt_carries_score_report_and_truncated_code() {
    let current = ArtifactTriple {
        html: "h".repeat(6000),
        css: "c".repeat(4000),
        js: "j".repeat(3000),
    };
    let prompt = refine_prompt(&current, 87.5, "Region 1: x=0");
    assert!(prompt.contains("- Similarity: 87.5%"));
    assert!(prompt.contains("Region 1: x=0"));
    assert!(prompt.contains(&format!("```html\n{}\n```", "h".repeat(REFINE_HTML_CHARS))));
    assert!(prompt.contains(&format!("```css\n{}\n```", "c".repeat(REFINE_CSS_CHARS))));
    assert!(prompt.contains(&format!("```javascript\n{}\n```", "j".repeat(REFINE_JS_CHARS))));
}
