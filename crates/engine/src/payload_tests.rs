// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_adapters::{ElementRect, ElementStyle, Viewport};
use std::collections::BTreeMap;

fn page(styles: usize, sheets: usize) -> ScrapedPage {
    let style = ElementStyle {
        tag: "div".into(),
        id: None,
        classes: Some("card".into()),
        rect: ElementRect { x: 0, y: 0, width: 100, height: 40 },
        styles: BTreeMap::from([("color".to_string(), "rgb(0, 0, 0)".to_string())]),
    };
    ScrapedPage {
        url: "https://example.com/".into(),
        title: "Example".into(),
        html: "<html></html>".into(),
        viewport: Viewport::default(),
        computed_styles: vec![style; styles],
        stylesheets: vec!["body { margin: 0 }".to_string(); sheets],
        screenshot: vec![0; 500_000],
    }
}

#[test]
fn small_page_is_untouched() {
    let mut p = page(200, 5);
    assert!(!degrade(&mut p, 100_000));
    assert_eq!(p.computed_styles.len(), 200);
}

#[test]
fn screenshot_does_not_count_toward_the_limit() {
    let p = page(0, 0);
    assert!(payload_size(&p) < 1_000);
}

#[test]
fn large_page_keeps_first_entries() {
    let mut p = page(2_000, 8);
    assert!(payload_size(&p) > 100_000);

    assert!(degrade(&mut p, 100_000));
    assert_eq!(p.computed_styles.len(), DEGRADED_STYLE_ENTRIES);
    assert_eq!(p.stylesheets.len(), DEGRADED_STYLESHEETS);
    assert_eq!(p.screenshot.len(), 500_000);
}
