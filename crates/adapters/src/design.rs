// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Colour and font hints extracted from markup or a screenshot.

use image::DynamicImage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

const MAX_COLORS: usize = 5;
const MAX_FONTS: usize = 3;
const THUMBNAIL_EDGE: u32 = 150;

const GENERIC_FAMILIES: &[&str] = &["sans-serif", "serif", "monospace", "inherit"];

#[allow(clippy::expect_used)]
static HEX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9a-fA-F]+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static FONT_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"font-family:\s*([^;]+);").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignHints {
    /// Lowercase `#rgb`/`#rrggbb`, most frequent first.
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
}

impl DesignHints {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.fonts.is_empty()
    }
}

/// Most frequent first; ties keep first-seen order.
fn by_frequency<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }
    order.sort_by_key(|c| std::cmp::Reverse(counts.get(c).copied().unwrap_or(0)));
    order
}

/// Hex colours and font families declared in HTML/CSS text.
pub fn hints_from_html(content: &str) -> DesignHints {
    // A run of hex digits counts only when it is exactly 3 or 6 long.
    let colors = HEX_RUN
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .filter(|m| matches!(m.as_str().len(), 3 | 6))
        .map(|m| format!("#{}", m.as_str().to_lowercase()));
    let mut colors = by_frequency(colors);
    colors.truncate(MAX_COLORS);

    let mut fonts: Vec<String> = Vec::new();
    for cap in FONT_FAMILY.captures_iter(content) {
        let Some(list) = cap.get(1) else { continue };
        for family in list.as_str().split(',') {
            let family = family.trim().trim_matches(|c| c == '"' || c == '\'');
            if family.is_empty() || GENERIC_FAMILIES.contains(&family.to_lowercase().as_str()) {
                continue;
            }
            if !fonts.iter().any(|f| f == family) {
                fonts.push(family.to_string());
            }
        }
    }
    fonts.truncate(MAX_FONTS);

    DesignHints { colors, fonts }
}

/// Dominant colours of a screenshot or mockup. Fonts are never inferred.
pub fn hints_from_image(image: &DynamicImage) -> DesignHints {
    let thumb = image.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgb8();
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
    for pixel in thumb.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
    }
    let mut ranked: Vec<([u8; 3], usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let colors = ranked
        .into_iter()
        .take(MAX_COLORS)
        .map(|([r, g, b], _)| format!("#{r:02x}{g:02x}{b:02x}"))
        .collect();
    DesignHints { colors, fonts: Vec::new() }
}

#[cfg(test)]
#[path = "design_tests.rs"]
mod tests;
