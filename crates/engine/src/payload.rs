// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shrinking oversized scrape results before generation.

use rp_adapters::ScrapedPage;

/// Computed-style entries kept on a degraded page.
pub const DEGRADED_STYLE_ENTRIES: usize = 100;

/// Stylesheets kept on a degraded page.
pub const DEGRADED_STYLESHEETS: usize = 5;

/// Serialized size of `page`, screenshot excluded.
pub(crate) fn payload_size(page: &ScrapedPage) -> usize {
    serde_json::to_vec(page).map(|v| v.len()).unwrap_or(0)
}

/// Trim styles and stylesheets when the page serializes to more than
/// `limit` bytes. Returns whether anything was trimmed.
pub fn degrade(page: &mut ScrapedPage, limit: usize) -> bool {
    let size = payload_size(page);
    if size <= limit {
        return false;
    }
    page.computed_styles.truncate(DEGRADED_STYLE_ENTRIES);
    page.stylesheets.truncate(DEGRADED_STYLESHEETS);
    tracing::info!(
        url = %page.url,
        size,
        limit,
        reduced = payload_size(page),
        "scraped page degraded to fit payload limit"
    );
    true
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
