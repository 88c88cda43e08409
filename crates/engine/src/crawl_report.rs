// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CSV summary of a crawl.

use chrono::{TimeZone, Utc};
use rp_core::{CrawlJob, CrawlRecord};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Report file name, relative to the crawl's output directory.
pub const REPORT_FILE: &str = "report.csv";

const HEADER: [&str; 9] = [
    "id",
    "shop_name",
    "shop_url",
    "detail_page_url",
    "video_file",
    "screenshot_file",
    "status",
    "error_message",
    "processed_at",
];

/// Spreadsheet tools need the byte order mark to read the file as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write one row per record, numbered from 1, replacing any earlier report.
pub fn write_report(path: &Path, crawl: &CrawlJob) -> Result<(), csv::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for (index, record) in crawl.records.iter().enumerate() {
        writer.write_record(row(index + 1, record))?;
    }
    writer.flush()?;
    Ok(())
}

fn row(number: usize, record: &CrawlRecord) -> [String; 9] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        number.to_string(),
        text(&record.shop_name),
        text(&record.shop_url),
        record.detail_page_url.clone(),
        text(&record.video_filename),
        text(&record.screenshot_filename),
        record.status.to_string(),
        text(&record.error_message),
        processed_at(record.updated_at_ms),
    ]
}

/// UTC wall time.
fn processed_at(epoch_ms: u64) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "crawl_report_tests.rs"]
mod tests;
