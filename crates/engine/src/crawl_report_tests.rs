// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::{CrawlJob, CrawlRecord, FakeClock, RecordStatus};

fn crawl_with(records: Vec<CrawlRecord>) -> CrawlJob {
    let mut crawl = CrawlJob::new(1, 1, "crawl_a", &FakeClock::new());
    crawl.total_items = records.len();
    crawl.records = records;
    crawl
}

#[test]
fn report_starts_with_bom_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawl_a").join(REPORT_FILE);

    write_report(&path, &crawl_with(Vec::new())).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    assert_eq!(
        text,
        "id,shop_name,shop_url,detail_page_url,video_file,screenshot_file,status,error_message,processed_at\n"
    );
}

#[test]
fn rows_are_numbered_and_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(REPORT_FILE);
    let records = vec![
        CrawlRecord::builder()
            .detail_page_url("https://example.com/alpha/")
            .shop_name("Alpha, Inc.")
            .shop_url("https://alpha.example/")
            .screenshot_filename("Alpha_Inc_screenshot.png")
            .status(RecordStatus::Success)
            .updated_at_ms(0)
            .build(),
        CrawlRecord::builder()
            .detail_page_url("https://example.com/beta/")
            .status(RecordStatus::Failed)
            .error_message("Max retries reached: timeout")
            .updated_at_ms(86_400_000)
            .build(),
    ];

    write_report(&path, &crawl_with(records)).unwrap();

    let bytes = fs::read(&path).unwrap();
    let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].iter().collect::<Vec<_>>(),
        vec![
            "1",
            "Alpha, Inc.",
            "https://alpha.example/",
            "https://example.com/alpha/",
            "",
            "Alpha_Inc_screenshot.png",
            "success",
            "",
            "1970-01-01 00:00:00",
        ]
    );
    assert_eq!(&rows[1][0], "2");
    assert_eq!(&rows[1][6], "failed");
    assert_eq!(&rows[1][7], "Max retries reached: timeout");
    assert_eq!(&rows[1][8], "1970-01-02 00:00:00");
}

#[test]
fn rewriting_replaces_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(REPORT_FILE);
    let one = crawl_with(vec![CrawlRecord::builder().build()]);

    write_report(&path, &one).unwrap();
    write_report(&path, &crawl_with(Vec::new())).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
}
