// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    first = { 1, "https://f-webdesign.biz/category/all/" },
    second = { 2, "https://f-webdesign.biz/category/all/page/2/" },
    tenth = { 10, "https://f-webdesign.biz/category/all/page/10/" },
)]
fn listing_urls(page: u32, expected: &str) {
    assert_eq!(CrawlSettings::default().listing_url(page), expected);
}

#[yare::parameterized(
    shop = { "https://f-webdesign.biz/cafe-luna/", true },
    encoded_japanese = { "https://f-webdesign.biz/%e3%83%91%e3%83%b3/", true },
    http_scheme = { "http://f-webdesign.biz/cafe-luna/", true },
    excluded_section = { "https://f-webdesign.biz/faq/", false },
    nested = { "https://f-webdesign.biz/category/all/", false },
    no_trailing_slash = { "https://f-webdesign.biz/cafe-luna", false },
    root = { "https://f-webdesign.biz/", false },
    other_host = { "https://example.com/cafe-luna/", false },
    query = { "https://f-webdesign.biz/cafe-luna/?p=1", false },
    not_a_url = { "javascript:void(0)", false },
)]
fn detail_url_filter(href: &str, expected: bool) {
    assert_eq!(CrawlSettings::default().is_detail_url(href), expected);
}

#[yare::parameterized(
    network = { CrawlError::Network("x".into()), true },
    timeout = { CrawlError::Timeout("x".into()), true },
    file_system = { CrawlError::FileSystem("x".into()), true },
    browser = { CrawlError::Browser("x".into()), true },
    element_not_found = { CrawlError::ElementNotFound("x".into()), false },
)]
fn retryability(err: CrawlError, expected: bool) {
    assert_eq!(err.is_retryable(), expected);
}

#[test]
fn navigation_errors_map_by_cause() {
    let timeout: CrawlError = BrowserError::Navigation {
        url: "https://a/".into(),
        message: "Timeout while waiting".into(),
    }
    .into();
    assert_eq!(timeout, CrawlError::Timeout("Page load timeout: https://a/".into()));

    let refused: CrawlError =
        BrowserError::Navigation { url: "https://a/".into(), message: "refused".into() }.into();
    assert_eq!(refused, CrawlError::Network("Failed to load page: https://a/".into()));
}

#[tokio::test]
async fn fake_repeats_last_shop_answer() {
    let fake = FakeCrawler::new();
    let url = "https://f-webdesign.biz/cafe/";
    fake.push_shop(url, Err(CrawlError::Timeout("slow".into())));
    fake.push_shop(url, Ok(ShopInfo { name: "Cafe".into(), url: None }));

    assert!(fake.shop_info(url).await.is_err());
    assert_eq!(fake.shop_info(url).await.unwrap().name, "Cafe");
    assert_eq!(fake.shop_info(url).await.unwrap().name, "Cafe");
    assert_eq!(fake.shop_info("https://f-webdesign.biz/bar/").await.unwrap().name, "bar");
}

#[tokio::test]
async fn fake_capture_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("cafe_screenshot.png");
    FakeCrawler::new().capture("https://f-webdesign.biz/cafe/", &dest).await.unwrap();
    assert!(dest.is_file());
}
