// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-adapters: browser capture, code generation and crawl adapters.

mod browser;
pub mod capture;
pub mod crawl;
pub mod design;
pub mod generate;
pub mod image_prep;
pub mod response;
pub mod subprocess;

pub use browser::{file_url, BrowserError, BrowserSettings, Viewport};
pub use capture::{
    CaptureAdapter, CaptureError, CaptureTarget, ChromiumCapture, ElementRect, ElementStyle,
    ScrapedPage,
};
pub use crawl::{ChromiumCrawler, CrawlAdapter, CrawlError, CrawlSettings, ShopInfo};
pub use design::{hints_from_html, hints_from_image, DesignHints};
pub use generate::{
    AnyGenerator, ApiGenerator, CliGenerator, GenerateError, GeneratorAdapter, GeneratorSettings,
    Provider,
};

#[cfg(any(test, feature = "test-support"))]
pub use capture::{CaptureCall, FakeCapture};
#[cfg(any(test, feature = "test-support"))]
pub use crawl::{CrawlCall, FakeCrawler};
#[cfg(any(test, feature = "test-support"))]
pub use generate::{FakeGenerator, GenerateCall};
