// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Portfolio crawl adapter: listing pages, shop details and page captures.

use crate::browser::{self, BrowserError, BrowserSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    FileSystem(String),
    #[error("{0}")]
    Browser(String),
    #[error("{0}")]
    ElementNotFound(String),
}

impl CrawlError {
    /// Missing elements will not appear on a second attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CrawlError::ElementNotFound(_))
    }
}

impl From<BrowserError> for CrawlError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::Navigation { ref url, .. } if e.is_timeout() => {
                CrawlError::Timeout(format!("Page load timeout: {url}"))
            }
            BrowserError::Navigation { url, .. } => {
                CrawlError::Network(format!("Failed to load page: {url}"))
            }
            e => CrawlError::Browser(e.to_string()),
        }
    }
}

/// Where listings live and which links count as shop pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// Page 1 of the listing; later pages are `{listing_base}page/{n}/`.
    pub listing_base: String,
    /// First path segments that are site sections rather than shops.
    pub excluded_slugs: Vec<String>,
    #[serde(skip)]
    pub browser: BrowserSettings,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            listing_base: "https://f-webdesign.biz/category/all/".to_string(),
            excluded_slugs: [
                "category",
                "page",
                "post-district",
                "tokushu",
                "reason",
                "effort",
                "number",
                "info",
                "siryo",
                "otherreview",
                "dl_file_form",
                "dl_helpful_index",
                "plan",
                "faq",
                "privacy",
                "cookie",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            browser: BrowserSettings::default(),
        }
    }
}

impl CrawlSettings {
    /// URL of listing page `page` (1-based).
    pub fn listing_url(&self, page: u32) -> String {
        if page <= 1 {
            self.listing_base.clone()
        } else {
            format!("{}page/{page}/", self.listing_base)
        }
    }

    /// Whether `href` is a shop page: same host as the listing, exactly one
    /// path segment with a trailing slash, and not an excluded section.
    pub fn is_detail_url(&self, href: &str) -> bool {
        let (Ok(base), Ok(link)) = (url::Url::parse(&self.listing_base), url::Url::parse(href))
        else {
            return false;
        };
        if !matches!(link.scheme(), "http" | "https") || link.host_str() != base.host_str() {
            return false;
        }
        if link.query().is_some() || link.fragment().is_some() {
            return false;
        }
        let Some(slug) = link.path().strip_prefix('/').and_then(|p| p.strip_suffix('/')) else {
            return false;
        };
        !slug.is_empty() && !slug.contains('/') && !self.excluded_slugs.iter().any(|s| s == slug)
    }
}

/// Shop details read from a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    pub name: String,
    pub url: Option<String>,
}

/// Adapter for crawling a portfolio site.
#[async_trait]
pub trait CrawlAdapter: Clone + Send + Sync + 'static {
    /// Shop detail URLs linked from a listing page, first-seen order.
    async fn listing(&self, page_url: &str) -> Result<Vec<String>, CrawlError>;

    /// Shop name and website from a detail page.
    async fn shop_info(&self, detail_url: &str) -> Result<ShopInfo, CrawlError>;

    /// Save a full-page PNG of `url` to `dest`.
    async fn capture(&self, url: &str, dest: &Path) -> Result<(), CrawlError>;
}

const LINKS_SCRIPT: &str =
    "JSON.stringify(Array.from(document.querySelectorAll('a[href]')).map(function (a) { return a.href; }))";

// Breadcrumb list whose first item is the top page; its last item is the shop
// name. The website is the link in the <dd> after a <dt> containing "URL",
// else the first external link.
const SHOP_SCRIPT: &str = r#"JSON.stringify((function () {
  var name = null;
  var lists = document.querySelectorAll('ol, ul');
  for (var i = 0; i < lists.length && name === null; i++) {
    var items = lists[i].querySelectorAll('li');
    if (items.length >= 2 && items.length <= 5 && items[0].innerText.indexOf('トップ') !== -1) {
      name = items[items.length - 1].innerText.trim();
    }
  }
  var url = null;
  var dts = document.querySelectorAll('dt');
  for (var j = 0; j < dts.length && url === null; j++) {
    if (dts[j].innerText.indexOf('URL') !== -1) {
      var dd = dts[j].nextElementSibling;
      var a = dd ? dd.querySelector('a') : null;
      if (a && a.getAttribute('href')) { url = a.getAttribute('href'); }
    }
  }
  if (url === null) {
    var links = document.querySelectorAll("a[href^='http']");
    for (var k = 0; k < links.length; k++) {
      var href = links[k].getAttribute('href');
      if (href.indexOf(location.hostname) === -1 && href.indexOf('lin.ee') === -1) { url = href; break; }
    }
  }
  return { name: name || '', url: url };
})())"#;

/// Crawl adapter backed by headless Chromium.
#[derive(Clone, Debug, Default)]
pub struct ChromiumCrawler {
    settings: CrawlSettings,
}

impl ChromiumCrawler {
    pub fn new(settings: CrawlSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, CrawlError>
    where
        T: Send + 'static,
        F: FnOnce(CrawlSettings) -> Result<T, CrawlError> + Send + 'static,
    {
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || f(settings))
            .await
            .map_err(|e| CrawlError::Browser(e.to_string()))?
    }
}

#[async_trait]
impl CrawlAdapter for ChromiumCrawler {
    async fn listing(&self, page_url: &str) -> Result<Vec<String>, CrawlError> {
        let page_url = page_url.to_string();
        let urls = self
            .blocking(move |settings| {
                let browser = browser::launch(&settings.browser)?;
                let tab = browser::open(&browser, &page_url, &settings.browser)?;
                let hrefs: Vec<String> = browser::eval_json(&tab, LINKS_SCRIPT)?;
                let mut urls: Vec<String> = Vec::new();
                for href in hrefs {
                    if settings.is_detail_url(&href) && !urls.contains(&href) {
                        urls.push(href);
                    }
                }
                Ok(urls)
            })
            .await?;
        tracing::info!(count = urls.len(), "listing page scanned");
        Ok(urls)
    }

    async fn shop_info(&self, detail_url: &str) -> Result<ShopInfo, CrawlError> {
        let url = detail_url.to_string();
        let info: ShopInfo = self
            .blocking(move |settings| {
                let browser = browser::launch(&settings.browser)?;
                let tab = browser::open(&browser, &url, &settings.browser)?;
                Ok(browser::eval_json(&tab, SHOP_SCRIPT)?)
            })
            .await?;
        if info.name.is_empty() {
            return Err(CrawlError::ElementNotFound(format!("Shop name not found: {detail_url}")));
        }
        Ok(info)
    }

    async fn capture(&self, url: &str, dest: &Path) -> Result<(), CrawlError> {
        let url = url.to_string();
        let dest: PathBuf = dest.to_path_buf();
        self.blocking(move |settings| {
            let browser = browser::launch(&settings.browser)?;
            let tab = browser::open(&browser, &url, &settings.browser)?;
            let png = browser::full_page_png(&tab, settings.browser.viewport)?;
            std::fs::write(&dest, png).map_err(|e| {
                CrawlError::FileSystem(format!("Failed to save screenshot {}: {e}", dest.display()))
            })
        })
        .await
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CrawlAdapter, CrawlError, ShopInfo};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded crawl call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CrawlCall {
        Listing(String),
        ShopInfo(String),
        Capture { url: String, dest: PathBuf },
    }

    #[derive(Default)]
    struct FakeCrawlerState {
        listings: HashMap<String, Result<Vec<String>, CrawlError>>,
        shops: HashMap<String, VecDeque<Result<ShopInfo, CrawlError>>>,
        capture_errors: VecDeque<CrawlError>,
        calls: Vec<CrawlCall>,
    }

    /// Fake crawler serving canned listings and shops.
    ///
    /// Unknown listing pages are empty; unknown shops are named after the
    /// last path segment of their URL.
    #[derive(Clone, Default)]
    pub struct FakeCrawler {
        inner: Arc<Mutex<FakeCrawlerState>>,
    }

    impl FakeCrawler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_listing(&self, page_url: &str, result: Result<Vec<String>, CrawlError>) {
            self.inner.lock().listings.insert(page_url.to_string(), result);
        }

        /// Queue an answer for `detail_url`; the last one repeats.
        pub fn push_shop(&self, detail_url: &str, result: Result<ShopInfo, CrawlError>) {
            self.inner.lock().shops.entry(detail_url.to_string()).or_default().push_back(result);
        }

        pub fn fail_next_capture(&self, err: CrawlError) {
            self.inner.lock().capture_errors.push_back(err);
        }

        pub fn calls(&self) -> Vec<CrawlCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl CrawlAdapter for FakeCrawler {
        async fn listing(&self, page_url: &str) -> Result<Vec<String>, CrawlError> {
            let mut state = self.inner.lock();
            state.calls.push(CrawlCall::Listing(page_url.to_string()));
            state.listings.get(page_url).cloned().unwrap_or(Ok(Vec::new()))
        }

        async fn shop_info(&self, detail_url: &str) -> Result<ShopInfo, CrawlError> {
            let mut state = self.inner.lock();
            state.calls.push(CrawlCall::ShopInfo(detail_url.to_string()));
            if let Some(queue) = state.shops.get_mut(detail_url) {
                let next = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
                if let Some(result) = next {
                    return result;
                }
            }
            let name = detail_url.trim_end_matches('/').rsplit('/').next().unwrap_or("shop");
            Ok(ShopInfo { name: name.to_string(), url: None })
        }

        async fn capture(&self, url: &str, dest: &Path) -> Result<(), CrawlError> {
            let err = {
                let mut state = self.inner.lock();
                state.calls.push(CrawlCall::Capture { url: url.to_string(), dest: dest.to_path_buf() });
                state.capture_errors.pop_front()
            };
            if let Some(err) = err {
                return Err(err);
            }
            std::fs::write(dest, b"\x89PNG fake").map_err(|e| CrawlError::FileSystem(e.to_string()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CrawlCall, FakeCrawler};

#[cfg(test)]
#[path = "crawl_tests.rs"]
mod tests;
