// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page scraping and screenshot capture.

use crate::browser::{self, BrowserError, BrowserSettings, Viewport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Elements sampled for computed styles.
pub const MAX_STYLED_ELEMENTS: usize = 500;

/// Same-origin stylesheets read from the document.
pub const MAX_STYLESHEETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Failed to load page: {0}")]
    Navigation(String),
    #[error("Timed out loading page: {0}")]
    Timeout(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Generated HTML not found: {0}")]
    MissingFile(PathBuf),
}

impl CaptureError {
    /// Whether repeating the call may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CaptureError::MissingFile(_))
    }
}

impl From<BrowserError> for CaptureError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::FilePath(path) => CaptureError::MissingFile(path),
            e if e.is_timeout() => CaptureError::Timeout(e.to_string()),
            e @ BrowserError::Navigation { .. } => CaptureError::Navigation(e.to_string()),
            e => CaptureError::Browser(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Computed style sample for one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Option<String>,
    pub rect: ElementRect,
    pub styles: BTreeMap<String, String>,
}

/// Everything collected from a source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub html: String,
    pub viewport: Viewport,
    pub computed_styles: Vec<ElementStyle>,
    pub stylesheets: Vec<String>,
    /// Full-page PNG; excluded from size accounting and serialization.
    #[serde(skip)]
    pub screenshot: Vec<u8>,
}

/// What to screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureTarget::Url(url) => f.write_str(url),
            CaptureTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Adapter for loading pages in a browser.
#[async_trait]
pub trait CaptureAdapter: Clone + Send + Sync + 'static {
    /// Load `url` and collect its markup, styles and a full-page screenshot.
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, CaptureError>;

    /// Full-page PNG of a URL or a local HTML file.
    async fn screenshot(&self, target: &CaptureTarget) -> Result<Vec<u8>, CaptureError>;
}

const COMPUTED_STYLES_SCRIPT: &str = r#"JSON.stringify(Array.from(document.querySelectorAll('*')).slice(0, 500).map(function (el) {
  var cs = getComputedStyle(el);
  var r = el.getBoundingClientRect();
  var keys = ['color', 'backgroundColor', 'fontSize', 'fontFamily', 'fontWeight', 'lineHeight',
    'textAlign', 'margin', 'padding', 'border', 'borderRadius', 'display', 'position', 'top', 'left',
    'width', 'height', 'flexDirection', 'justifyContent', 'alignItems', 'gap', 'backgroundImage',
    'boxShadow', 'opacity', 'transform', 'zIndex'];
  var styles = {};
  keys.forEach(function (k) { styles[k] = String(cs[k]); });
  return {
    tag: el.tagName.toLowerCase(),
    id: el.id || null,
    classes: typeof el.className === 'string' && el.className ? el.className : null,
    rect: { x: Math.round(r.x), y: Math.round(r.y), width: Math.round(r.width), height: Math.round(r.height) },
    styles: styles
  };
}))"#;

const STYLESHEETS_SCRIPT: &str = r#"JSON.stringify(Array.from(document.styleSheets).slice(0, 5).map(function (sheet) {
  try { return Array.from(sheet.cssRules).map(function (r) { return r.cssText; }).join('\n'); }
  catch (e) { return ''; }
}).filter(function (s) { return s.length > 0; }))"#;

/// Capture adapter backed by headless Chromium.
#[derive(Clone, Debug, Default)]
pub struct ChromiumCapture {
    settings: BrowserSettings,
}

impl ChromiumCapture {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn scrape_blocking(settings: &BrowserSettings, url: &str) -> Result<ScrapedPage, BrowserError> {
        let browser = browser::launch(settings)?;
        let tab = browser::open(&browser, url, settings)?;
        let title = tab.get_title().map_err(|e| BrowserError::Script(e.to_string()))?;
        let html = tab.get_content().map_err(|e| BrowserError::Script(e.to_string()))?;

        let computed_styles: Vec<ElementStyle> =
            browser::eval_json(&tab, COMPUTED_STYLES_SCRIPT).unwrap_or_else(|e| {
                tracing::warn!(url, error = %e, "computed style extraction failed");
                Vec::new()
            });
        let stylesheets: Vec<String> =
            browser::eval_json(&tab, STYLESHEETS_SCRIPT).unwrap_or_else(|e| {
                tracing::warn!(url, error = %e, "stylesheet extraction failed");
                Vec::new()
            });
        let screenshot = browser::full_page_png(&tab, settings.viewport)?;

        Ok(ScrapedPage {
            url: url.to_string(),
            title,
            html,
            viewport: settings.viewport,
            computed_styles,
            stylesheets,
            screenshot,
        })
    }

    fn screenshot_blocking(
        settings: &BrowserSettings,
        target: &CaptureTarget,
    ) -> Result<Vec<u8>, BrowserError> {
        let url = match target {
            CaptureTarget::Url(url) => url.clone(),
            CaptureTarget::File(path) => browser::file_url(path)?,
        };
        let browser = browser::launch(settings)?;
        let tab = browser::open(&browser, &url, settings)?;
        browser::full_page_png(&tab, settings.viewport)
    }
}

#[async_trait]
impl CaptureAdapter for ChromiumCapture {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, CaptureError> {
        tracing::info!(url, "scraping");
        let settings = self.settings.clone();
        let target = url.to_string();
        let page = tokio::task::spawn_blocking(move || Self::scrape_blocking(&settings, &target))
            .await
            .map_err(|e| CaptureError::Browser(e.to_string()))??;
        tracing::info!(
            url,
            html_bytes = page.html.len(),
            styles = page.computed_styles.len(),
            sheets = page.stylesheets.len(),
            "scrape complete"
        );
        Ok(page)
    }

    async fn screenshot(&self, target: &CaptureTarget) -> Result<Vec<u8>, CaptureError> {
        if let CaptureTarget::File(path) = target {
            if !path.is_file() {
                return Err(CaptureError::MissingFile(path.clone()));
            }
        }
        let settings = self.settings.clone();
        let owned = target.clone();
        let png = tokio::task::spawn_blocking(move || Self::screenshot_blocking(&settings, &owned))
            .await
            .map_err(|e| CaptureError::Browser(e.to_string()))??;
        tracing::debug!(%target, bytes = png.len(), "screenshot captured");
        Ok(png)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CaptureAdapter, CaptureError, CaptureTarget, ScrapedPage};
    use crate::browser::Viewport;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded capture call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CaptureCall {
        Scrape(String),
        Screenshot(CaptureTarget),
    }

    struct FakeCaptureState {
        source_png: Vec<u8>,
        /// Served in order for `File` screenshots; falls back to `source_png`.
        candidate_pngs: VecDeque<Vec<u8>>,
        scrape_errors: VecDeque<CaptureError>,
        screenshot_errors: VecDeque<CaptureError>,
        html: String,
        delay: Option<Duration>,
        calls: Vec<CaptureCall>,
    }

    /// Fake capture adapter serving canned screenshots
    #[derive(Clone)]
    pub struct FakeCapture {
        inner: Arc<Mutex<FakeCaptureState>>,
    }

    impl FakeCapture {
        /// Every screenshot (source and candidate) is `png` unless overridden.
        pub fn new(png: Vec<u8>) -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeCaptureState {
                    source_png: png,
                    candidate_pngs: VecDeque::new(),
                    scrape_errors: VecDeque::new(),
                    screenshot_errors: VecDeque::new(),
                    html: "<html><head><title>Fake</title></head><body><h1>Fake</h1></body></html>"
                        .to_string(),
                    delay: None,
                    calls: Vec::new(),
                })),
            }
        }

        /// Queue screenshots returned for generated files, in order.
        pub fn push_candidate(&self, png: Vec<u8>) {
            self.inner.lock().candidate_pngs.push_back(png);
        }

        /// Fail the next scrape with `err`.
        pub fn fail_next_scrape(&self, err: CaptureError) {
            self.inner.lock().scrape_errors.push_back(err);
        }

        /// Fail the next screenshot with `err`.
        pub fn fail_next_screenshot(&self, err: CaptureError) {
            self.inner.lock().screenshot_errors.push_back(err);
        }

        pub fn set_html(&self, html: impl Into<String>) {
            self.inner.lock().html = html.into();
        }

        /// Sleep this long inside every call.
        pub fn set_delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<CaptureCall> {
            self.inner.lock().calls.clone()
        }

        fn delay(&self) -> Option<Duration> {
            self.inner.lock().delay
        }
    }

    #[async_trait]
    impl CaptureAdapter for FakeCapture {
        async fn scrape(&self, url: &str) -> Result<ScrapedPage, CaptureError> {
            if let Some(d) = self.delay() {
                tokio::time::sleep(d).await;
            }
            let mut state = self.inner.lock();
            state.calls.push(CaptureCall::Scrape(url.to_string()));
            if let Some(err) = state.scrape_errors.pop_front() {
                return Err(err);
            }
            Ok(ScrapedPage {
                url: url.to_string(),
                title: "Fake".to_string(),
                html: state.html.clone(),
                viewport: Viewport::default(),
                computed_styles: Vec::new(),
                stylesheets: Vec::new(),
                screenshot: state.source_png.clone(),
            })
        }

        async fn screenshot(&self, target: &CaptureTarget) -> Result<Vec<u8>, CaptureError> {
            if let Some(d) = self.delay() {
                tokio::time::sleep(d).await;
            }
            let mut state = self.inner.lock();
            state.calls.push(CaptureCall::Screenshot(target.clone()));
            if let Some(err) = state.screenshot_errors.pop_front() {
                return Err(err);
            }
            match target {
                CaptureTarget::Url(_) => Ok(state.source_png.clone()),
                CaptureTarget::File(_) => {
                    let fallback = state.source_png.clone();
                    Ok(state.candidate_pngs.pop_front().unwrap_or(fallback))
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CaptureCall, FakeCapture};

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
