// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Headless Chromium session helpers shared by the capture and crawl adapters.
//!
//! `headless_chrome` is synchronous; callers run these functions on tokio's
//! blocking pool.

use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport as Clip};
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Fixed page size used for every capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1366, height: 768 }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub viewport: Viewport,
    /// Limit for a page to finish loading.
    pub navigation_timeout: Duration,
    /// Extra wait after load for late rendering.
    pub settle: Duration,
    /// Chromium binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(1),
            chrome_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("screenshot failed: {0}")]
    Screenshot(String),
    #[error("invalid file path {0}")]
    FilePath(PathBuf),
}

impl BrowserError {
    /// Whether the same call may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BrowserError::FilePath(_))
    }

    /// Navigation failures that came from the timeout rather than the page.
    pub fn is_timeout(&self) -> bool {
        match self {
            BrowserError::Navigation { message, .. } => message.to_lowercase().contains("timeout"),
            _ => false,
        }
    }
}

pub(crate) fn launch(settings: &BrowserSettings) -> Result<Browser, BrowserError> {
    let options = LaunchOptionsBuilder::default()
        .headless(true)
        .window_size(Some((settings.viewport.width, settings.viewport.height)))
        .path(settings.chrome_path.clone())
        .idle_browser_timeout(settings.navigation_timeout * 4)
        .args(vec![
            OsStr::new("--force-device-scale-factor=1"),
            OsStr::new("--allow-file-access-from-files"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--hide-scrollbars"),
        ])
        .build()
        .map_err(|e| BrowserError::Launch(e.to_string()))?;
    Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))
}

/// Open `url` in a fresh tab and wait for it to load and settle.
pub(crate) fn open(
    browser: &Browser,
    url: &str,
    settings: &BrowserSettings,
) -> Result<Arc<Tab>, BrowserError> {
    let nav_err = |e: &dyn std::fmt::Display| BrowserError::Navigation {
        url: url.to_string(),
        message: e.to_string(),
    };
    let tab = browser.new_tab().map_err(|e| nav_err(&e))?;
    tab.set_default_timeout(settings.navigation_timeout);
    tab.navigate_to(url).map_err(|e| nav_err(&e))?;
    tab.wait_until_navigated().map_err(|e| nav_err(&e))?;
    std::thread::sleep(settings.settle);
    Ok(tab)
}

/// Evaluate a script that returns `JSON.stringify(...)` and decode it.
pub(crate) fn eval_json<T: DeserializeOwned>(tab: &Tab, script: &str) -> Result<T, BrowserError> {
    let result = tab.evaluate(script, false).map_err(|e| BrowserError::Script(e.to_string()))?;
    let raw = result
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .ok_or_else(|| BrowserError::Script("script returned no string value".to_string()))?;
    serde_json::from_str(raw).map_err(|e| BrowserError::Script(e.to_string()))
}

const DOCUMENT_SIZE_SCRIPT: &str = "JSON.stringify([\
    Math.max(document.documentElement.scrollWidth, document.body ? document.body.scrollWidth : 0),\
    Math.max(document.documentElement.scrollHeight, document.body ? document.body.scrollHeight : 0)])";

/// PNG of the whole document, at least one viewport in size.
pub(crate) fn full_page_png(tab: &Tab, viewport: Viewport) -> Result<Vec<u8>, BrowserError> {
    let (width, height): (f64, f64) = eval_json(tab, DOCUMENT_SIZE_SCRIPT)?;
    let clip = Clip {
        x: 0.0,
        y: 0.0,
        width: width.max(f64::from(viewport.width)),
        height: height.max(f64::from(viewport.height)),
        scale: 1.0,
    };
    tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
        .map_err(|e| BrowserError::Screenshot(e.to_string()))
}

/// `file://` URL for a local document.
pub fn file_url(path: &Path) -> Result<String, BrowserError> {
    let absolute = path.canonicalize().map_err(|_| BrowserError::FilePath(path.to_path_buf()))?;
    url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|()| BrowserError::FilePath(path.to_path_buf()))
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
