// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory crawl jobs and their per-page records.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a crawl job.
    pub struct CrawlJobId("crw-");
}

crate::define_id! {
    /// Unique identifier for one detail page within a crawl.
    pub struct RecordId("rec-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    CrawlStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Processing,
    Success,
    Failed,
    /// Page lacked the expected content; not retried.
    Skipped,
}

crate::simple_display! {
    RecordStatus {
        Pending => "pending",
        Processing => "processing",
        Success => "success",
        Failed => "failed",
        Skipped => "skipped",
    }
}

/// One detail page discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub id: RecordId,
    pub detail_page_url: String,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub shop_name_sanitized: Option<String>,
    #[serde(default)]
    pub shop_url: Option<String>,
    #[serde(default)]
    pub video_filename: Option<String>,
    #[serde(default)]
    pub screenshot_filename: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    pub updated_at_ms: u64,
}

impl CrawlRecord {
    pub fn new(detail_page_url: impl Into<String>, epoch_ms: u64) -> Self {
        Self {
            id: RecordId::new(),
            detail_page_url: detail_page_url.into(),
            shop_name: None,
            shop_name_sanitized: None,
            shop_url: None,
            video_filename: None,
            screenshot_filename: None,
            status: RecordStatus::Pending,
            error_message: None,
            retry_count: 0,
            updated_at_ms: epoch_ms,
        }
    }

    /// Put the record back in the queue, clearing its last error.
    pub fn reset(&mut self, epoch_ms: u64) {
        self.status = RecordStatus::Pending;
        self.error_message = None;
        self.retry_count = 0;
        self.updated_at_ms = epoch_ms;
    }
}

crate::builder! {
    pub struct CrawlRecordBuilder => CrawlRecord {
        into {
            id: RecordId = "rec-test",
            detail_page_url: String = "https://example.com/shop/1/",
        }
        set {
            status: RecordStatus = RecordStatus::Pending,
            retry_count: u32 = 0,
            updated_at_ms: u64 = 1_000_000,
        }
        option {
            shop_name: String = None,
            shop_name_sanitized: String = None,
            shop_url: String = None,
            video_filename: String = None,
            screenshot_filename: String = None,
            error_message: String = None,
        }
    }
}

/// A bulk crawl over a range of listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: CrawlJobId,
    pub start_page: u32,
    pub end_page: u32,
    pub output_dir: String,
    pub status: CrawlStatus,
    pub total_items: usize,
    pub processed_items: usize,
    #[serde(default)]
    pub records: Vec<CrawlRecord>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl CrawlJob {
    pub fn new(start_page: u32, end_page: u32, output_dir: impl Into<String>, clock: &impl Clock) -> Self {
        let now = clock.epoch_ms();
        Self {
            id: CrawlJobId::new(),
            start_page,
            end_page,
            output_dir: output_dir.into(),
            status: CrawlStatus::Pending,
            total_items: 0,
            processed_items: 0,
            records: Vec::new(),
            error_message: None,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    pub fn record(&self, id: &RecordId) -> Option<&CrawlRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn record_mut(&mut self, id: &RecordId) -> Option<&mut CrawlRecord> {
        self.records.iter_mut().find(|r| &r.id == id)
    }

    /// Count of records with the given status.
    pub fn count(&self, status: RecordStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}

#[cfg(test)]
#[path = "crawl_tests.rs"]
mod tests;
