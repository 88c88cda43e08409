// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk crawl runner.
//!
//! A crawl walks a range of listing pages, collects the shop detail pages
//! they link to, then processes each detail page: read the shop name and
//! website and save a screenshot under `<output_dir>/screenshots/`. A CSV
//! report is written whenever a run ends.

use crate::config::RunnerConfig;
use crate::crawl_report::{write_report, REPORT_FILE};
use crate::error::RunnerError;
use crate::events::EventBus;
use crate::retry::RetryPolicy;
use parking_lot::Mutex;
use rp_adapters::{CrawlAdapter, CrawlError, CrawlSettings, ShopInfo};
use rp_core::{
    sanitize_filename, unique_filename, validate_output_dir, Clock, CrawlJob, CrawlJobId,
    CrawlRecord, CrawlStatus, Event, RecordId, RecordStatus,
};
use rp_storage::{CrawlStore, StoreError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};

/// Subdirectory of a crawl's output directory holding page captures.
pub const SCREENSHOT_SUBDIR: &str = "screenshots";

const SCREENSHOT_SUFFIX: &str = "_screenshot.png";

/// Message recorded on a crawl ended by [`CrawlRunner::stop_crawl`].
const STOPPED_MESSAGE: &str = "Stopped by user";

struct Inner<A, K> {
    crawler: A,
    clock: K,
    settings: CrawlSettings,
    retry: RetryPolicy,
    store: CrawlStore,
    events: EventBus,
    /// Crawls with a live run task.
    active: Mutex<HashSet<CrawlJobId>>,
    /// Crawls asked to stop at the next check.
    stops: Mutex<HashSet<CrawlJobId>>,
    changed: Notify,
}

/// Crawl runner; clones share the same crawls.
pub struct CrawlRunner<A, K> {
    inner: Arc<Inner<A, K>>,
}

impl<A, K> Clone for CrawlRunner<A, K> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<A, K> CrawlRunner<A, K>
where
    A: CrawlAdapter,
    K: Clock,
{
    pub fn new(crawler: A, clock: K, settings: CrawlSettings, config: &RunnerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                crawler,
                clock,
                settings,
                retry: config.retry,
                store: CrawlStore::new(config.output_base.clone()),
                events: EventBus::new(),
                active: Mutex::new(HashSet::new()),
                stops: Mutex::new(HashSet::new()),
                changed: Notify::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// `<output_base>/<output_dir>` of a crawl.
    pub fn crawl_dir(&self, crawl: &CrawlJob) -> PathBuf {
        self.inner.store.dir_for(&crawl.output_dir)
    }

    pub fn report_path(&self, crawl: &CrawlJob) -> PathBuf {
        self.crawl_dir(crawl).join(REPORT_FILE)
    }

    pub fn create_crawl(
        &self,
        start_page: u32,
        end_page: u32,
        output_dir: &str,
    ) -> Result<CrawlJob, RunnerError> {
        if start_page < 1 {
            return Err(RunnerError::InvalidInput("start_page must be at least 1".into()));
        }
        if end_page < start_page {
            return Err(RunnerError::InvalidInput(format!(
                "end_page ({end_page}) must not be before start_page ({start_page})"
            )));
        }
        validate_output_dir(output_dir).map_err(|e| RunnerError::InvalidInput(e.to_string()))?;
        if self.inner.store.dir_in_use(output_dir) {
            return Err(RunnerError::InvalidInput(format!(
                "output directory '{output_dir}' is already used by another crawl"
            )));
        }

        let crawl = CrawlJob::new(start_page, end_page, output_dir, &self.inner.clock);
        self.inner.store.insert(crawl.clone())?;
        tracing::info!(crawl_id = %crawl.id, start_page, end_page, output_dir, "crawl created");
        Ok(crawl)
    }

    /// Spawn a `Pending` crawl and return without waiting.
    pub fn start_crawl(&self, id: &CrawlJobId) -> Result<CrawlJob, RunnerError> {
        let crawl = self.require(id)?;
        if crawl.status != CrawlStatus::Pending {
            return Err(RunnerError::CrawlWrongStatus { id: id.clone(), status: crawl.status });
        }
        self.spawn(id)?;
        self.require(id)
    }

    /// Ask a running crawl to stop before its next page or record.
    pub fn stop_crawl(&self, id: &CrawlJobId) -> Result<(), RunnerError> {
        let crawl = self.require(id)?;
        if crawl.status != CrawlStatus::Running {
            return Err(RunnerError::CrawlWrongStatus { id: id.clone(), status: crawl.status });
        }
        self.inner.stops.lock().insert(id.clone());
        tracing::info!(crawl_id = %id, "crawl stop requested");
        Ok(())
    }

    /// Put a failed or skipped record back in the queue.
    ///
    /// A crawl that has already ended is resumed to process it.
    pub fn retry_record(
        &self,
        crawl_id: &CrawlJobId,
        record_id: &RecordId,
    ) -> Result<CrawlRecord, RunnerError> {
        let now = self.inner.clock.epoch_ms();
        let (reset, _) = self
            .inner
            .store
            .update(crawl_id, |crawl| {
                let record = crawl.record_mut(record_id).ok_or_else(|| RunnerError::RecordNotFound {
                    crawl: crawl_id.clone(),
                    record: record_id.clone(),
                })?;
                if !matches!(record.status, RecordStatus::Failed | RecordStatus::Skipped) {
                    return Err(RunnerError::RecordWrongStatus {
                        id: record_id.clone(),
                        status: record.status,
                    });
                }
                record.reset(now);
                let record = record.clone();
                crawl.processed_items = crawl.processed_items.saturating_sub(1);
                crawl.updated_at_ms = now;
                Ok(record)
            })
            .map_err(|e| match e {
                StoreError::NotFound(_) => RunnerError::CrawlNotFound(crawl_id.clone()),
                e => RunnerError::Store(e),
            })?;
        let record = reset?;
        tracing::info!(crawl_id = %crawl_id, record_id = %record_id, "record queued for retry");
        self.inner.events.publish(Event::RecordUpdated {
            id: crawl_id.clone(),
            record_id: record_id.clone(),
            status: record.status,
        });

        if !self.inner.active.lock().contains(crawl_id) {
            self.spawn(crawl_id)?;
        }
        Ok(record)
    }

    pub fn get_crawl(&self, id: &CrawlJobId) -> Option<CrawlJob> {
        self.inner.store.get(id)
    }

    pub fn list_crawls(&self) -> Vec<CrawlJob> {
        self.inner.store.list()
    }

    /// Load a crawl recorded under `output_dir`. Records caught mid-processing
    /// go back to `Pending`.
    pub fn load_crawl(&self, output_dir: &str) -> Result<CrawlJob, RunnerError> {
        validate_output_dir(output_dir).map_err(|e| RunnerError::InvalidInput(e.to_string()))?;
        let crawl = self.inner.store.load(output_dir)?;
        if self.inner.active.lock().contains(&crawl.id) {
            return Ok(crawl);
        }
        let now = self.inner.clock.epoch_ms();
        let (_, crawl) = self.inner.store.update(&crawl.id, |crawl| {
            for record in crawl.records.iter_mut().filter(|r| r.status == RecordStatus::Processing) {
                record.status = RecordStatus::Pending;
                record.updated_at_ms = now;
            }
            if crawl.status == CrawlStatus::Running {
                crawl.status = CrawlStatus::Failed;
                crawl.error_message = Some("interrupted".to_string());
                crawl.updated_at_ms = now;
            }
        })?;
        Ok(crawl)
    }

    /// Wait until the crawl's run task has ended.
    pub async fn wait_for_crawl(&self, id: &CrawlJobId) -> Result<CrawlJob, RunnerError> {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let crawl = self.require(id)?;
            let running = self.inner.active.lock().contains(id);
            if !running && crawl.status != CrawlStatus::Running {
                return Ok(crawl);
            }
            notified.await;
        }
    }

    fn require(&self, id: &CrawlJobId) -> Result<CrawlJob, RunnerError> {
        self.get_crawl(id).ok_or_else(|| RunnerError::CrawlNotFound(id.clone()))
    }

    fn spawn(&self, id: &CrawlJobId) -> Result<(), RunnerError> {
        if !self.inner.active.lock().insert(id.clone()) {
            return Err(RunnerError::CrawlWrongStatus { id: id.clone(), status: CrawlStatus::Running });
        }
        self.set_status(id, CrawlStatus::Running, None);
        let runner = self.clone();
        let id = id.clone();
        tokio::spawn(async move {
            runner.run(&id).await;
            runner.inner.active.lock().remove(&id);
            runner.inner.stops.lock().remove(&id);
            runner.inner.changed.notify_waiters();
        });
        Ok(())
    }

    fn stop_requested(&self, id: &CrawlJobId) -> bool {
        self.inner.stops.lock().contains(id)
    }

    async fn run(&self, id: &CrawlJobId) {
        let Some(crawl) = self.get_crawl(id) else {
            return;
        };
        let dir = self.crawl_dir(&crawl);

        if crawl.records.is_empty() {
            self.collect_listings(&crawl).await;
        }

        while !self.stop_requested(id) {
            let next = self
                .get_crawl(id)
                .and_then(|c| c.records.iter().find(|r| r.status == RecordStatus::Pending).cloned());
            let Some(record) = next else {
                break;
            };
            self.process_record(id, &record, &dir).await;
        }

        if self.stop_requested(id) {
            tracing::info!(crawl_id = %id, "crawl stopped");
            self.set_status(id, CrawlStatus::Failed, Some(STOPPED_MESSAGE.to_string()));
        } else {
            self.set_status(id, CrawlStatus::Completed, None);
        }

        if let Some(crawl) = self.get_crawl(id) {
            let path = dir.join(REPORT_FILE);
            match write_report(&path, &crawl) {
                Ok(()) => tracing::info!(crawl_id = %id, path = %path.display(), "crawl report written"),
                Err(e) => tracing::error!(crawl_id = %id, error = %e, "failed to write crawl report"),
            }
            tracing::info!(
                crawl_id = %id,
                total = crawl.total_items,
                success = crawl.count(RecordStatus::Success),
                failed = crawl.count(RecordStatus::Failed),
                skipped = crawl.count(RecordStatus::Skipped),
                "crawl finished"
            );
        }
    }

    /// Phase 1: read every listing page and register one record per new
    /// detail URL, first-seen order.
    async fn collect_listings(&self, crawl: &CrawlJob) {
        let mut urls: Vec<String> = Vec::new();
        for page in crawl.start_page..=crawl.end_page {
            if self.stop_requested(&crawl.id) {
                break;
            }
            let page_url = self.inner.settings.listing_url(page);
            match self.inner.crawler.listing(&page_url).await {
                Ok(found) => {
                    tracing::info!(crawl_id = %crawl.id, page, found = found.len(), "listing page read");
                    for url in found {
                        if !urls.contains(&url) {
                            urls.push(url);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(crawl_id = %crawl.id, page, error = %e, "listing page skipped");
                }
            }
        }

        let now = self.inner.clock.epoch_ms();
        self.update(&crawl.id, |c| {
            c.records = urls.iter().map(|u| CrawlRecord::new(u.as_str(), now)).collect();
            c.total_items = c.records.len();
            c.processed_items = 0;
            c.updated_at_ms = now;
        });
        self.inner.events.publish(Event::CrawlProgress {
            id: crawl.id.clone(),
            processed: 0,
            total: urls.len(),
        });
    }

    /// Phase 2 for one record: retry transient failures, skip pages without
    /// shop details.
    async fn process_record(&self, id: &CrawlJobId, record: &CrawlRecord, dir: &Path) {
        self.set_record(id, &record.id, |r, _| r.status = RecordStatus::Processing);

        loop {
            match self.capture_record(id, record, dir).await {
                Ok((info, stem)) => {
                    let sanitized = sanitize_filename(&info.name);
                    self.set_record(id, &record.id, |r, _| {
                        r.shop_name = Some(info.name.clone());
                        r.shop_name_sanitized = Some(sanitized);
                        r.shop_url = info.url.clone();
                        r.screenshot_filename = Some(format!("{stem}{SCREENSHOT_SUFFIX}"));
                        r.error_message = None;
                        r.status = RecordStatus::Success;
                    });
                    tracing::info!(crawl_id = %id, record_id = %record.id, shop = %info.name, "record captured");
                    break;
                }
                Err(e) if !e.is_retryable() => {
                    tracing::warn!(crawl_id = %id, record_id = %record.id, error = %e, "record skipped");
                    self.set_record(id, &record.id, |r, _| {
                        r.error_message = Some(e.to_string());
                        r.status = RecordStatus::Skipped;
                    });
                    break;
                }
                Err(e) => {
                    let retries = self.set_record(id, &record.id, |r, _| {
                        r.retry_count += 1;
                        r.error_message = Some(e.to_string());
                        r.retry_count
                    });
                    let Some(retries) = retries else {
                        return;
                    };
                    if retries >= self.inner.retry.attempts() {
                        tracing::error!(crawl_id = %id, record_id = %record.id, error = %e, "record failed");
                        self.set_record(id, &record.id, |r, _| {
                            r.error_message = Some(format!("Max retries reached: {e}"));
                            r.status = RecordStatus::Failed;
                        });
                        break;
                    }
                    let delay = self.inner.retry.delay(retries);
                    tracing::warn!(
                        crawl_id = %id,
                        record_id = %record.id,
                        retry = retries,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "record attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    if self.stop_requested(id) {
                        self.set_record(id, &record.id, |r, _| r.status = RecordStatus::Pending);
                        return;
                    }
                }
            }
        }

        let now = self.inner.clock.epoch_ms();
        if let Some(crawl) = self.update(id, |c| {
            c.processed_items += 1;
            c.updated_at_ms = now;
        }) {
            self.inner.events.publish(Event::CrawlProgress {
                id: id.clone(),
                processed: crawl.processed_items,
                total: crawl.total_items,
            });
        }
    }

    /// One attempt: shop details, then a screenshot under a unique name.
    async fn capture_record(
        &self,
        id: &CrawlJobId,
        record: &CrawlRecord,
        dir: &Path,
    ) -> Result<(ShopInfo, String), CrawlError> {
        let info = self.inner.crawler.shop_info(&record.detail_page_url).await?;
        if info.name.trim().is_empty() {
            return Err(CrawlError::ElementNotFound(format!(
                "Shop name not found: {}",
                record.detail_page_url
            )));
        }

        let taken = self.taken_stems(id);
        let stem = unique_filename(&sanitize_filename(&info.name), &taken)
            .map_err(|e| CrawlError::FileSystem(e.to_string()))?;
        let screenshots = dir.join(SCREENSHOT_SUBDIR);
        std::fs::create_dir_all(&screenshots).map_err(|e| {
            CrawlError::FileSystem(format!("Failed to create {}: {e}", screenshots.display()))
        })?;

        let target = info.url.as_deref().unwrap_or(&record.detail_page_url);
        let dest = screenshots.join(format!("{stem}{SCREENSHOT_SUFFIX}"));
        self.inner.crawler.capture(target, &dest).await?;
        Ok((info, stem))
    }

    /// File stems already used by captured records of the crawl.
    fn taken_stems(&self, id: &CrawlJobId) -> HashSet<String> {
        self.get_crawl(id)
            .map(|c| {
                c.records
                    .iter()
                    .filter_map(|r| r.screenshot_filename.as_deref())
                    .filter_map(|f| f.strip_suffix(SCREENSHOT_SUFFIX))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_status(&self, id: &CrawlJobId, status: CrawlStatus, error: Option<String>) {
        let now = self.inner.clock.epoch_ms();
        if self
            .update(id, |c| {
                c.status = status;
                c.error_message = error;
                c.updated_at_ms = now;
            })
            .is_some()
        {
            tracing::info!(crawl_id = %id, %status, "crawl status changed");
            self.inner.events.publish(Event::CrawlStatusChanged { id: id.clone(), status });
        }
    }

    /// Apply `f` to one record and publish its status.
    fn set_record<R>(
        &self,
        id: &CrawlJobId,
        record_id: &RecordId,
        f: impl FnOnce(&mut CrawlRecord, u64) -> R,
    ) -> Option<R> {
        let now = self.inner.clock.epoch_ms();
        let mut out = None;
        let mut status = None;
        self.update(id, |c| {
            if let Some(record) = c.record_mut(record_id) {
                out = Some(f(record, now));
                record.updated_at_ms = now;
                status = Some(record.status);
            }
            c.updated_at_ms = now;
        });
        if let Some(status) = status {
            self.inner.events.publish(Event::RecordUpdated {
                id: id.clone(),
                record_id: record_id.clone(),
                status,
            });
        }
        out
    }

    /// Mutate a stored crawl. Write failures are logged; the in-memory
    /// change stands.
    fn update(&self, id: &CrawlJobId, f: impl FnOnce(&mut CrawlJob)) -> Option<CrawlJob> {
        let mut applied = None;
        let result = self.inner.store.update(id, |c| {
            f(c);
            applied = Some(c.clone());
        });
        self.inner.changed.notify_waiters();
        if let Err(e) = result {
            tracing::error!(crawl_id = %id, error = %e, "failed to persist crawl record");
        }
        applied
    }
}

#[cfg(test)]
#[path = "crawl_tests.rs"]
mod tests;
