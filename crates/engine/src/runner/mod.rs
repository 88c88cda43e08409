// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication job runner.
//!
//! Owns every replication job's lifecycle: creation, the admission gate,
//! the scrape → generate → verify → refine pipeline, and on-demand extra
//! refinement. Job state is only changed through the runner's store.

mod pipeline;

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::events::EventBus;
use crate::gate::AdmissionGate;
use crate::job_logger::JobLogger;
use crate::verifier::Verifier;
use futures_util::FutureExt;
use parking_lot::Mutex;
use rp_adapters::{CaptureAdapter, GeneratorAdapter};
use rp_core::{
    validate_output_dir, Clock, Event, JobId, ReplicationError, ReplicationJob, ReplicationStatus,
};
use rp_storage::JobStore;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};

struct Inner<C, G, K> {
    capture: C,
    generator: G,
    clock: K,
    config: RunnerConfig,
    store: JobStore,
    gate: AdmissionGate,
    events: EventBus,
    logger: JobLogger,
    verifier: Verifier<C>,
    /// Jobs whose pipeline has been spawned.
    started: Mutex<HashSet<JobId>>,
    /// Signalled after every job mutation.
    changed: Notify,
}

/// Replication runner; clones share the same jobs, gate and event bus.
pub struct Runner<C, G, K> {
    inner: Arc<Inner<C, G, K>>,
}

impl<C, G, K> Clone for Runner<C, G, K> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C, G, K> Runner<C, G, K>
where
    C: CaptureAdapter,
    G: GeneratorAdapter,
    K: Clock,
{
    pub fn new(capture: C, generator: G, clock: K, config: RunnerConfig) -> Self {
        let verifier = Verifier::new(capture.clone(), config.iteration_limit(), config.retry);
        Self {
            inner: Arc::new(Inner {
                store: JobStore::new(config.output_base.clone()),
                gate: AdmissionGate::new(config.max_concurrent_jobs),
                events: EventBus::new(),
                logger: JobLogger::new(config.output_base.clone()),
                verifier,
                capture,
                generator,
                clock,
                config,
                started: Mutex::new(HashSet::new()),
                changed: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.inner.config
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.inner.gate
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// `<output_base>/<output_dir>` of a job.
    pub fn job_dir(&self, job: &ReplicationJob) -> PathBuf {
        self.inner.store.dir_for(&job.output_dir)
    }

    /// Register a new `Pending` job.
    ///
    /// `source_url` must be an absolute http(s) URL and `output_dir` a single
    /// safe path segment not used by another job of this runner.
    pub fn create_job(
        &self,
        source_url: &str,
        output_dir: &str,
        image_ref: Option<PathBuf>,
    ) -> Result<ReplicationJob, RunnerError> {
        validate_source_url(source_url)?;
        validate_output_dir(output_dir).map_err(|e| RunnerError::InvalidInput(e.to_string()))?;
        if self.inner.store.dir_in_use(output_dir) {
            return Err(RunnerError::InvalidInput(format!(
                "output directory '{output_dir}' is already used by another job"
            )));
        }

        let job = ReplicationJob::new(source_url, output_dir, image_ref, &self.inner.clock);
        self.inner.store.insert(job.clone())?;
        tracing::info!(job_id = %job.id, source_url, output_dir, "replication job created");
        self.inner.logger.append(output_dir, "created", &format!("{} from {source_url}", job.id));
        self.inner.events.publish(Event::JobCreated {
            id: job.id.clone(),
            source_url: job.source_url.clone(),
            output_dir: job.output_dir.clone(),
        });
        Ok(job)
    }

    /// Spawn the pipeline of a `Pending` job and return without waiting.
    pub fn start_replication(&self, id: &JobId) -> Result<ReplicationJob, RunnerError> {
        let job = self.require(id)?;
        if job.status != ReplicationStatus::Pending {
            return Err(RunnerError::WrongStatus {
                id: id.clone(),
                status: job.status,
                expected: ReplicationStatus::Pending,
            });
        }
        if !self.inner.started.lock().insert(id.clone()) {
            return Err(RunnerError::AlreadyStarted(id.clone()));
        }

        let runner = self.clone();
        let id = id.clone();
        tokio::spawn(async move { runner.run_job(id).await });
        Ok(job)
    }

    pub fn get_job(&self, id: &JobId) -> Option<ReplicationJob> {
        self.inner.store.get(id)
    }

    /// All jobs, oldest first.
    pub fn list_jobs(&self) -> Vec<ReplicationJob> {
        self.inner.store.list()
    }

    /// Load a job recorded under `output_dir` by an earlier process.
    ///
    /// A job found mid-pipeline cannot be resumed and is marked `Failed`.
    pub fn load_job(&self, output_dir: &str) -> Result<ReplicationJob, RunnerError> {
        validate_output_dir(output_dir).map_err(|e| RunnerError::InvalidInput(e.to_string()))?;
        let job = self.inner.store.load(output_dir)?;
        let running = self.inner.started.lock().contains(&job.id);
        if !running && !job.is_terminal() && job.status != ReplicationStatus::Pending {
            tracing::warn!(job_id = %job.id, status = %job.status, "job was interrupted");
            self.fail(
                &job.id,
                ReplicationError::Unexpected(format!("interrupted while {}", job.status)),
            );
            return self.require(&job.id);
        }
        Ok(job)
    }

    /// Run one extra refine-and-verify pass on a `Completed` job and return
    /// the job once it is terminal again.
    ///
    /// The pass goes `Completed → Generating → Verifying(current_iteration)
    /// → Completed` and waits for an admission slot like any other job.
    pub async fn refine_with_url(&self, id: &JobId) -> Result<ReplicationJob, RunnerError> {
        let job = self.require(id)?;
        if job.status != ReplicationStatus::Completed {
            return Err(RunnerError::WrongStatus {
                id: id.clone(),
                status: job.status,
                expected: ReplicationStatus::Completed,
            });
        }

        let permit = self.inner.gate.admit().await.map_err(|_| RunnerError::GateClosed)?;
        let now = self.inner.clock.epoch_ms();
        let (moved, snapshot) = self
            .mutate(id, |j| {
                let moved = j.advance(ReplicationStatus::Generating, now);
                if moved.is_ok() {
                    j.extra_refinements += 1;
                }
                moved
            })
            .map_err(|_| RunnerError::JobNotFound(id.clone()))?;
        let from = moved.map_err(|e| RunnerError::WrongStatus {
            id: id.clone(),
            status: e.from,
            expected: ReplicationStatus::Completed,
        })?;
        self.announce_transition(&snapshot, from);

        tracing::info!(job_id = %id, pass = snapshot.extra_refinements, "extra refinement started");
        // The pass runs on its own task so a caller that stops waiting
        // cannot leave the job in `Generating`.
        let runner = self.clone();
        let job_id = id.clone();
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(runner.refine_pass(&job_id)).catch_unwind().await;
            runner.settle(&job_id, outcome);
            drop(permit);
        });
        self.wait_for_terminal(id).await
    }

    /// Wait until the job is `Completed` or `Failed`.
    pub async fn wait_for_terminal(&self, id: &JobId) -> Result<ReplicationJob, RunnerError> {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let job = self.require(id)?;
            if job.is_terminal() {
                return Ok(job);
            }
            notified.await;
        }
    }

    fn require(&self, id: &JobId) -> Result<ReplicationJob, RunnerError> {
        self.get_job(id).ok_or_else(|| RunnerError::JobNotFound(id.clone()))
    }

    async fn run_job(self, id: JobId) {
        let permit = match self.inner.gate.admit().await {
            Ok(permit) => permit,
            Err(_) => {
                self.fail(&id, ReplicationError::Unexpected("admission gate closed".into()));
                return;
            }
        };
        tracing::info!(job_id = %id, active = self.inner.gate.active(), "job admitted");
        let outcome = AssertUnwindSafe(self.execute(&id)).catch_unwind().await;
        self.settle(&id, outcome);
        drop(permit);
    }

    /// Record how a pipeline future ended; errors and panics fail the job.
    fn settle(
        &self,
        id: &JobId,
        outcome: Result<Result<(), ReplicationError>, Box<dyn std::any::Any + Send>>,
    ) {
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.fail(id, e),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.fail(id, ReplicationError::Unexpected(format!("pipeline panicked: {message}")));
            }
        }
    }
}

fn validate_source_url(source_url: &str) -> Result<(), RunnerError> {
    let invalid =
        || RunnerError::InvalidInput(format!("source_url must be an http(s) URL, got '{source_url}'"));
    let parsed = url::Url::parse(source_url).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
