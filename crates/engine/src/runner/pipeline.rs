// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scrape → generate → verify → refine loop.

use super::Runner;
use crate::artifacts::{write_artifacts, ARTIFACT_SUBDIR};
use crate::payload::degrade;
use rp_adapters::{
    hints_from_image, CaptureAdapter, CaptureError, DesignHints, GenerateError, GeneratorAdapter,
    ScrapedPage,
};
use rp_core::artifact::{CSS_FILENAME, HTML_FILENAME, JS_FILENAME};
use rp_core::{
    ArtifactTriple, Clock, CompletionOutcome, Event, GenerationMode, JobId, ReplicationError,
    ReplicationJob, ReplicationStatus,
};
use rp_storage::StoreError;
use std::path::{Path, PathBuf};

fn generation_error(e: GenerateError) -> ReplicationError {
    ReplicationError::Generation(e.to_string())
}

impl<C, G, K> Runner<C, G, K>
where
    C: CaptureAdapter,
    G: GeneratorAdapter,
    K: Clock,
{
    /// Full pipeline of one job, from `Pending` to `Completed`.
    pub(super) async fn execute(&self, id: &JobId) -> Result<(), ReplicationError> {
        let job = self.snapshot(id)?;
        let job_dir = self.inner.store.dir_for(&job.output_dir);
        tracing::info!(job_id = %id, source_url = %job.source_url, "replication started");

        let mut triple = match GenerationMode::select(job.image_ref.as_deref()) {
            GenerationMode::FromUrl => {
                self.transition(id, ReplicationStatus::Scraping)?;
                let mut page = self.scrape(&job.source_url).await?;
                if degrade(&mut page, self.inner.config.payload_limit) {
                    self.inner.logger.append(&job.output_dir, "scraping", "payload degraded");
                }
                self.transition(id, ReplicationStatus::Generating)?;
                self.inner.generator.generate(&page).await.map_err(generation_error)?
            }
            GenerationMode::FromImage(image) => {
                self.transition(id, ReplicationStatus::Generating)?;
                let hints = image_hints(&image).await;
                self.inner
                    .generator
                    .generate_from_image(&image, hints.as_ref())
                    .await
                    .map_err(generation_error)?
            }
        };
        let mut html = self.persist(id, &job_dir, &triple)?;

        let limit = self.inner.config.iteration_limit();
        let threshold = self.inner.config.similarity_threshold;
        let mut outcome = CompletionOutcome::BelowThreshold;
        for iteration in 1..=limit {
            let verifying = ReplicationStatus::verifying(iteration).ok_or_else(|| {
                ReplicationError::Unexpected(format!("no verification state for iteration {iteration}"))
            })?;
            self.transition(id, verifying)?;
            let result = self.inner.verifier.verify(&job.source_url, &html, iteration).await?;
            self.record_similarity(id, iteration, result.similarity, &result.report)?;

            if result.similarity >= threshold {
                tracing::info!(job_id = %id, iteration, similarity = result.similarity, "threshold reached");
                outcome = CompletionOutcome::ThresholdMet;
                break;
            }
            if iteration < limit {
                self.transition(id, ReplicationStatus::Generating)?;
                triple = self
                    .inner
                    .generator
                    .refine(&triple, result.similarity, &result.report)
                    .await
                    .map_err(generation_error)?;
                html = self.persist(id, &job_dir, &triple)?;
            }
        }

        self.complete(id, outcome)
    }

    /// One on-demand pass for a job already moved to `Generating`.
    pub(super) async fn refine_pass(&self, id: &JobId) -> Result<(), ReplicationError> {
        let job = self.snapshot(id)?;
        let job_dir = self.inner.store.dir_for(&job.output_dir);
        let iteration = job.current_iteration.max(1);
        let verifying = ReplicationStatus::verifying(iteration).ok_or_else(|| {
            ReplicationError::Unexpected(format!("no verification state for iteration {iteration}"))
        })?;

        let current = read_artifacts(&job_dir)?;
        let html = job_dir.join(ARTIFACT_SUBDIR).join(HTML_FILENAME);
        let feedback = self.inner.verifier.verify(&job.source_url, &html, iteration).await?;
        let triple = self
            .inner
            .generator
            .refine(&current, feedback.similarity, &feedback.report)
            .await
            .map_err(generation_error)?;
        let html = self.persist(id, &job_dir, &triple)?;

        self.transition(id, verifying)?;
        let result = self.inner.verifier.verify(&job.source_url, &html, iteration).await?;
        self.record_similarity(id, iteration, result.similarity, &result.report)?;

        let outcome = if result.similarity >= self.inner.config.similarity_threshold {
            CompletionOutcome::ThresholdMet
        } else {
            CompletionOutcome::BelowThreshold
        };
        self.complete(id, outcome)
    }

    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ReplicationError> {
        let capture = &self.inner.capture;
        self.inner
            .config
            .retry
            .run("scrape", || capture.scrape(url), CaptureError::is_retryable)
            .await
            .map_err(|e| ReplicationError::Scraping(e.to_string()))
    }

    fn persist(
        &self,
        id: &JobId,
        job_dir: &Path,
        triple: &ArtifactTriple,
    ) -> Result<PathBuf, ReplicationError> {
        let html = write_artifacts(job_dir, triple).map_err(|e| {
            ReplicationError::Unexpected(format!("failed to write artifacts: {e}"))
        })?;
        let now = self.inner.clock.epoch_ms();
        let (_, snapshot) = self.mutate(id, |j| j.record_artifacts(now))?;
        self.inner.events.publish(Event::ArtifactsWritten {
            id: id.clone(),
            dir: job_dir.join(ARTIFACT_SUBDIR),
        });
        self.inner.logger.append(&snapshot.output_dir, &snapshot.status.to_string(), "artifacts written");
        Ok(html)
    }

    fn record_similarity(
        &self,
        id: &JobId,
        iteration: u32,
        score: f64,
        report: &str,
    ) -> Result<(), ReplicationError> {
        let now = self.inner.clock.epoch_ms();
        let (_, snapshot) = self.mutate(id, |j| j.record_similarity(score, now))?;
        let stage = snapshot.status.to_string();
        self.inner.logger.append(&snapshot.output_dir, &stage, &format!("similarity {score}%"));
        self.inner.logger.append_fenced(&snapshot.output_dir, &stage, "report", report);
        self.inner.events.publish(Event::SimilarityUpdated { id: id.clone(), iteration, score });
        Ok(())
    }

    fn transition(&self, id: &JobId, next: ReplicationStatus) -> Result<(), ReplicationError> {
        let now = self.inner.clock.epoch_ms();
        let (moved, snapshot) = self.mutate(id, |j| j.advance(next, now))?;
        let from = moved?;
        self.announce_transition(&snapshot, from);
        Ok(())
    }

    fn complete(&self, id: &JobId, outcome: CompletionOutcome) -> Result<(), ReplicationError> {
        let now = self.inner.clock.epoch_ms();
        let (moved, snapshot) = self.mutate(id, |j| j.complete(outcome, now))?;
        let from = moved?;
        self.announce_transition(&snapshot, from);
        tracing::info!(
            job_id = %id,
            %outcome,
            similarity = ?snapshot.similarity_score,
            iterations = snapshot.current_iteration,
            "replication completed"
        );
        self.inner.events.publish(Event::JobCompleted {
            id: id.clone(),
            outcome,
            similarity: snapshot.similarity_score,
        });
        Ok(())
    }

    /// Move a job to `Failed` with the error's message. A job that is already
    /// terminal keeps its status.
    pub(super) fn fail(&self, id: &JobId, err: ReplicationError) {
        let now = self.inner.clock.epoch_ms();
        let message = err.message().to_string();
        match self.mutate(id, |j| j.fail(message.clone(), now)) {
            Ok((Ok(from), snapshot)) => {
                self.announce_transition(&snapshot, from);
                tracing::error!(job_id = %id, kind = %err.kind(), error = %message, "replication failed");
                self.inner.logger.append(
                    &snapshot.output_dir,
                    "failed",
                    &format!("{}: {message}", err.kind()),
                );
                self.inner.events.publish(Event::JobFailed { id: id.clone(), kind: err.kind(), message });
            }
            Ok((Err(e), _)) => {
                tracing::warn!(job_id = %id, error = %e, dropped = %message, "failure not recorded");
            }
            Err(e) => tracing::error!(job_id = %id, error = %e, "failed job is missing"),
        }
    }

    pub(super) fn announce_transition(&self, job: &ReplicationJob, from: ReplicationStatus) {
        tracing::info!(job_id = %job.id, %from, to = %job.status, iteration = job.current_iteration, "status changed");
        self.inner.logger.append(
            &job.output_dir,
            &job.status.to_string(),
            &format!("status {from} -> {}", job.status),
        );
        self.inner.events.publish(Event::StatusChanged {
            id: job.id.clone(),
            from,
            to: job.status,
            current_iteration: job.current_iteration,
        });
    }

    /// Apply `f` to the stored job.
    ///
    /// The in-memory change stands even if writing the record file fails;
    /// that failure is logged and the next write catches the file up.
    pub(super) fn mutate<R>(
        &self,
        id: &JobId,
        f: impl FnOnce(&mut ReplicationJob) -> R,
    ) -> Result<(R, ReplicationJob), ReplicationError> {
        let mut applied = None;
        let result = self.inner.store.update(id, |job| {
            applied = Some((f(job), job.clone()));
        });
        self.inner.changed.notify_waiters();
        match (result, applied) {
            (Ok(_), Some(done)) => Ok(done),
            (Err(e), Some(done)) => {
                tracing::error!(job_id = %id, error = %e, "failed to persist job record");
                Ok(done)
            }
            (Err(StoreError::NotFound(_)), None) | (Ok(_), None) => {
                Err(ReplicationError::Unexpected(format!("job {id} is not registered")))
            }
            (Err(e), None) => Err(ReplicationError::Unexpected(e.to_string())),
        }
    }

    fn snapshot(&self, id: &JobId) -> Result<ReplicationJob, ReplicationError> {
        self.get_job(id)
            .ok_or_else(|| ReplicationError::Unexpected(format!("job {id} is not registered")))
    }
}

/// Colour hints from a reference image; absent when it cannot be read.
async fn image_hints(path: &Path) -> Option<DesignHints> {
    let path = path.to_path_buf();
    let hints = tokio::task::spawn_blocking(move || image::open(&path).map(|img| hints_from_image(&img)))
        .await;
    match hints {
        Ok(Ok(hints)) if !hints.is_empty() => Some(hints),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not extract design hints from image");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "design hint task failed");
            None
        }
    }
}

/// The triple last written for a job.
fn read_artifacts(job_dir: &Path) -> Result<ArtifactTriple, ReplicationError> {
    let dir = job_dir.join(ARTIFACT_SUBDIR);
    let read = |name: &str| {
        std::fs::read_to_string(dir.join(name)).map_err(|e| {
            ReplicationError::Unexpected(format!("cannot read previous {name}: {e}"))
        })
    };
    Ok(ArtifactTriple { html: read(HTML_FILENAME)?, css: read(CSS_FILENAME)?, js: read(JS_FILENAME)? })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
