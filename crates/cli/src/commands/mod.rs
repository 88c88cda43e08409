// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod compare;
pub mod crawl;
pub mod refine;
pub mod replicate;

use crate::config::AppConfig;
use crate::exit_error::{ExitError, INVALID_INPUT, JOB_FAILED};
use crate::output::{event_line, format_or_json, job_text, OutputFormat};
use anyhow::Result;
use rp_adapters::{AnyGenerator, ChromiumCapture};
use rp_core::{Clock, Event, JobId, ReplicationJob, ReplicationStatus, SystemClock};
use rp_engine::{Runner, RunnerError};
use tokio::sync::broadcast::{self, error::RecvError};

pub(crate) type LiveRunner = Runner<ChromiumCapture, AnyGenerator, SystemClock>;

pub(crate) fn live_runner(config: &AppConfig) -> Result<LiveRunner> {
    let capture = ChromiumCapture::new(config.browser());
    let generator = AnyGenerator::from_settings(&config.generator())?;
    Ok(Runner::new(capture, generator, SystemClock, config.runner.clone()))
}

/// Rejected arguments exit with [`INVALID_INPUT`]; other API errors bubble up.
pub(crate) fn reject(err: RunnerError) -> anyhow::Error {
    match err {
        RunnerError::InvalidInput(message) => ExitError::new(INVALID_INPUT, message).into(),
        err @ RunnerError::WrongStatus { .. } => ExitError::new(INVALID_INPUT, err.to_string()).into(),
        err => err.into(),
    }
}

/// Print the job's events until it is terminal.
pub(crate) async fn follow<C, G, K>(
    runner: &Runner<C, G, K>,
    events: &mut broadcast::Receiver<Event>,
    id: &JobId,
    format: OutputFormat,
) -> Result<ReplicationJob>
where
    C: rp_adapters::CaptureAdapter,
    G: rp_adapters::GeneratorAdapter,
    K: Clock,
{
    let done = runner.wait_for_terminal(id);
    tokio::pin!(done);
    loop {
        tokio::select! {
            job = &mut done => return Ok(job?),
            event = events.recv() => match event {
                Ok(event) if event.job_id() == Some(id) => {
                    if let (OutputFormat::Text, Some(line)) = (format, event_line(&event)) {
                        println!("{line}");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => return Ok(done.await?),
            },
        }
    }
}

/// Print the final job; a failed job becomes a non-zero exit.
pub(crate) fn finish(job: &ReplicationJob, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Text {
        println!();
    }
    format_or_json(format, job, job_text)?;
    if job.status == ReplicationStatus::Failed {
        let message = job.error_message.clone().unwrap_or_else(|| "replication failed".to_string());
        return Err(ExitError::new(JOB_FAILED, message).into());
    }
    Ok(())
}
