// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica refine` - one more refinement pass for a finished job

use super::{finish, live_runner, reject};
use crate::config::AppConfig;
use crate::output::{event_line, OutputFormat};
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct RefineArgs {
    /// Output directory of a completed job
    pub output_dir: String,
}

pub async fn handle(args: RefineArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let runner = live_runner(config)?;
    let job = runner.load_job(&args.output_dir).map_err(reject)?;

    let mut events = runner.subscribe();
    let printer = (format == OutputFormat::Text).then(|| {
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if let Some(line) = event_line(&event) {
                    println!("{line}");
                }
            }
        })
    });

    let refined = runner.refine_with_url(&job.id).await.map_err(reject);
    if let Some(printer) = printer {
        printer.abort();
    }
    finish(&refined?, format)
}
