// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica replicate` - replicate one page

use super::{finish, follow, live_runner, reject};
use crate::config::AppConfig;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ReplicateArgs {
    /// Page to replicate (http or https)
    pub url: String,

    /// Directory under the output base for this job ([A-Za-z0-9_-]+)
    #[arg(long)]
    pub output_dir: String,

    /// Screenshot or mockup to generate from instead of the live page
    #[arg(long)]
    pub image: Option<PathBuf>,
}

pub async fn handle(args: ReplicateArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let runner = live_runner(config)?;
    let mut events = runner.subscribe();

    let job = runner.create_job(&args.url, &args.output_dir, args.image).map_err(reject)?;
    runner.start_replication(&job.id).map_err(reject)?;
    tracing::info!(job_id = %job.id, "replication started");

    let done = follow(&runner, &mut events, &job.id, format).await?;
    finish(&done, format)
}
