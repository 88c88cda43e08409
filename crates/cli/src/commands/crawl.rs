// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica crawl` - capture every shop on a range of listing pages

use super::reject;
use crate::config::AppConfig;
use crate::exit_error::{ExitError, JOB_FAILED};
use crate::output::{crawl_text, event_line, format_or_json, OutputFormat};
use anyhow::Result;
use clap::Args;
use rp_adapters::ChromiumCrawler;
use rp_core::{CrawlStatus, SystemClock};
use rp_engine::CrawlRunner;

#[derive(Args)]
pub struct CrawlArgs {
    /// First listing page (1-based)
    #[arg(long, default_value_t = 1)]
    pub start_page: u32,

    /// Last listing page, inclusive
    #[arg(long)]
    pub end_page: u32,

    /// Directory under the output base for screenshots and the report
    #[arg(long)]
    pub output_dir: String,
}

pub async fn handle(args: CrawlArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let settings = config.crawl();
    let runner =
        CrawlRunner::new(ChromiumCrawler::new(settings.clone()), SystemClock, settings, &config.runner);

    let crawl = runner.create_crawl(args.start_page, args.end_page, &args.output_dir).map_err(reject)?;
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

    runner.start_crawl(&crawl.id).map_err(reject)?;
    let done = runner.wait_for_crawl(&crawl.id).await?;
    if let Some(printer) = printer {
        printer.abort();
    }

    if format == OutputFormat::Text {
        println!();
    }
    format_or_json(format, &done, crawl_text)?;
    if format == OutputFormat::Text {
        println!("  Report:    {}", runner.report_path(&done).display());
    }
    if done.status == CrawlStatus::Failed {
        let message = done.error_message.clone().unwrap_or_else(|| "crawl failed".to_string());
        return Err(ExitError::new(JOB_FAILED, message).into());
    }
    Ok(())
}
