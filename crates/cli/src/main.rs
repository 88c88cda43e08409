// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `replica`: replicate web pages as static HTML/CSS/JS and crawl listing
//! sites.

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{compare, crawl, refine, replicate};
use config::AppConfig;
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "replica",
    version,
    long_version = env::LONG_VERSION,
    about = "Replicate a web page as static HTML/CSS/JS, verified by screenshot",
    styles = color::styles()
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: $REPLICA_CONFIG, else ./replica.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for job output
    #[arg(long, global = true)]
    output_base: Option<PathBuf>,

    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Replicate a page, refining until it matches or the budget runs out
    Replicate(replicate::ReplicateArgs),
    /// Run one more refinement pass on a completed job
    Refine(refine::RefineArgs),
    /// Compare two screenshots and print the verification report
    Compare(compare::CompareArgs),
    /// Crawl listing pages and capture every linked shop
    Crawl(crawl::CrawlArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        if let Some(exit) = err.downcast_ref::<ExitError>() {
            eprintln!("error: {exit}");
            std::process::exit(exit.code);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format;
    let load = || -> Result<AppConfig> {
        let path = cli.config.clone().or_else(env::config_path);
        let mut config = AppConfig::load(path.as_deref())?;
        if let Some(base) = &cli.output_base {
            config.runner.output_base = base.clone();
        }
        tracing::debug!(output_base = %config.runner.output_base.display(), "configuration loaded");
        Ok(config)
    };

    match cli.command {
        Command::Replicate(args) => replicate::handle(args, &load()?, format).await,
        Command::Refine(args) => refine::handle(args, &load()?, format).await,
        Command::Crawl(args) => crawl::handle(args, &load()?, format).await,
        Command::Compare(args) => compare::handle(args, format),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
