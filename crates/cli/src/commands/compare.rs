// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `replica compare` - score two screenshots

use crate::output::{comparison_text, format_or_json, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use rp_compare::Comparison;
use rp_core::MAX_ITERATIONS;
use rp_engine::diff_report;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct CompareArgs {
    /// Reference screenshot
    pub source: PathBuf,

    /// Screenshot to score against the reference
    pub candidate: PathBuf,

    /// Iteration number shown in the report
    #[arg(long, default_value_t = 1)]
    pub iteration: u32,
}

#[derive(Serialize)]
struct CompareOutput {
    #[serde(flatten)]
    comparison: Comparison,
    report: String,
}

pub fn handle(args: CompareArgs, format: OutputFormat) -> Result<()> {
    let source = std::fs::read(&args.source)
        .with_context(|| format!("failed to read {}", args.source.display()))?;
    let candidate = std::fs::read(&args.candidate)
        .with_context(|| format!("failed to read {}", args.candidate.display()))?;

    let comparison = rp_compare::compare(&source, &candidate)?;
    let report = diff_report(&comparison, args.iteration, MAX_ITERATIONS);
    let output = CompareOutput { comparison, report };
    format_or_json(format, &output, |o| comparison_text(&o.comparison, &o.report))
}
