// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::color;
use clap::ValueEnum;
use rp_compare::Comparison;
use rp_core::{CrawlJob, Event, RecordStatus, ReplicationJob};
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON, or as text via `text`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", text(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// One line per job event, or `None` for events not worth showing.
pub fn event_line(event: &Event) -> Option<String> {
    match event {
        Event::StatusChanged { to, current_iteration, .. } => Some(format!(
            "{} {} (iteration {})",
            color::context("status"),
            color::status(&to.to_string()),
            current_iteration
        )),
        Event::SimilarityUpdated { iteration, score, .. } => Some(format!(
            "{} {score}% after iteration {iteration}",
            color::context("similarity")
        )),
        Event::JobFailed { kind, message, .. } => {
            Some(format!("{} {kind}: {message}", color::status("failed")))
        }
        Event::CrawlProgress { processed, total, .. } => {
            Some(format!("{} {processed}/{total}", color::context("progress")))
        }
        _ => None,
    }
}

pub fn job_text(job: &ReplicationJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", color::header("Job:"), job.id));
    out.push_str(&format!("  Source:     {}\n", job.source_url));
    out.push_str(&format!("  Status:     {}\n", color::status(&job.status.to_string())));
    if let Some(outcome) = job.outcome {
        out.push_str(&format!("  Outcome:    {}\n", color::status(&outcome.to_string())));
    }
    out.push_str(&format!("  Iterations: {}\n", job.current_iteration));
    if let Some(score) = job.similarity_score {
        out.push_str(&format!("  Similarity: {score}%\n"));
    }
    if job.extra_refinements > 0 {
        out.push_str(&format!("  Refined:    {} extra pass(es)\n", job.extra_refinements));
    }
    out.push_str(&format!("  Output:     {}\n", job.output_dir));
    if let Some(err) = &job.error_message {
        out.push_str(&format!("  Error:      {err}\n"));
    }
    out
}

pub fn crawl_text(crawl: &CrawlJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", color::header("Crawl:"), crawl.id));
    out.push_str(&format!("  Pages:     {}-{}\n", crawl.start_page, crawl.end_page));
    out.push_str(&format!("  Status:    {}\n", color::status(&crawl.status.to_string())));
    out.push_str(&format!("  Processed: {}/{}\n", crawl.processed_items, crawl.total_items));
    for status in [RecordStatus::Success, RecordStatus::Skipped, RecordStatus::Failed] {
        out.push_str(&format!("  {:<10} {}\n", format!("{status}:"), crawl.count(status)));
    }
    if let Some(err) = &crawl.error_message {
        out.push_str(&format!("  Error:     {err}\n"));
    }
    out
}

/// Summary line followed by the full markdown report.
pub fn comparison_text(cmp: &Comparison, report: &str) -> String {
    format!(
        "{} {}% ({} regions, {:.2}% pixels differ)\n\n{report}",
        color::header("Similarity:"),
        cmp.similarity,
        cmp.regions.len(),
        cmp.diff_percentage()
    )
}
