// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::{
    CompletionOutcome, CrawlRecord, CrawlStatus, FakeClock, JobId, ReplicationStatus,
};
use serial_test::serial;

fn plain() {
    std::env::set_var("NO_COLOR", "1");
}

#[test]
#[serial]
fn job_text_shows_outcome_and_error() {
    plain();
    let job = ReplicationJob::builder()
        .status(ReplicationStatus::Completed)
        .outcome(Some(CompletionOutcome::BelowThreshold))
        .current_iteration(3)
        .similarity_score(Some(91.5))
        .build();

    let text = job_text(&job);
    assert!(text.contains("Job: rpl-test"));
    assert!(text.contains("Status:     completed"));
    assert!(text.contains("Outcome:    below_threshold"));
    assert!(text.contains("Similarity: 91.5%"));
    assert!(!text.contains("Error:"));

    let failed = ReplicationJob::builder()
        .status(ReplicationStatus::Failed)
        .error_message("response is missing required field 'css'")
        .build();
    assert!(job_text(&failed).contains("Error:      response is missing required field 'css'"));
}

#[test]
#[serial]
fn crawl_text_counts_records() {
    plain();
    let mut crawl = CrawlJob::new(1, 2, "crawl_a", &FakeClock::new());
    crawl.status = CrawlStatus::Completed;
    crawl.total_items = 2;
    crawl.processed_items = 2;
    crawl.records = vec![
        CrawlRecord::builder().status(RecordStatus::Success).build(),
        CrawlRecord::builder().id("rec-b").status(RecordStatus::Skipped).build(),
    ];

    let text = crawl_text(&crawl);
    assert!(text.contains("Pages:     1-2"));
    assert!(text.contains("Processed: 2/2"));
    assert!(text.contains("success:   1"));
    assert!(text.contains("skipped:   1"));
    assert!(text.contains("failed:    0"));
}

#[test]
#[serial]
fn event_lines_cover_progress_events() {
    plain();
    let id = JobId::from("rpl-a");
    let status = Event::StatusChanged {
        id: id.clone(),
        from: ReplicationStatus::Generating,
        to: ReplicationStatus::Verifying2,
        current_iteration: 2,
    };
    assert_eq!(event_line(&status).unwrap(), "status verifying_2 (iteration 2)");

    let score = Event::SimilarityUpdated { id: id.clone(), iteration: 1, score: 88.25 };
    assert_eq!(event_line(&score).unwrap(), "similarity 88.25% after iteration 1");

    let created = Event::JobCreated { id, source_url: "https://example.com/".into(), output_dir: "a".into() };
    assert!(event_line(&created).is_none());
}

#[test]
fn json_format_serializes_value() {
    let job = ReplicationJob::builder().build();
    let result = format_or_json(OutputFormat::Json, &job, |_| unreachable!());
    assert!(result.is_ok());
}
