// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn status_event() -> Event {
    Event::StatusChanged {
        id: JobId::from_string("rpl-abc"),
        from: ReplicationStatus::Generating,
        to: ReplicationStatus::Verifying1,
        current_iteration: 1,
    }
}

#[test]
fn serializes_with_type_tag() {
    let json = serde_json::to_value(status_event()).unwrap();
    assert_eq!(json["type"], "job:status");
    assert_eq!(json["from"], "generating");
    assert_eq!(json["to"], "verifying_1");
}

#[test]
fn deserializes_from_tagged_json() {
    let json = r#"{"type":"job:similarity","id":"rpl-abc","iteration":2,"score":87.5}"#;
    let event: Event = serde_json::from_str(json).unwrap();
    assert_eq!(
        event,
        Event::SimilarityUpdated { id: JobId::from_string("rpl-abc"), iteration: 2, score: 87.5 }
    );
}

#[test]
fn log_summary_names_transition() {
    assert_eq!(status_event().log_summary(), "job:status id=rpl-abc generating->verifying_1");
}

#[test]
fn crawl_events_have_no_job_id() {
    let event = Event::CrawlProgress { id: CrawlJobId::from_string("crw-1"), processed: 1, total: 2 };
    assert!(event.job_id().is_none());
    assert_eq!(status_event().job_id().map(|id| id.as_str()), Some("rpl-abc"));
}

#[test]
fn name_matches_serialized_tag() {
    let events = [
        status_event(),
        Event::JobFailed {
            id: JobId::from_string("rpl-abc"),
            kind: ErrorKind::Generation,
            message: "boom".to_string(),
        },
        Event::CrawlStatusChanged {
            id: CrawlJobId::from_string("crw-1"),
            status: CrawlStatus::Running,
        },
    ];
    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}
