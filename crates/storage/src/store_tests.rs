// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rp_core::{CompletionOutcome, FakeClock, ReplicationStatus};

fn job(id: &str, dir: &str, created: u64) -> ReplicationJob {
    ReplicationJob::builder().id(id).output_dir(dir).created_at_ms(created).build()
}

#[test]
fn insert_writes_record_file() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    store.insert(job("rpl-a", "site_a", 1)).unwrap();

    assert!(base.path().join("site_a").join(JOB_RECORD_FILE).is_file());
    assert_eq!(store.get(&JobId::from("rpl-a")).unwrap().output_dir, "site_a");
    assert!(store.dir_in_use("site_a"));
    assert!(!store.dir_in_use("site_b"));
}

#[test]
fn update_writes_through_and_returns_snapshot() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    let id = JobId::from("rpl-a");
    store.insert(job("rpl-a", "site_a", 1)).unwrap();

    let (prev, snapshot) = store
        .update(&id, |j| j.advance(ReplicationStatus::Scraping, 2))
        .unwrap();
    assert_eq!(prev.unwrap(), ReplicationStatus::Pending);
    assert_eq!(snapshot.status, ReplicationStatus::Scraping);

    let on_disk: ReplicationJob = read_record(&store.record_path("site_a")).unwrap();
    assert_eq!(on_disk.status, ReplicationStatus::Scraping);
    assert_eq!(on_disk.updated_at_ms, 2);
}

#[test]
fn update_of_unknown_id_is_not_found() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    let err = store.update(&JobId::from("rpl-missing"), |_| ()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "rpl-missing"));
}

#[test]
fn list_is_oldest_first() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    store.insert(job("rpl-c", "c", 30)).unwrap();
    store.insert(job("rpl-a", "a", 10)).unwrap();
    store.insert(job("rpl-b", "b", 10)).unwrap();

    let ids: Vec<String> = store.list().iter().map(|j| j.id.to_string()).collect();
    assert_eq!(ids, vec!["rpl-a", "rpl-b", "rpl-c"]);
}

#[test]
fn clones_share_the_table() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    let other = store.clone();
    store.insert(job("rpl-a", "a", 1)).unwrap();
    assert!(other.contains(&JobId::from("rpl-a")));
}

#[test]
fn load_restores_a_completed_job() {
    let base = tempfile::tempdir().unwrap();
    let mut done = job("rpl-a", "site_a", 1);
    done.status = ReplicationStatus::Completed;
    done.outcome = Some(CompletionOutcome::BelowThreshold);
    done.similarity_score = Some(91.5);
    write_record(&base.path().join("site_a").join(JOB_RECORD_FILE), &done).unwrap();

    let store = JobStore::new(base.path());
    let loaded = store.load("site_a").unwrap();
    assert_eq!(loaded, done);
    assert!(store.contains(&loaded.id));
}

#[test]
fn load_prefers_registered_record() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    store.insert(job("rpl-a", "site_a", 1)).unwrap();
    store.update(&JobId::from("rpl-a"), |j| j.current_iteration = 2).unwrap();

    let mut stale = job("rpl-a", "site_a", 1);
    stale.current_iteration = 0;
    write_record(&store.record_path("site_a"), &stale).unwrap();

    assert_eq!(store.load("site_a").unwrap().current_iteration, 2);
}

#[test]
fn load_moves_corrupt_record_aside() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    let path = store.record_path("site_a");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "garbage").unwrap();

    assert!(matches!(store.load("site_a"), Err(StoreError::Json(_))));
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn load_of_missing_dir_is_not_found() {
    let base = tempfile::tempdir().unwrap();
    let store = JobStore::new(base.path());
    assert!(matches!(store.load("nothing_here"), Err(StoreError::NotFound(_))));
}

#[test]
fn crawl_jobs_use_their_own_file() {
    let base = tempfile::tempdir().unwrap();
    let store = CrawlStore::new(base.path());
    let crawl = CrawlJob::new(1, 2, "crawl_a", &FakeClock::new());
    let id = crawl.id.clone();
    store.insert(crawl).unwrap();

    store.update(&id, |c| c.total_items = 7).unwrap();
    let on_disk: CrawlJob = read_record(&base.path().join("crawl_a").join(CRAWL_RECORD_FILE)).unwrap();
    assert_eq!(on_disk.total_items, 7);
}
