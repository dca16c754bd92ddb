//! The worker strategy end to end: handshake, deferral, correlation, shutdown.

use std::sync::Arc;

use talpa::testing::SITE_INDEX_JSON;
use talpa::{source_for, LoadState, QueryExecutor, SearchError, WorkerExecutor};

use super::common::{fixture_site, CountingSource, GatedSource, SETTLE};

#[test]
fn worker_serves_ranked_ids_from_a_site_on_disk() {
    let (_dir, root) = fixture_site();
    let executor = WorkerExecutor::spawn(source_for(&root).unwrap(), &root);

    let ids = executor.query("api").wait_timeout(SETTLE).unwrap().unwrap();
    assert_eq!(ids, vec!["/api/", "/features/"]);
    assert_eq!(executor.load_state(), LoadState::Ready);
}

#[test]
fn queries_lined_up_behind_a_slow_load_all_settle_in_order() {
    let source = GatedSource::holding(SITE_INDEX_JSON.as_bytes().to_vec());
    let executor = WorkerExecutor::spawn(source.clone(), "/docs");

    let install = executor.query("install");
    let api = executor.query("api");
    let nothing = executor.query("missing");
    assert!(install.poll().is_none());
    assert!(api.poll().is_none());

    source.release();

    assert_eq!(
        install.wait_timeout(SETTLE).unwrap().unwrap(),
        vec!["/guides/install/"]
    );
    assert_eq!(
        api.wait_timeout(SETTLE).unwrap().unwrap(),
        vec!["/api/", "/features/"]
    );
    assert!(nothing.wait_timeout(SETTLE).unwrap().unwrap().is_empty());
}

#[test]
fn load_failure_reaches_every_query_without_refetching() {
    let source = Arc::new(CountingSource::failing("unreachable"));
    let executor = WorkerExecutor::spawn(source.clone(), "/docs");

    let mut outcomes = Vec::new();
    for text in ["features", "api", "install"] {
        outcomes.push(executor.query(text).wait_timeout(SETTLE).unwrap());
    }
    for outcome in &outcomes {
        match outcome {
            Err(SearchError::IndexLoad { base_path, message }) => {
                assert_eq!(base_path, "/docs");
                assert!(message.contains("unreachable"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    // One identical cached failure for all three, from a single fetch.
    assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(executor.load_state(), LoadState::Failed);
    assert_eq!(source.fetches(), 1);
}

#[test]
fn dropping_the_executor_still_settles_outstanding_queries() {
    let source = GatedSource::holding(SITE_INDEX_JSON.as_bytes().to_vec());
    let executor = WorkerExecutor::spawn(source.clone(), "/docs");

    let pending = executor.query("install");
    drop(executor);
    source.release();

    // Whichever side wins the race, the handle settles rather than hanging.
    assert!(pending.wait_timeout(SETTLE).is_some());
}

#[test]
fn request_ids_increase_per_dispatch() {
    let (_dir, root) = fixture_site();
    let executor = WorkerExecutor::spawn(source_for(&root).unwrap(), &root);

    let first = executor.query("features");
    let second = executor.query("api");
    assert!(second.request() > first.request());
}
