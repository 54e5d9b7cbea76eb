//! Tests for the collector

use super::*;
use crate::pagination::{FetchFailure, Page};
use crate::types::{ContinuationToken, RecordId};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn page(id: &str, price: f64) -> Page {
    Page::new(
        RecordId::new(id),
        json!({"product_id": id, "price": price}),
        None,
    )
}

// ============================================================================
// ResultSet
// ============================================================================

#[test]
fn test_result_set_keeps_arrival_order() {
    let set: ResultSet = [
        (RecordId::new("b"), json!(1)),
        (RecordId::new("a"), json!(2)),
        (RecordId::new("c"), json!(3)),
    ]
    .into_iter()
    .collect();

    let ids: Vec<&str> = set.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(set.into_records(), vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_result_set_replace_keeps_position() {
    let mut set = ResultSet::new();
    assert!(set.insert(RecordId::new("a"), json!("old")));
    assert!(set.insert(RecordId::new("b"), json!("b")));
    assert!(!set.insert(RecordId::new("a"), json!("new")));

    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&RecordId::new("a")), Some(&json!("new")));
    let records: Vec<_> = set.records().cloned().collect();
    assert_eq!(records, vec![json!("new"), json!("b")]);
}

#[test]
fn test_result_set_empty() {
    let set = ResultSet::new();
    assert!(set.is_empty());
    assert!(!set.contains(&RecordId::new("x")));
    assert_eq!(set.iter().count(), 0);
}

// ============================================================================
// Collector
// ============================================================================

#[test]
fn test_absorb_is_idempotent_per_id() {
    let collector = Collector::new();

    assert_eq!(
        collector.absorb(page("1", 10.0)),
        AbsorbOutcome::Inserted { total: 1 }
    );
    assert_eq!(
        collector.absorb(page("2", 20.0)),
        AbsorbOutcome::Inserted { total: 2 }
    );
    let outcome = collector.absorb(page("1", 15.0));
    assert_eq!(outcome, AbsorbOutcome::Replaced { total: 2 });
    assert!(outcome.is_replaced());
    assert_eq!(outcome.total(), 2);

    let (records, failures) = collector.finalize();
    assert_eq!(records.len(), 2);
    assert!(failures.is_empty());
    assert_eq!(
        records.get(&RecordId::new("1")),
        Some(&json!({"product_id": "1", "price": 15.0}))
    );
}

#[test]
fn test_record_failure() {
    let collector = Collector::new();
    collector.record_failure(None, FetchFailure::Cancelled);
    collector.record_failure(
        ContinuationToken::parse("B"),
        FetchFailure::Fatal {
            reason: "HTTP 400".to_string(),
        },
    );

    assert_eq!(collector.failure_count(), 2);
    let failures = collector.failures();
    assert_eq!(failures[0].token, None);
    assert_eq!(failures[1].token, ContinuationToken::parse("B"));
    assert_eq!(
        failures[1].to_string(),
        "token B: fatal failure: HTTP 400"
    );
}

#[test]
fn test_finalize_empties_collector() {
    let collector = Collector::new();
    collector.absorb(page("1", 1.0));
    collector.record_failure(None, FetchFailure::Cancelled);

    let (records, failures) = collector.finalize();
    assert_eq!(records.len(), 1);
    assert_eq!(failures.len(), 1);

    assert!(collector.is_empty());
    assert_eq!(collector.failure_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_absorbs() {
    let collector = Arc::new(Collector::new());
    let mut handles = Vec::new();

    for worker in 0..8 {
        let collector = Arc::clone(&collector);
        handles.push(tokio::spawn(async move {
            for n in 0..50 {
                // every worker writes ids 0..50, plus one id of its own
                collector.absorb(page(&n.to_string(), f64::from(worker)));
                tokio::task::yield_now().await;
            }
            collector.absorb(page(&format!("w{worker}"), 0.0));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(collector.len(), 58);
    let (records, _) = collector.finalize();
    assert_eq!(records.iter().count(), 58);
}
