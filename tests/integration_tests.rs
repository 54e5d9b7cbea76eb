//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: token chain → HTTP requests → collected
//! records → JSON output and report

use chainfetch::cli::{Cli, RunStatus, Runner};
use chainfetch::output::read_records;
use chainfetch::report::analyze;
use chainfetch::{FetchFailure, HarvestConfig, PaginationEngine};
use clap::Parser;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "next_product_token";

fn product(id: u32, category: &str, price: f64, next: Option<&str>) -> Value {
    let mut body = json!({
        "product_id": id,
        "product_name": format!("Product {id}"),
        "category": category,
        "price": price,
    });
    if let Some(next) = next {
        body[TOKEN] = json!(next);
    }
    body
}

fn config_for(server: &MockServer) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.source.base_url = format!("{}/product", server.uri());
    config.retry.initial_backoff_ms = 10;
    config
}

async fn requests_for_token(server: &MockServer, token: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == TOKEN && v == token))
        .count()
}

/// Serves `1 -> B -> 2 -> C -> 3`
async fn mount_chain(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param_is_missing(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(1, "Fashion", 120.0, Some("B"))))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param(TOKEN, "B"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product(2, "Toys & Games", 30.0, Some("C"))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param(TOKEN, "C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(3, "Toys & Games", 45.0, None)))
        .mount(server)
        .await;
}

// ============================================================================
// Engine over HTTP
// ============================================================================

#[tokio::test]
async fn test_full_chain_with_one_busy_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param(TOKEN, "B"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_chain(&server).await;

    let outcome = PaginationEngine::from_harvest(&config_for(&server))
        .unwrap()
        .fetch_all()
        .await;

    assert!(outcome.is_clean(), "failures: {:?}", outcome.failures);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(requests_for_token(&server, "B").await, 2);
    assert_eq!(requests_for_token(&server, "C").await, 1);
}

#[tokio::test]
async fn test_bad_request_halts_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param_is_missing(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(1, "Fashion", 10.0, Some("B"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param(TOKEN, "B"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad token"))
        .mount(&server)
        .await;

    let outcome = PaginationEngine::from_harvest(&config_for(&server))
        .unwrap()
        .fetch_all()
        .await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(
        outcome.failures[0].token.as_ref().map(|t| t.as_str()),
        Some("B")
    );
    assert!(matches!(outcome.failures[0].failure, FetchFailure::Fatal { .. }));
    assert_eq!(requests_for_token(&server, "B").await, 1);
}

#[tokio::test]
async fn test_persistently_busy_token_exhausts_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.retry.max_attempts = 3;
    config.retry.initial_backoff_ms = 1;

    let outcome = PaginationEngine::from_harvest(&config)
        .unwrap()
        .fetch_all()
        .await;

    assert!(outcome.records.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(matches!(
        outcome.failures[0].failure,
        FetchFailure::ExhaustedRetries { attempts: 3, .. }
    ));
    assert_eq!(outcome.failures[0].token, None);
}

#[tokio::test]
async fn test_report_over_harvested_records() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    let config = config_for(&server);

    let outcome = PaginationEngine::from_harvest(&config)
        .unwrap()
        .fetch_all()
        .await;
    let report = analyze(outcome.records.records(), &config.report).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.category_counts.get("Toys & Games"), Some(&2));
    assert_eq!(report.most_expensive.unwrap().id, "1");
    assert_eq!(report.average_price, Some(37.5));
}

// ============================================================================
// CLI
// ============================================================================

#[tokio::test]
async fn test_cli_run_persists_records() {
    let server = MockServer::start().await;
    mount_chain(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products.json");
    let base_url = format!("{}/product", server.uri());

    let cli = Cli::try_parse_from([
        "chainfetch",
        "run",
        "--base-url",
        base_url.as_str(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let status = Runner::new(cli).run().await.unwrap();

    assert_eq!(status, RunStatus::Complete);
    let records = read_records(&output).await.unwrap();
    assert_eq!(records.len(), 3);
    let mut ids: Vec<u64> = records
        .iter()
        .filter_map(|r| r["product_id"].as_u64())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_cli_run_with_failures_still_persists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param_is_missing(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(1, "Fashion", 10.0, Some("B"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param(TOKEN, "B"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("partial.json");
    let base_url = format!("{}/product", server.uri());

    let cli = Cli::try_parse_from([
        "chainfetch",
        "run",
        "--base-url",
        base_url.as_str(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let status = Runner::new(cli).run().await.unwrap();

    assert_eq!(status, RunStatus::CompletedWithFailures);
    assert_eq!(status.exit_code(), 2);
    assert_eq!(read_records(&output).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cli_run_reports_when_output_cannot_be_saved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product(1, "Fashion", 10.0, None)))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("occupied");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("keep.txt"), "x").unwrap();
    let base_url = format!("{}/product", server.uri());

    let cli = Cli::try_parse_from([
        "chainfetch",
        "run",
        "--base-url",
        base_url.as_str(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let status = Runner::new(cli).run().await.unwrap();

    assert_eq!(status, RunStatus::NotPersisted);
    assert_eq!(status.exit_code(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(!output.with_extension("tmp").exists());
}
