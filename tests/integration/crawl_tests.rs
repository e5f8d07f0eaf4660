//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! discover, crawl and deliver cycle over real HTTP.

use catalog_trawler::config::{load_config_with_hash, Config};
use catalog_trawler::{run_crawl, CategoryStop, TrawlError};
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a test configuration for the mock site and loads it from disk
///
/// Delays are zero so the tests run at full speed.
fn create_test_config(dir: &Path, base_url: &str, site: &str, output: &str) -> (Config, String) {
    let toml = format!(
        r#"
[site]
name = "mock catalog"
base-url = "{base_url}"
seed-template = "{{base}}/en/used-cars/{{slug}}"
{site}

[crawler]
max-pages = 5
seed = 7

[fetcher]
attempts-per-fetch = 3
retry-delay-ms = 0
retry-jitter-ms = 0
escalate-to-alt = false
timeout-secs = 5

[pacing]
page-delay-min-ms = 0
page-delay-max-ms = 0
category-delay-min-ms = 0
category-delay-max-ms = 0

[output]
{output}
"#
    );

    let path = dir.join("trawler.toml");
    std::fs::write(&path, toml).expect("Failed to write config");
    load_config_with_hash(&path).expect("Failed to load config")
}

fn listing_page(models: &[&str]) -> String {
    let cards: String = models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            format!(
                r#"<div class="car-item">
                    <a href="/car/{i}"><h2>{model}</h2></a>
                    <span class="price">{price} AED</span>
                    <span class="mileage">{km} km</span>
                </div>"#,
                price = 50_000 + i * 1_000,
                km = 10_000 * (i + 1),
            )
        })
        .collect();
    format!("<html><body><main>{}</main></body></html>", cards)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_listing(server: &MockServer, slug: &str, page: &str, models: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/en/used-cars/{}", slug)))
        .and(query_param("page", page))
        .respond_with(html(listing_page(models)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_trawl_with_api_discovery() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/brands"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"{"brands": [{"name": "Toyota", "slug": "toyota"}, {"name": "Kia", "slug": "kia"}]}"#,
                )
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;

    mount_listing(&mock_server, "toyota", "1", &["Corolla 2019", "Yaris"]).await;
    mount_listing(&mock_server, "toyota", "2", &["Camry 2021"]).await;
    mount_listing(&mock_server, "toyota", "3", &[]).await;
    mount_listing(&mock_server, "kia", "1", &["Rio"]).await;
    mount_listing(&mock_server, "kia", "2", &[]).await;

    let json_path = dir.path().join("out/records.json");
    let summary_path = dir.path().join("summary.md");
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = ["/api/brands"]
listing-roots = []
fallback-categories = ["audi"]"#,
        &format!(
            "json-path = {:?}\nsummary-path = {:?}",
            json_path.display().to_string(),
            summary_path.display().to_string()
        ),
    );

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(!report.cancelled);
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.categories[0].name, "Toyota");
    assert_eq!(report.categories[0].pages_fetched, 3);
    assert_eq!(report.categories[0].stop, CategoryStop::NoRecords);
    assert_eq!(report.categories[1].records, 1);

    let content = std::fs::read_to_string(&json_path).expect("JSON output missing");
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 4);

    assert_eq!(records[0]["brand"], "Toyota");
    assert_eq!(records[0]["model"], "Corolla 2019");
    assert_eq!(records[0]["year"], "2019");
    assert_eq!(records[0]["price"], "50000 AED");
    assert_eq!(
        records[0]["url"],
        format!("{}/car/0", mock_server.uri()).as_str()
    );
    assert_eq!(records[2]["model"], "Camry 2021");
    assert_eq!(records[3]["brand"], "Kia");
    assert!(content.trim_start().starts_with("[\n  {\n    \"brand\": \"Toyota\""));

    let summary = std::fs::read_to_string(&summary_path).expect("Summary missing");
    assert!(summary.contains("# Catalog Trawl Summary: mock catalog"));
    assert!(summary.contains("- **Total Records**: 4"));
}

#[tokio::test]
async fn test_html_discovery_into_sqlite() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/en/brands"))
        .respond_with(html(
            r#"<html><body><ul class="brands-list">
                <li><a href="/en/used-cars/audi">Audi</a></li>
                <li><a href="/en/used-cars/bmw">BMW</a></li>
            </ul></body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    mount_listing(&mock_server, "audi", "1", &["A4", "Q5"]).await;
    mount_listing(&mock_server, "audi", "2", &[]).await;
    mount_listing(&mock_server, "bmw", "1", &["X3"]).await;
    mount_listing(&mock_server, "bmw", "2", &[]).await;

    let db_path = dir.path().join("records.db");
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = ["/en/brands"]
fallback-categories = ["kia"]"#,
        &format!("database-path = {:?}", db_path.display().to_string()),
    );

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(report.records.len(), 3);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let (config_hash, status, record_count): (String, String, i64) = conn
        .query_row(
            "SELECT config_hash, status, record_count FROM runs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(config_hash, hash);
    assert_eq!(status, "completed");
    assert_eq!(record_count, 3);

    let mut stmt = conn
        .prepare("SELECT brand, model FROM records ORDER BY position")
        .unwrap();
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("Audi".to_string(), "A4".to_string()),
            ("Audi".to_string(), "Q5".to_string()),
            ("BMW".to_string(), "X3".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // First two requests for page 1 fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/en/used-cars/kia"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "kia", "1", &["Sportage"]).await;
    mount_listing(&mock_server, "kia", "2", &[]).await;

    let json_path = dir.path().join("records.json");
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = []
fallback-categories = ["kia"]"#,
        &format!("json-path = {:?}", json_path.display().to_string()),
    );

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].brand(), "Kia");
    assert_eq!(report.categories[0].stop, CategoryStop::NoRecords);
}

#[tokio::test]
async fn test_failing_category_does_not_stop_the_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Nothing is mounted for "audi", so every request gets a 404
    mount_listing(&mock_server, "kia", "1", &["Picanto", "Ceed"]).await;
    mount_listing(&mock_server, "kia", "2", &[]).await;

    let json_path = dir.path().join("records.json");
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = []
fallback-categories = ["audi", "kia"]"#,
        &format!("json-path = {:?}", json_path.display().to_string()),
    );

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.categories[0].stop, CategoryStop::FetchFailed);
    assert_eq!(report.categories[0].pages_fetched, 0);
    assert_eq!(report.categories[1].records, 2);
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_escalation_to_alternate_transport() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Only requests carrying navigation metadata get through
    Mock::given(method("GET"))
        .and(path("/en/used-cars/kia"))
        .and(query_param("page", "1"))
        .and(header_exists("sec-fetch-mode"))
        .respond_with(html(listing_page(&["Stonic"])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/en/used-cars/kia"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let json_path = dir.path().join("records.json");
    let (mut config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = []
fallback-categories = ["kia"]"#,
        &format!("json-path = {:?}", json_path.display().to_string()),
    );
    config.fetcher.escalate_to_alt = true;

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].get(catalog_trawler::Field::Model), "Stonic");
    // Page 2 is refused by both transports
    assert_eq!(report.categories[0].stop, CategoryStop::FetchFailed);
    assert_eq!(report.categories[0].pages_fetched, 1);
}

#[tokio::test]
async fn test_cancelled_run_still_writes_output() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let json_path = dir.path().join("records.json");
    let db_path = dir.path().join("records.db");
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = ["/api/brands"]
listing-roots = ["/en/brands"]
fallback-categories = ["kia"]"#,
        &format!(
            "json-path = {:?}\ndatabase-path = {:?}",
            json_path.display().to_string(),
            db_path.display().to_string()
        ),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_crawl(&config, &hash, cancel)
        .await
        .expect("Crawl failed");

    assert!(report.cancelled);
    assert!(report.records.is_empty());

    let content = std::fs::read_to_string(&json_path).expect("JSON output missing");
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(records.as_array().map(|a| a.len()), Some(0));
    assert!(mock_server.received_requests().await.unwrap().is_empty());

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let status: String = conn
        .query_row("SELECT status FROM runs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "cancelled");
}

#[tokio::test]
async fn test_unwritable_sink_fails_the_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&mock_server, "kia", "1", &["Rio"]).await;
    mount_listing(&mock_server, "kia", "2", &[]).await;

    // An existing directory cannot be replaced by the records file
    let json_path = dir.path().join("records");
    std::fs::create_dir(&json_path).unwrap();
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = []
fallback-categories = ["kia"]"#,
        &format!("json-path = {:?}", json_path.display().to_string()),
    );

    let result = run_crawl(&config, &hash, CancellationToken::new()).await;
    assert!(matches!(result, Err(TrawlError::Sink(_))));
}

#[tokio::test]
async fn test_unwritable_summary_does_not_fail_the_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&mock_server, "kia", "1", &["Rio", "Soul"]).await;
    mount_listing(&mock_server, "kia", "2", &[]).await;

    let json_path = dir.path().join("records.json");
    let summary_path = dir.path().join("summary");
    std::fs::create_dir(&summary_path).unwrap();
    let (config, hash) = create_test_config(
        dir.path(),
        &mock_server.uri(),
        r#"api-endpoints = []
listing-roots = []
fallback-categories = ["kia"]"#,
        &format!(
            "json-path = {:?}\nsummary-path = {:?}",
            json_path.display().to_string(),
            summary_path.display().to_string()
        ),
    );

    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Summary failure should not fail the crawl");
    assert_eq!(report.records.len(), 2);

    let content = std::fs::read_to_string(&json_path).expect("JSON output missing");
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(records.as_array().map(|a| a.len()), Some(2));
    assert!(summary_path.is_dir());
}
