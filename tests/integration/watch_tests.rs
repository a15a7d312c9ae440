//! Integration tests for complete watch runs
//!
//! A wiremock server stands in for the retailer, a temporary directory holds the
//! state file and a recording mailer captures what would have been emailed.

use async_trait::async_trait;
use brand_watcher::config::{parse_config, FetchConfig, WatchConfig};
use brand_watcher::crawler::{build_http_client, Crawler, Fetcher, RetryPolicy};
use brand_watcher::notify::{Mailer, Notification, NotifyError};
use brand_watcher::storage::{load_seen, save_seen, JsonStateStore};
use brand_watcher::watch::{Delivery, Watcher};
use brand_watcher::{run_watch, SeenSet, WatcherError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"
<html><body><ul>
    <li data-productid="A"><a href="/p/a">Oxford Shirt</a></li>
    <li data-productid="B"><a href="/p/b">Chinos</a></li>
    <li data-productid="C"><a href="/p/c">Polo</a></li>
</ul></body></html>
"#;

/// Captures every notification instead of sending it
#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Always fails, with an error lettre produces for a bad address
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        let error = "not an address"
            .parse::<lettre::Address>()
            .expect_err("address should be rejected");
        Err(NotifyError::Address(error))
    }
}

async fn listing_server(body: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(&mock_server)
        .await;
    mock_server
}

fn seen(ids: &[&str]) -> SeenSet {
    ids.iter().copied().collect()
}

fn watcher(
    server: &MockServer,
    state_path: &Path,
    mailer: Option<Box<dyn Mailer>>,
) -> Watcher<JsonStateStore> {
    let watch = WatchConfig {
        brand_name: "TK Maxx GANT".to_string(),
        brand_url: format!("{}/gant", server.uri()),
        state_path: state_path.display().to_string(),
    };
    let client = build_http_client(&FetchConfig::default()).expect("Failed to build client");
    let crawler = Crawler::new(Fetcher::new(client, RetryPolicy::without_delay(2)), 10);

    Watcher::new(watch, crawler, JsonStateStore::new(state_path), mailer)
}

#[tokio::test]
async fn test_new_items_are_sent_and_recorded() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");
    save_seen(&state_path, &seen(&["A"])).unwrap();

    let mailer = RecordingMailer::default();
    let summary = watcher(&mock_server, &state_path, Some(Box::new(mailer.clone())))
        .run()
        .await
        .expect("Run should succeed");

    let pids: Vec<_> = summary.new_items.iter().map(|p| p.pid.as_str()).collect();
    assert_eq!(pids, vec!["B", "C"]);
    assert_eq!(summary.delivery, Delivery::Sent);
    assert!(summary.state_saved);
    assert_eq!(summary.to_string(), "Sent email for 2 new item(s).");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New TK Maxx GANT item(s): 2 found");
    assert!(sent[0]
        .text_body
        .contains(&format!("- Chinos — {}/p/b", mock_server.uri())));

    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C"]));
}

#[tokio::test]
async fn test_rerun_finds_nothing_new() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");

    let mailer = RecordingMailer::default();
    let watcher = watcher(&mock_server, &state_path, Some(Box::new(mailer.clone())));

    let first = watcher.run().await.expect("First run should succeed");
    assert_eq!(first.new_items.len(), 3);

    let second = watcher.run().await.expect("Second run should succeed");
    assert!(second.new_items.is_empty());
    assert_eq!(second.delivery, Delivery::NotNeeded);
    assert_eq!(
        second.notification.subject,
        "TK Maxx GANT watcher: no new items"
    );
    assert_eq!(second.to_string(), "No new items. State updated.");

    // Only the first run sent anything
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C"]));
}

#[tokio::test]
async fn test_vanished_items_stay_seen() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");
    save_seen(&state_path, &seen(&["A", "B", "C", "Z"])).unwrap();

    let mailer = RecordingMailer::default();
    let summary = watcher(&mock_server, &state_path, Some(Box::new(mailer.clone())))
        .run()
        .await
        .expect("Run should succeed");

    assert!(summary.new_items.is_empty());
    assert!(mailer.sent().is_empty());
    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C", "Z"]));
}

#[tokio::test]
async fn test_fetch_failure_leaves_state_untouched() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");
    save_seen(&state_path, &seen(&["A"])).unwrap();
    let before = std::fs::read_to_string(&state_path).unwrap();

    let mailer = RecordingMailer::default();
    let result = watcher(&mock_server, &state_path, Some(Box::new(mailer.clone())))
        .run()
        .await;

    assert!(matches!(result, Err(WatcherError::Fetch { .. })));
    assert!(mailer.sent().is_empty());
    assert_eq!(std::fs::read_to_string(&state_path).unwrap(), before);
}

#[tokio::test]
async fn test_delivery_failure_still_saves_state() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");

    let summary = watcher(&mock_server, &state_path, Some(Box::new(FailingMailer)))
        .run()
        .await
        .expect("Run should complete");

    assert!(summary.delivery_failed());
    assert!(summary.state_saved);
    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C"]));
}

#[tokio::test]
async fn test_missing_mailer_skips_delivery() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");

    let summary = watcher(&mock_server, &state_path, None)
        .run()
        .await
        .expect("Run should succeed");

    assert!(matches!(summary.delivery, Delivery::Skipped { .. }));
    assert!(summary.state_saved);
    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C"]));
}

#[tokio::test]
async fn test_dry_run_sends_and_saves_nothing() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("seen_items.json");

    let mailer = RecordingMailer::default();
    let summary = watcher(&mock_server, &state_path, Some(Box::new(mailer.clone())))
        .dry_run(true)
        .run()
        .await
        .expect("Run should succeed");

    assert_eq!(summary.new_items.len(), 3);
    assert_eq!(summary.notification.subject, "New TK Maxx GANT item(s): 3 found");
    assert!(!summary.state_saved);
    assert!(mailer.sent().is_empty());
    assert!(!state_path.exists());
}

#[tokio::test]
async fn test_run_watch_from_config_without_email() {
    let mock_server = listing_server(LISTING).await;
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state").join("seen_items.json");

    let toml = format!(
        r#"
[watch]
brand-name = "TK Maxx GANT"
brand-url = "{}/gant"
state-path = "{}"

[fetch]
max-attempts = 1
"#,
        mock_server.uri(),
        state_path.display()
    );
    let config = parse_config(&toml).expect("Config should parse");

    let summary = run_watch(config, false).await.expect("Run should succeed");

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.products_found, 3);
    assert!(matches!(summary.delivery, Delivery::Skipped { .. }));
    assert_eq!(load_seen(&state_path), seen(&["A", "B", "C"]));
}
