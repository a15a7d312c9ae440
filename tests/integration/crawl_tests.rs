//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise
//! fetching, retrying and pagination end-to-end.

use brand_watcher::config::FetchConfig;
use brand_watcher::crawler::{build_http_client, Crawler, FetchError, Fetcher, RetryPolicy};
use brand_watcher::state::StopReason;
use brand_watcher::WatcherError;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fetcher that retries immediately
fn test_fetcher(max_attempts: u32) -> Fetcher {
    let client = build_http_client(&FetchConfig::default()).expect("Failed to build client");
    Fetcher::new(client, RetryPolicy::without_delay(max_attempts))
}

fn test_crawler(max_pages: u32) -> Crawler {
    Crawler::new(test_fetcher(3), max_pages)
}

/// A listing page with one product card per `(pid, title)` and an optional next link
fn listing(products: &[(&str, &str)], next: Option<&str>) -> String {
    let cards: String = products
        .iter()
        .map(|(pid, title)| {
            format!(
                r#"<li data-productid="{pid}"><a href="/p/{pid}">{title}</a></li>"#,
                pid = pid,
                title = title
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a class="pagination__next" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        "<html><body><ul>{}</ul><nav>{}</nav></body></html>",
        cards, next
    )
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_sends_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gant"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = test_fetcher(1)
        .fetch(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Fetch should succeed");

    assert_eq!(page.status_code, 200);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_fetch_retries_after_server_error() {
    let mock_server = MockServer::start().await;

    // First request fails, later ones fall through to the healthy mock
    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let page = test_fetcher(3)
        .fetch(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Fetch should succeed on retry");

    assert_eq!(page.body, "recovered");
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = test_fetcher(3)
        .fetch(&format!("{}/gant", mock_server.uri()))
        .await;

    match result {
        Err(WatcherError::Fetch {
            attempts, source, ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, FetchError::Status { status: 503 }));
        }
        other => panic!("Expected fetch failure, got {:?}", other.map(|p| p.body)),
    }
}

#[tokio::test]
async fn test_fetch_times_out_on_slow_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = FetchConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let client = build_http_client(&config).expect("Failed to build client");
    let fetcher = Fetcher::new(client, RetryPolicy::without_delay(1));

    let result = fetcher.fetch(&format!("{}/gant", mock_server.uri())).await;

    match result {
        Err(WatcherError::Fetch {
            attempts, source, ..
        }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(source, FetchError::Timeout));
        }
        other => panic!("Expected timeout, got {:?}", other.map(|p| p.body)),
    }
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Grab a free port, then shut the server down
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let result = test_fetcher(2).fetch(&format!("{}/gant", uri)).await;

    match result {
        Err(WatcherError::Fetch { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("Expected fetch failure, got {:?}", other.map(|p| p.body)),
    }
}

#[tokio::test]
async fn test_crawl_follows_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/gant",
        listing(&[("A", "Oxford Shirt"), ("B", "Chinos")], Some("/gant/page/2")),
    )
    .await;
    mount_page(
        &mock_server,
        "/gant/page/2",
        listing(&[("C", "Polo")], None),
    )
    .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", base_url))
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.stop_reason, StopReason::Exhausted);
    assert_eq!(result.ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);

    let polo = result.get("C").unwrap();
    assert_eq!(polo.title, "Polo");
    assert_eq!(polo.url, format!("{}/p/C", base_url));
}

#[tokio::test]
async fn test_crawl_later_page_overwrites_earlier() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/gant",
        listing(&[("D", "Old title")], Some("/gant/page/2")),
    )
    .await;
    mount_page(
        &mock_server,
        "/gant/page/2",
        listing(&[("D", "New title")], None),
    )
    .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.len(), 1);
    assert_eq!(result.get("D").unwrap().title, "New title");
}

#[tokio::test]
async fn test_crawl_stops_on_self_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gant"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing(&[("A", "Shirt")], Some("/gant"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.pages_fetched, 1);
    assert_eq!(result.stop_reason, StopReason::CycleDetected);
    assert!(result.contains("A"));
}

#[tokio::test]
async fn test_crawl_stops_on_cycle() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/gant",
        listing(&[("A", "Shirt")], Some("/gant/page/2")),
    )
    .await;
    mount_page(
        &mock_server,
        "/gant/page/2",
        listing(&[("B", "Chinos")], Some("/gant#top")),
    )
    .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.stop_reason, StopReason::CycleDetected);
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_crawl_respects_page_limit() {
    let mock_server = MockServer::start().await;

    for n in 1..=3 {
        let pid = format!("P{}", n);
        let next = format!("/gant/page/{}", n + 1);
        mount_page(
            &mock_server,
            &format!("/gant/page/{}", n),
            listing(&[(pid.as_str(), "Item")], Some(next.as_str())),
        )
        .await;
    }

    let result = test_crawler(2)
        .crawl(&format!("{}/gant/page/1", mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.stop_reason, StopReason::PageLimit);
    assert_eq!(result.ids().collect::<Vec<_>>(), vec!["P1", "P2"]);
}

#[tokio::test]
async fn test_crawl_fails_when_a_page_fails() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/gant",
        listing(&[("A", "Shirt")], Some("/gant/page/2")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gant/page/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", mock_server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(WatcherError::Fetch {
            attempts: 3,
            source: FetchError::Status { status: 404 },
            ..
        })
    ));
}

#[tokio::test]
async fn test_crawl_unstructured_page_falls_back_to_raw_ids() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/gant",
        r#"<html><body><script>var state = {"productID":"ABC123","productName":"Gilet"};</script></body></html>"#
            .to_string(),
    )
    .await;

    let result = test_crawler(50)
        .crawl(&format!("{}/gant", mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    let product = result.get("ABC123").expect("Fallback should find the id");
    assert_eq!(product.url, "");
    assert_eq!(product.title, "Gilet");
}
