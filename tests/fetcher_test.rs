//! Integration tests for HttpFetcher using wiremock
//!
//! These tests validate status, timeout and cookie handling against mock servers.

use std::time::Duration;

use jobharvest::crawler::{CookieJar, FetchOptions, HttpFetcher};
use jobharvest::utils::error::FetchError;
use serde::Deserialize;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Echo {
    ok: bool,
}

/// Test successful text fetch
#[tokio::test]
async fn test_fetch_text_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/careers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Careers</h1>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let body = fetcher
        .fetch_text(&format!("{}/careers", mock_server.uri()), FetchOptions::default())
        .await
        .unwrap();

    assert!(body.contains("Careers"));
}

/// Non-2xx responses become status errors carrying the URL
#[tokio::test]
async fn test_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let url = format!("{}/missing", mock_server.uri());
    let err = fetcher.fetch_text(&url, FetchOptions::default()).await.unwrap_err();

    match err {
        FetchError::Status { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

/// Slow responses past the deadline fail with a timeout
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let err = fetcher
        .fetch_text(
            &format!("{}/slow", mock_server.uri()),
            FetchOptions::with_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { timeout_ms: 100, .. }), "got {err:?}");
    assert!(err.is_recoverable());
}

/// Every Set-Cookie header is returned in order and the jar is sent along
#[tokio::test]
async fn test_fetch_with_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(header("cookie", "session=abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("listing")
                .append_header("set-cookie", "session=def; Path=/; HttpOnly")
                .append_header("set-cookie", "route=r1"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let mut jar = CookieJar::new();
    jar.set("session", "abc");

    let response = fetcher
        .fetch_text_with_cookies(
            &format!("{}/listing", mock_server.uri()),
            &jar,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(response.text, "listing");
    assert_eq!(
        response.cookies,
        vec!["session=def; Path=/; HttpOnly".to_string(), "route=r1".to_string()]
    );

    let merged = jar.merge(&response.cookies);
    assert_eq!(merged.get("session"), Some("def"));
    assert_eq!(merged.get("route"), Some("r1"));
}

/// A 2xx body that is not JSON is reported as invalid JSON
#[tokio::test]
async fn test_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let err = fetcher
        .fetch_json::<Echo>(&format!("{}/feed", mock_server.uri()), FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidJson { .. }), "got {err:?}");
}

/// POSTed JSON bodies arrive intact and the reply is parsed
#[tokio::test]
async fn test_post_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({ "limit": 20, "offset": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(100).unwrap();
    let echo: Echo = fetcher
        .post_json(
            &format!("{}/api", mock_server.uri()),
            &serde_json::json!({ "limit": 20, "offset": 0 }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(echo.ok);
}

/// Malformed URLs fail before any request is made
#[tokio::test]
async fn test_invalid_url() {
    let fetcher = HttpFetcher::new(100).unwrap();
    let err = fetcher
        .fetch_text("not a url", FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidUrl(_)));
}
