//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use serde_json::json;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/guilds/1/messages/search";

fn fast_config() -> HttpClientConfig {
    HttpClientConfig::builder()
        .token("test-token")
        .error_delay(Duration::from_millis(10))
        .default_retry_after(Duration::from_millis(10))
        .build()
}

fn search_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}{SEARCH_PATH}?content=hi", server.uri())).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_errors, 5);
    assert_eq!(config.error_delay, Duration::from_secs(5));
    assert!(config.max_rate_limit_retries.is_none());
    assert!(config.token.is_empty());
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .token("abc")
        .timeout(Duration::from_secs(60))
        .max_errors(3)
        .error_delay(Duration::from_millis(200))
        .max_rate_limit_retries(Some(10))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.token, "abc");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_errors, 3);
    assert_eq!(config.error_delay, Duration::from_millis(200));
    assert_eq!(config.max_rate_limit_retries, Some(10));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_config_debug_redacts_token() {
    let config = HttpClientConfig::builder().token("super-secret").build();
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_client_requires_token() {
    let err = SearchClient::new(HttpClientConfig::default()).unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_fetch_page_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("content", "hi"))
        .and(header("authorization", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 1,
            "messages": [[{"id": "10", "content": "hi"}]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let page = client.fetch_page(&search_url(&mock_server)).await.unwrap();

    assert_eq!(page.total_results, 1);
    assert_eq!(page.len(), 1);
    assert_eq!(client.attempts(), 1);
    assert_eq!(client.error_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_sleeps_and_does_not_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "message": "You are being rate limited.",
            "retry_after": 0.2,
            "global": false
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 0,
            "messages": []
        })))
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let start = Instant::now();
    let page = client.fetch_page(&search_url(&mock_server)).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(200));
    assert!(page.is_empty());
    assert_eq!(client.error_count(), 0);
    assert_eq!(client.rate_limits(), 1);
    assert_eq!(client.attempts(), 2);
}

#[tokio::test]
async fn test_rate_limit_header_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_results": 0})))
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    client.fetch_page(&search_url(&mock_server)).await.unwrap();

    assert_eq!(client.rate_limits(), 2);
    assert_eq!(client.error_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"retry_after": 0.01})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .token("t")
        .max_rate_limit_retries(Some(2))
        .build();
    let mut client = SearchClient::new(config).unwrap();
    let err = client
        .fetch_page(&search_url(&mock_server))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(client.attempts(), 3);
    assert_eq!(client.error_count(), 0);
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 1,
            "messages": [[{"id": "1"}]]
        })))
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let page = client.fetch_page(&search_url(&mock_server)).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(client.error_count(), 2);
    assert_eq!(client.attempts(), 3);
}

#[tokio::test]
async fn test_max_errors_aborts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
        .expect(5)
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let err = client
        .fetch_page(&search_url(&mock_server))
        .await
        .unwrap_err();

    match err {
        Error::MaxErrorsExceeded { max_errors, last } => {
            assert_eq!(max_errors, 5);
            assert!(last.contains("403"));
            assert!(last.contains("Missing Access"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.attempts(), 5);
    assert_eq!(client.error_count(), 5);
}

#[tokio::test]
async fn test_error_budget_spans_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_results": 0})))
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    client.fetch_page(&search_url(&mock_server)).await.unwrap();
    client.fetch_page(&search_url(&mock_server)).await.unwrap();

    // Successes do not refund the budget
    assert_eq!(client.error_count(), 1);
}

#[tokio::test]
async fn test_invalid_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let err = client
        .fetch_page(&search_url(&mock_server))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(client.error_count(), 0);
}

#[tokio::test]
async fn test_client_error_status_spends_budget_and_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total_results": 0, "messages": []})),
        )
        .mount(&mock_server)
        .await;

    let mut client = SearchClient::new(fast_config()).unwrap();
    let page = client.fetch_page(&search_url(&mock_server)).await.unwrap();

    assert!(page.is_empty());
    assert_eq!(client.error_count(), 1);
    assert_eq!(client.attempts(), 2);
}
