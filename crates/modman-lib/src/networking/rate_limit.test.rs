use super::*;
use mockito::Server;
use std::time::Instant;

fn fast_client() -> RateLimitedClient {
    RateLimitedClient::with_backoff(
        Client::new(),
        BackoffConfig {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(100),
            multiplier: 2.0,
        },
    )
}

#[test]
fn test_backoff_config_default() {
    let config = BackoffConfig::default();
    assert_eq!(config.initial, Duration::from_secs(1));
    assert_eq!(config.max, Duration::from_secs(60));
    assert_eq!(config.multiplier, 2.0);
}

#[tokio::test]
async fn test_successful_request() {
    let rate_limited = fast_client();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/test")
        .with_status(200)
        .with_body("success")
        .create_async()
        .await;

    let response = rate_limited
        .get(&format!("{}/test", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "success");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_429_with_retry() {
    let rate_limited = fast_client();
    let mut server = Server::new_async().await;

    let mock_429 = server
        .mock("GET", "/test")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let mock_200 = server
        .mock("GET", "/test")
        .with_status(200)
        .with_body("success after retry")
        .expect(1)
        .create_async()
        .await;

    let start = Instant::now();
    let response = rate_limited
        .get(&format!("{}/test", server.url()))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(10));
    assert_eq!(response.text().await.unwrap(), "success after retry");

    mock_429.assert_async().await;
    mock_200.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_honours_reset_header() {
    let rate_limited = fast_client();
    let mut server = Server::new_async().await;

    let _mock_429 = server
        .mock("GET", "/reset")
        .with_status(429)
        .with_header("x-ratelimit-reset", "1")
        .expect(1)
        .create_async()
        .await;
    let _mock_200 = server
        .mock("GET", "/reset")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let start = Instant::now();
    let response = rate_limited
        .get(&format!("{}/reset", server.url()))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_max_retries() {
    let rate_limited = fast_client().with_max_retries(2);
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/busy")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let result = rate_limited.get(&format!("{}/busy", server.url())).await;
    assert!(matches!(
        result,
        Err(NetworkingError::RateLimitError { .. })
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_retryable_status_is_returned() {
    let rate_limited = fast_client();
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let response = rate_limited
        .get(&format!("{}/missing", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    mock.assert_async().await;
}
