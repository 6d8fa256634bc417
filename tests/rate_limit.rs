//! Integration tests for per-client admission control.

use serde_json::Value;

mod common;

#[tokio::test]
async fn test_quota_exhaustion_returns_429_with_retry_after() {
    let mut config = common::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.window_ms = 60_000;
    config.rate_limit.max_requests = 3;
    let gateway = common::spawn_gateway(config).await;
    let client = common::client();

    for i in 0..3 {
        let response = client.get(gateway.url("/health")).send().await.unwrap();
        assert_eq!(response.status(), 200, "request {i} should be admitted");
    }

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 429);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("rejection should carry Retry-After")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "too many requests");
}

#[tokio::test]
async fn test_admission_runs_before_authentication() {
    let mut config = common::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.window_ms = 60_000;
    config.rate_limit.max_requests = 1;
    let gateway = common::spawn_gateway(config).await;
    let client = common::client();

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    // Over quota, an unauthenticated protected request is rejected by the
    // admission controller (429), never reaching the access gate (401).
    let response = client.get(gateway.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(response.status(), 429);
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let mut config = common::test_config();
    config.rate_limit.enabled = false;
    let gateway = common::spawn_gateway(config).await;
    let client = common::client();

    for _ in 0..20 {
        let response = client.get(gateway.url("/health")).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn test_window_elapse_restores_admission() {
    let mut config = common::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.window_ms = 500;
    config.rate_limit.max_requests = 1;
    let gateway = common::spawn_gateway(config).await;
    let client = common::client();

    assert_eq!(client.get(gateway.url("/health")).send().await.unwrap().status(), 200);
    assert_eq!(client.get(gateway.url("/health")).send().await.unwrap().status(), 429);

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    assert_eq!(client.get(gateway.url("/health")).send().await.unwrap().status(), 200);
}
