//! Integration tests for public pages, fallbacks and ambient headers.

use serde_json::Value;

mod common;

#[tokio::test]
async fn test_public_pages_are_served_with_caching_headers() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    for (path, marker) in [("/", "home"), ("/login", "login"), ("/register", "register")] {
        let response = client.get(gateway.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 200, "path {path}");
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "public, max-age=86400"
        );
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(response.text().await.unwrap().contains(marker));
    }
}

#[tokio::test]
async fn test_assets_resolve_by_path() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    let response = client.get(gateway.url("/app.css")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/css");
}

#[tokio::test]
async fn test_unknown_page_falls_back_to_index() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    let response = client.get(gateway.url("/some/client/route")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("home"));
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    let response = client.get(gateway.url("/api/does/not/exist")).send().await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "API route not found");
}

#[tokio::test]
async fn test_security_headers_and_request_id_are_present() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].as_u64().unwrap() > 0);
}
