//! Shared utilities for integration testing.

use std::path::PathBuf;
use std::sync::Arc;

use auth_gateway::config::GatewayConfig;
use auth_gateway::lifecycle::Shutdown;
use auth_gateway::store::MemoryStore;
use auth_gateway::HttpServer;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

/// A gateway running on an ephemeral port with a throwaway public dir.
pub struct TestGateway {
    pub base_url: String,
    pub shutdown: Shutdown,
    pub public_dir: PathBuf,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
        let _ = std::fs::remove_dir_all(&self.public_dir);
    }
}

/// Baseline config for tests: valid secret, admission control off.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.token_secret = TEST_SECRET.to_string();
    config.rate_limit.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

/// Spawn a gateway backed by an in-memory credential store.
pub async fn spawn_gateway(mut config: GatewayConfig) -> TestGateway {
    let public_dir = std::env::temp_dir().join(format!("auth-gateway-it-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&public_dir).await.unwrap();
    for (name, body) in [
        ("index.html", "<h1>home</h1>"),
        ("login.html", "<h1>login</h1>"),
        ("register.html", "<h1>register</h1>"),
        ("dashboard.html", "<h1>dashboard</h1>"),
        ("app.css", "body { margin: 0 }"),
    ] {
        tokio::fs::write(public_dir.join(name), body).await.unwrap();
    }
    config.content.public_dir = public_dir.clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(MemoryStore::new()));
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, shutdown_rx).await;
    });

    TestGateway {
        base_url: format!("http://{addr}"),
        shutdown,
        public_dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
