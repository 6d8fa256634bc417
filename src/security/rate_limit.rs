//! Per-client admission control.
//!
//! Fixed-window request counting: each client key owns a window that resets
//! `window_ms` after it started; a request is admitted while the in-window
//! count stays at or under the cap. Rejected attempts are still counted, so
//! the audit trail reflects pressure, but nothing is forwarded. Up to twice
//! the cap can slip through across a window boundary; that imprecision is
//! the accepted cost of the fixed-window scheme.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use serde_json::json;

use crate::config::schema::RateLimitConfig;
use crate::observability::metrics;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request; `remaining` admissions left in this window.
    Admitted { remaining: u32 },
    /// Drop the request; the window has `retry_after` left to run.
    Rejected { retry_after: Duration },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    window_start: Instant,
    count: u32,
    last_seen: Instant,
}

/// Fixed-window admission controller, one window per client key.
///
/// All mutation happens under the map's per-key entry guard, so concurrent
/// requests from one client observe a serialized increment-and-check and
/// the cap cannot be exceeded by racing reads.
pub struct RateLimiter {
    windows: DashMap<String, ClientWindow>,
    window: Duration,
    limit: u32,
    idle_ttl: Duration,
    enabled: bool,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_millis(config.window_ms);
        Self {
            windows: DashMap::new(),
            window,
            limit: config.max_requests,
            idle_ttl: window.saturating_mul(config.idle_multiplier),
            enabled: config.enabled,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Check a request from `client_key` against its window at time `now`.
    pub fn admit(&self, client_key: &str, now: Instant) -> Decision {
        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert_with(|| ClientWindow {
                window_start: now,
                count: 0,
                last_seen: now,
            });
        let window = entry.value_mut();

        if now.duration_since(window.window_start) >= self.window {
            window.window_start = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);
        window.last_seen = now;

        if window.count <= self.limit {
            Decision::Admitted {
                remaining: self.limit - window.count,
            }
        } else {
            let elapsed = now.duration_since(window.window_start);
            Decision::Rejected {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }

    /// Drop windows idle longer than the eviction TTL. Housekeeping only;
    /// an evicted client simply starts a fresh window on its next request.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.last_seen) < self.idle_ttl);
        before - self.windows.len()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Number of client windows currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn client_key(&self, peer: &SocketAddr, headers: &HeaderMap) -> String {
        if self.trust_forwarded_for {
            if let Some(first) = headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return first.to_string();
            }
        }
        peer.ip().to_string()
    }
}

/// Middleware placing every inbound request under admission control.
pub async fn admission_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.enabled() {
        return next.run(request).await;
    }

    let key = limiter.client_key(&addr, request.headers());
    match limiter.admit(&key, Instant::now()) {
        Decision::Admitted { .. } => next.run(request).await,
        Decision::Rejected { retry_after } => {
            tracing::warn!(client = %key, "request rejected by admission control");
            metrics::record_rate_limited();
            rejection(retry_after)
        }
    }
}

fn rejection(retry_after: Duration) -> Response {
    // Round up so a client never retries inside the same window.
    let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": "too many requests" })),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}
