//! Per-client fixed-window rate limiting

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::AppState;

/// Default budget: 100 requests per client per 15 minutes
pub const DEFAULT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Prune expired windows once this many clients are tracked
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

struct Window {
    started: Instant,
    count: u32,
}

/// Request counters keyed by client IP
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request from `client` at `now`
    pub async fn check(&self, client: IpAddr, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock().await;
        let window_len = self.config.window;

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.config.max_requests {
            let elapsed = now.duration_since(window.started);
            return RateDecision::Limited {
                retry_after: window_len.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.config.max_requests - window.count,
        }
    }
}

/// Reject clients over budget with 429
///
/// Requests without connection info (in-process tests) share one bucket.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let client = connect_info
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let limit = limiter.config().max_requests;
    match limiter.check(client, Instant::now()).await {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(limit),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            response
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "error": "Too many requests" })),
            )
                .into_response();
            response.headers_mut().insert(
                HeaderName::from_static("retry-after"),
                HeaderValue::from(retry_after.as_secs().max(1)),
            );
            response
        }
    }
}
