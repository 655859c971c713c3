use std::{
    net::SocketAddr,
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::infra::{
    app_error::AppError,
    app_state::AppState,
    config::{AllowedOrigins, RateLimitConfig},
};

/// Above this many tracked sources, expired windows are dropped, at most once
/// per window.
const PRUNE_THRESHOLD: usize = 10_000;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client source.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, FixedWindow>,
    prune_threshold: usize,
    last_prune: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// A `max_requests` of zero disables limiting.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window,
            windows: DashMap::new(),
            prune_threshold: PRUNE_THRESHOLD,
            last_prune: Mutex::new(None),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Counts one request from `source`. Returns the requests left in the
    /// current window, or how long to wait once the window is exhausted.
    pub fn check(&self, source: &str) -> Result<u32, Duration> {
        self.check_at(source, Instant::now())
    }

    fn check_at(&self, source: &str, now: Instant) -> Result<u32, Duration> {
        if self.max_requests == 0 {
            return Ok(u32::MAX);
        }

        if self.windows.len() > self.prune_threshold {
            self.prune_expired(now);
        }

        let mut window = self
            .windows
            .entry(source.to_string())
            .or_insert(FixedWindow {
                started: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            *window = FixedWindow {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(window.started);
            return Err(self.window.saturating_sub(elapsed));
        }

        window.count += 1;
        Ok(self.max_requests - window.count)
    }

    /// Drops expired windows unless a prune already ran within the last window.
    fn prune_expired(&self, now: Instant) {
        {
            let Ok(mut last_prune) = self.last_prune.try_lock() else {
                return;
            };
            if last_prune.is_some_and(|at| now.saturating_duration_since(at) < self.window) {
                return;
            }
            *last_prune = Some(now);
        }

        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    #[cfg(test)]
    fn tracked_sources(&self) -> usize {
        self.windows.len()
    }
}

/// Peer address when the server knows it, otherwise the first hop of
/// `X-Forwarded-For`.
pub fn client_source(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let source = client_source(&req);

    match state.rate_limiter.check(&source) {
        Ok(remaining) => {
            let mut response = next.run(req).await;
            if state.rate_limiter.max_requests() > 0 {
                let headers = response.headers_mut();
                headers.insert(
                    RATE_LIMIT_LIMIT,
                    HeaderValue::from(state.rate_limiter.max_requests()),
                );
                headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
            }
            Ok(response)
        }
        Err(retry_after) => {
            tracing::warn!(%source, "Rate limit exceeded");
            Err(AppError::TooManyRequests { retry_after })
        }
    }
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Conservative response headers, unless a handler already set them.
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn limiter(max_requests: u32, secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window: Duration::from_secs(secs),
        })
    }

    #[test]
    fn rejects_requests_past_the_limit() {
        let limiter = limiter(2, 60);
        let now = Instant::now();
        assert_eq!(limiter.check_at("1.2.3.4", now), Ok(1));
        assert_eq!(limiter.check_at("1.2.3.4", now), Ok(0));
        let retry = limiter
            .check_at("1.2.3.4", now + Duration::from_secs(20))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(40));
    }

    #[test]
    fn sources_are_counted_separately() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now).is_ok());
        assert!(limiter.check_at("a", now).is_err());
        assert!(limiter.check_at("b", now).is_ok());
        assert_eq!(limiter.tracked_sources(), 2);
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now).is_ok());
        assert!(limiter.check_at("a", now + Duration::from_secs(59)).is_err());
        assert!(limiter.check_at("a", now + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn zero_disables_limiting() {
        let limiter = limiter(0, 60);
        for _ in 0..100 {
            assert!(limiter.check("a").is_ok());
        }
        assert_eq!(limiter.tracked_sources(), 0);
    }

    #[test]
    fn expired_windows_are_pruned_at_most_once_per_window() {
        let mut limiter = limiter(5, 60);
        limiter.prune_threshold = 1;
        let start = Instant::now();

        limiter.check_at("a", start).unwrap();
        limiter.check_at("b", start).unwrap();
        // Past the threshold with nothing expired yet: the prune runs and keeps both.
        limiter.check_at("c", start + Duration::from_secs(10)).unwrap();
        assert_eq!(limiter.tracked_sources(), 3);

        // "a" and "b" have expired, but the last prune was less than a window ago.
        limiter.check_at("d", start + Duration::from_secs(61)).unwrap();
        assert_eq!(limiter.tracked_sources(), 4);

        // A full window after the last prune, every expired source is dropped.
        limiter.check_at("e", start + Duration::from_secs(70)).unwrap();
        assert_eq!(limiter.tracked_sources(), 2);
    }

    #[test]
    fn source_prefers_peer_address_over_forwarded_header() {
        let mut req = axum::http::Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_source(&req), "10.0.0.1");

        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 5000))));
        assert_eq!(client_source(&req), "127.0.0.1");
    }

    #[test]
    fn unknown_source_without_any_hint() {
        let req = axum::http::Request::builder()
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_source(&req), "unknown");
    }
}
