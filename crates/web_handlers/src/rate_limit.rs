use std::{
    collections::HashMap,
    future::{Ready, ready},
    rc::Rc,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use actix_web::{
    Error, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;

/// Where the limiter reads the client key from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Key requests by the peer socket address
    PeerIp,
    /// Key requests by a header value (e.g. an API key or forwarded IP)
    Header(String),
}

/// Configuration for the request rate limiter
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of the counting window
    pub window: Duration,
    /// Requests allowed per key within one window
    pub max_requests: u32,
    /// How to derive the per-client key
    pub key_source: KeySource,
    /// Requests matching this predicate bypass the limiter entirely
    pub skip: Option<fn(&ServiceRequest) -> bool>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 120,
            key_source: KeySource::PeerIp,
            skip: None,
        }
    }
}

impl RateLimitConfig {
    /// Builds a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);
        let max_requests = std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .unwrap_or(120);

        Self {
            window: Duration::from_secs(window_secs),
            max_requests,
            ..Self::default()
        }
    }
}

/// Counter backend for the rate limiter. The in-memory store covers a single
/// process; a shared store (e.g. Redis) can be swapped in behind this trait.
pub trait CounterStore: Send + Sync {
    /// Records one request for `key` and returns how many have been seen in
    /// the current window, including this one
    fn increment(&self, key: &str, window: Duration) -> u32;
}

struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// Process-local counter store backed by a mutex-guarded map
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl InMemoryCounterStore {
    /// Creates an empty counter store
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn increment(&self, key: &str, window: Duration) -> u32 {
        let now = Instant::now();
        let mut counters = self.counters.lock().unwrap();

        let counter = counters.entry(key.to_string()).or_insert(WindowCounter {
            window_start: now,
            count: 0,
        });

        // A fresh window resets the count
        if now.duration_since(counter.window_start) >= window {
            counter.window_start = now;
            counter.count = 0;
        }

        counter.count += 1;
        counter.count
    }
}

/// Middleware that rejects clients exceeding a request allowance per window
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    store: Arc<dyn CounterStore>,
}

impl RateLimitMiddleware {
    /// Creates a limiter with its own in-memory counter store
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            store: Arc::new(InMemoryCounterStore::new()),
        }
    }

    /// Creates a limiter over a shared counter store
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        Self { config, store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
            store: self.store.clone(),
        }))
    }
}

/// Service that implements the rate limiting logic
pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    config: RateLimitConfig,
    store: Arc<dyn CounterStore>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();
        let store = self.store.clone();

        Box::pin(async move {
            if let Some(skip) = config.skip {
                if skip(&req) {
                    let res = service.call(req).await?;
                    return Ok(res.map_into_left_body());
                }
            }

            let key = match &config.key_source {
                KeySource::PeerIp => req
                    .peer_addr()
                    .map(|addr| addr.ip().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                KeySource::Header(name) => req
                    .headers()
                    .get(name.as_str())
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string(),
            };

            let seen = store.increment(&key, config.window);
            if seen > config.max_requests {
                log::warn!("Rate limit exceeded for {}", key);
                let response = HttpResponse::TooManyRequests().json(serde_json::json!({
                    "error": "rate_limited",
                    "message": "Too many requests. Please try again later."
                }));
                return Ok(req.into_response(response).map_into_right_body());
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, web};

    use super::*;

    #[test]
    fn counts_accumulate_within_a_window() {
        let store = InMemoryCounterStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.increment("alice", window), 1);
        assert_eq!(store.increment("alice", window), 2);
        assert_eq!(store.increment("alice", window), 3);
    }

    #[test]
    fn separate_keys_count_independently() {
        let store = InMemoryCounterStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.increment("alice", window), 1);
        assert_eq!(store.increment("bob", window), 1);
        assert_eq!(store.increment("alice", window), 2);
    }

    #[test]
    fn counts_reset_once_the_window_passes() {
        let store = InMemoryCounterStore::new();
        let window = Duration::from_millis(20);

        assert_eq!(store.increment("alice", window), 1);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.increment("alice", window), 1);
    }

    #[test]
    fn default_config_uses_peer_ip_keying() {
        let config = RateLimitConfig::default();

        assert_eq!(config.key_source, KeySource::PeerIp);
        assert_eq!(config.max_requests, 120);
        assert_eq!(config.window, Duration::from_secs(60));
        assert!(config.skip.is_none());
    }

    #[actix_web::test]
    async fn over_limit_requests_get_a_429() {
        let config = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
            key_source: KeySource::Header("X-Client-Id".to_string()),
            skip: None,
        };
        let app = actix_web::test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(config))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..2 {
            let req = actix_web::test::TestRequest::get()
                .uri("/ping")
                .insert_header(("X-Client-Id", "alice"))
                .to_request();
            let res = actix_web::test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let req = actix_web::test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Client-Id", "alice"))
            .to_request();
        let res = actix_web::test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn skipped_paths_bypass_the_limiter() {
        let config = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 1,
            key_source: KeySource::Header("X-Client-Id".to_string()),
            skip: Some(|req| req.path() == "/health"),
        };
        let app = actix_web::test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(config))
                .route("/health", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..3 {
            let req = actix_web::test::TestRequest::get()
                .uri("/health")
                .insert_header(("X-Client-Id", "alice"))
                .to_request();
            let res = actix_web::test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }
}
