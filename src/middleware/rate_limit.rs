use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use axum::response::IntoResponse;
use dashmap::DashMap;
use tower::{Layer, Service};

const SWEEP_INTERVAL_SECS: u64 = 300;
const IDLE_EVICTION: Duration = Duration::from_secs(3600);

/// Paths served without metering.
const UNMETERED_PATHS: &[&str] = &["/", "/health", "/status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Minute,
    Hour,
}

impl Window {
    fn label(self) -> &'static str {
        match self {
            Self::Minute => "per_minute",
            Self::Hour => "per_hour",
        }
    }

    fn seconds(self) -> f64 {
        match self {
            Self::Minute => 60.0,
            Self::Hour => 3600.0,
        }
    }
}

/// Continuously refilling bucket; `limit` tokens per window.
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(limit: u32, window: Window) -> Self {
        let capacity = f64::from(limit);
        Self {
            tokens: capacity,
            capacity,
            refill_per_sec: capacity / window.seconds(),
            last_refill: Instant::now(),
        }
    }

    fn take(&mut self) -> bool {
        self.refill();
        if self.tokens < 1.0 {
            return false;
        }
        self.tokens -= 1.0;
        true
    }

    fn give_back(&mut self) {
        self.tokens = (self.tokens + 1.0).min(self.capacity);
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Whole seconds until one token is available again.
    fn wait_secs(&self) -> u64 {
        if self.tokens >= 1.0 || self.refill_per_sec <= 0.0 {
            return 0;
        }
        ((1.0 - self.tokens) / self.refill_per_sec).ceil() as u64 + 1
    }

    fn remaining(&self) -> u64 {
        self.tokens.max(0.0) as u64
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Allowed { minute_left: u64, hour_left: u64 },
    Limited { window: Window, retry_after: u64 },
}

/// Minute and hour allowance for one client.
struct ClientQuota {
    minute: TokenBucket,
    hour: TokenBucket,
    last_seen: Instant,
}

impl ClientQuota {
    fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            minute: TokenBucket::new(per_minute, Window::Minute),
            hour: TokenBucket::new(per_hour, Window::Hour),
            last_seen: Instant::now(),
        }
    }

    /// A request rejected by the hour window does not spend a minute token.
    fn admit(&mut self) -> Decision {
        self.last_seen = Instant::now();

        if !self.minute.take() {
            return Decision::Limited {
                window: Window::Minute,
                retry_after: self.minute.wait_secs(),
            };
        }
        if !self.hour.take() {
            self.minute.give_back();
            return Decision::Limited {
                window: Window::Hour,
                retry_after: self.hour.wait_secs(),
            };
        }

        Decision::Allowed {
            minute_left: self.minute.remaining(),
            hour_left: self.hour.remaining(),
        }
    }
}

#[derive(Clone)]
struct Limiter {
    clients: Arc<DashMap<String, ClientQuota>>,
    per_minute: u32,
    per_hour: u32,
    started: Instant,
    last_sweep: Arc<AtomicU64>,
}

impl Limiter {
    fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            per_minute,
            per_hour,
            started: Instant::now(),
            last_sweep: Arc::new(AtomicU64::new(0)),
        }
    }

    fn admit(&self, client: &str) -> Decision {
        self.sweep_idle();
        self.clients
            .entry(client.to_string())
            .or_insert_with(|| ClientQuota::new(self.per_minute, self.per_hour))
            .admit()
    }

    fn limit_for(&self, window: Window) -> u32 {
        match window {
            Window::Minute => self.per_minute,
            Window::Hour => self.per_hour,
        }
    }

    fn sweep_idle(&self) {
        let now = self.started.elapsed().as_secs();
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) < SWEEP_INTERVAL_SECS {
            return;
        }
        self.last_sweep.store(now, Ordering::Relaxed);
        self.clients
            .retain(|_, quota| quota.last_seen.elapsed() < IDLE_EVICTION);
    }
}

/// Per-client token-bucket limiting for every metered route.
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Limiter,
}

impl RateLimitLayer {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            limiter: Limiter::new(per_minute, per_hour),
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: Limiter,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        if UNMETERED_PATHS.contains(&req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let client = client_key(&req);
        let decision = self.limiter.admit(&client);
        let per_minute = self.limiter.per_minute;
        let per_hour = self.limiter.per_hour;

        match decision {
            Decision::Limited {
                window,
                retry_after,
            } => {
                tracing::warn!(client = %client, limit_type = window.label(), "Rate limit exceeded");
                let response = too_many_requests(window, retry_after, self.limiter.limit_for(window));
                Box::pin(async move { Ok::<_, S::Error>(response) })
            }
            Decision::Allowed {
                minute_left,
                hour_left,
            } => Box::pin(async move {
                let mut response = inner.call(req).await?;
                let headers = response.headers_mut();
                set_quota_header(headers, "x-ratelimit-limit-minute", u64::from(per_minute));
                set_quota_header(headers, "x-ratelimit-limit-hour", u64::from(per_hour));
                set_quota_header(headers, "x-ratelimit-remaining-minute", minute_left);
                set_quota_header(headers, "x-ratelimit-remaining-hour", hour_left);
                Ok::<_, S::Error>(response)
            }),
        }
    }
}

fn set_quota_header(headers: &mut HeaderMap, name: &'static str, value: u64) {
    headers.insert(name, HeaderValue::from(value));
}

/// Proxy headers (first X-Forwarded-For hop, then X-Real-IP), else the peer address.
fn client_key<B>(req: &Request<B>) -> String {
    let headers = req.headers();
    let proxied = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = proxied {
        return format!("ip:{ip}");
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "ip:unknown".to_string())
}

fn too_many_requests(window: Window, retry_after: u64, limit: u32) -> Response<Body> {
    let body = serde_json::json!({
        "error": "rate_limit_exceeded",
        "message": format!("Too many requests. Try again in {retry_after} seconds."),
        "retry_after": retry_after,
        "limit_type": window.label(),
        "limit": limit,
    });

    let mut resp = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
    resp.headers_mut()
        .insert("retry-after", HeaderValue::from(retry_after));
    resp
}
