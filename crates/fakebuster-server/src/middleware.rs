//! Request-id, bearer auth and per-client rate limiting.
//!
//! Layer order matters: `request_id` wraps the whole app so rejections carry
//! an id, and auth runs before the limiter so each API key gets its own
//! window.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const ANONYMOUS_CLIENT: &str = "anonymous";

/// Windows are pruned once the table grows past this many clients.
const MAX_TRACKED_CLIENTS: usize = 1_024;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The bearer key that authenticated a request.
#[derive(Debug, Clone)]
struct ClientKey(String);

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused, otherwise a new `UUIDv4` is
/// generated. The ID is stored as a [`RequestId`] extension and echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

/// Accepted API keys. Disabled auth lets every request through.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<[String]>,
    enabled: bool,
}

impl AuthState {
    /// Build auth from the configured keys.
    ///
    /// An empty key list only disables auth in development; anywhere else it
    /// fails startup.
    pub fn new(keys: Vec<String>, is_development: bool) -> anyhow::Result<Self> {
        if !keys.is_empty() {
            tracing::info!(keys = keys.len(), "bearer auth enabled");
            return Ok(Self {
                api_keys: keys.into(),
                enabled: true,
            });
        }

        if is_development {
            tracing::warn!("FAKEBUSTER_API_KEYS not set; bearer auth disabled in development");
            return Ok(Self::disabled());
        }

        anyhow::bail!("FAKEBUSTER_API_KEYS must list at least one key outside development")
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::from(Vec::new()),
            enabled: false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn allows(&self, token: &str) -> bool {
        // No early exit: every key is compared.
        self.api_keys.iter().fold(false, |found, key| {
            found | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
        })
    }
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Rejects requests without a known bearer key when auth is enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.is_enabled() {
        return next.run(req).await;
    }

    let token = bearer_token(req.headers().get(header::AUTHORIZATION)).map(ToOwned::to_owned);
    match token {
        Some(token) if auth.allows(&token) => {
            req.extensions_mut().insert(ClientKey(token));
            next.run(req).await
        }
        _ => {
            let request_id = request_id_of(&req);
            tracing::warn!(
                request_id = %request_id,
                path = %req.uri().path(),
                "rejected unauthenticated request"
            );
            ApiError::new(request_id, "unauthorized", "missing or invalid bearer token")
                .into_response()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter keyed by client.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Count one request for `client`, returning the wait until its window
    /// resets when the limit is already spent.
    async fn check(&self, client: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() >= MAX_TRACKED_CLIENTS {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started_at) < window);
        }

        let entry = clients.entry(client.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        let elapsed = now.duration_since(entry.started_at);
        if elapsed >= self.window {
            *entry = Window {
                started_at: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return Err(self.window.saturating_sub(now.duration_since(entry.started_at)));
        }
        entry.count += 1;
        Ok(())
    }
}

/// Enforces the per-client request budget.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ClientKey>()
        .map_or(ANONYMOUS_CLIENT, |k| k.0.as_str())
        .to_string();

    match rate_limit.check(&client).await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            let request_id = request_id_of(&req);
            tracing::warn!(
                request_id = %request_id,
                client_authenticated = client != ANONYMOUS_CLIENT,
                retry_after_secs = retry_after.as_secs(),
                "rate limit exceeded"
            );
            let mut res =
                ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(val) = HeaderValue::from_str(&secs.to_string()) {
                res.headers_mut().insert(header::RETRY_AFTER, val);
            }
            res
        }
    }
}
