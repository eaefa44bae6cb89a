use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied request ID that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID for the current request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    used: usize,
}

/// Fixed-window search budget shared by every request. Each search spends
/// NewsData quota.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Takes one slot from the current window, opening a fresh window when
    /// the old one has expired. Returns `false` when the budget is spent.
    pub async fn try_acquire(&self) -> bool {
        let mut current = self.current.lock().await;
        if current.opened_at.elapsed() >= self.window {
            *current = Window {
                opened_at: Instant::now(),
                used: 0,
            };
        }
        if current.used < self.max_requests {
            current.used += 1;
            true
        } else {
            false
        }
    }
}

/// Reuses the caller's `x-request-id` when it is short printable ASCII,
/// otherwise mints a `UUIDv4`. The ID goes into the request extensions and
/// back out on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| {
            !v.is_empty()
                && v.len() <= MAX_REQUEST_ID_LEN
                && v.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Rejects searches with `429 rate_limited` once the window budget is spent.
pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limit.try_acquire().await {
        return next.run(req).await;
    }

    let req_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::warn!(
        request_id = %req_id,
        max_requests = limit.max_requests,
        window_secs = limit.window.as_secs(),
        "search budget exhausted"
    );
    ApiError::new(
        req_id,
        "rate_limited",
        format!(
            "at most {} searches per {} seconds",
            limit.max_requests,
            limit.window.as_secs()
        ),
    )
    .into_response()
}
