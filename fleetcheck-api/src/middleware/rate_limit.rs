/// Rate limiting middleware
///
/// Token bucket rate limiting keyed by client IP, with all state held
/// in-process. Two limit classes exist:
///
/// - **Auth**: 5 requests per 15 minutes, applied to login, registration,
///   and password reset endpoints
/// - **General**: 100 requests per 15 minutes, applied to everything under
///   the API prefix
///
/// # Algorithm
///
/// Token bucket:
/// - Tokens refill at constant rate
/// - Each request consumes 1 token
/// - Request blocked with 429 + `Retry-After` if bucket empty
///
/// # Client identification
///
/// The first address in `X-Forwarded-For` wins when present (the service is
/// expected to sit behind a reverse proxy), otherwise the socket peer
/// address is used.

use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Rate limit class configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Maximum tokens in bucket (burst capacity)
    pub bucket_capacity: u32,

    /// Token refill rate (tokens per second)
    pub refill_rate: f64,
}

impl RateLimit {
    /// Limit for authentication endpoints: 5 requests per 15 minutes
    pub fn auth() -> Self {
        RateLimit {
            bucket_capacity: 5,
            refill_rate: 5.0 / 900.0,
        }
    }

    /// Limit for general API traffic: 100 requests per 15 minutes
    pub fn general() -> Self {
        RateLimit {
            bucket_capacity: 100,
            refill_rate: 100.0 / 900.0,
        }
    }
}

/// Token bucket state for one client
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: unix_now(),
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = unix_now();
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        self.tokens = (self.tokens + elapsed_secs * rate).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume one token
    fn try_consume(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until one token is available
    fn seconds_until_available(&self, rate: f64) -> u64 {
        let deficit = 1.0 - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// In-memory rate limiter holding one bucket map per limit class
pub struct RateLimiter {
    auth: Mutex<HashMap<String, TokenBucket>>,
    general: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            auth: Mutex::new(HashMap::new()),
            general: Mutex::new(HashMap::new()),
        }
    }

    /// Checks one request against a limit class
    ///
    /// Returns `Ok(())` when the request may proceed, or the number of
    /// seconds the client must wait.
    fn check(&self, buckets: &Mutex<HashMap<String, TokenBucket>>, limit: RateLimit, key: &str) -> Result<(), u64> {
        let mut map = match buckets.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic elsewhere; letting traffic
            // through is preferable to failing every request.
            Err(poisoned) => poisoned.into_inner(),
        };

        let bucket = map
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(limit.bucket_capacity));
        bucket.refill(limit.refill_rate, limit.bucket_capacity);

        if bucket.try_consume() {
            Ok(())
        } else {
            Err(bucket.seconds_until_available(limit.refill_rate))
        }
    }

    /// Checks a request against the auth class
    pub fn check_auth(&self, key: &str) -> Result<(), u64> {
        self.check(&self.auth, RateLimit::auth(), key)
    }

    /// Checks a request against the general class
    pub fn check_general(&self, key: &str) -> Result<(), u64> {
        self.check(&self.general, RateLimit::general(), key)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the client key for rate limiting
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying the general rate limit
pub async fn general_rate_limit(
    State(state): State<crate::app::AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(request.headers(), peer.map(|ConnectInfo(addr)| addr));

    state
        .limiter
        .check_general(&key)
        .map_err(|retry_after| ApiError::RateLimited { retry_after })?;

    Ok(next.run(request).await)
}

/// Middleware applying the stricter auth rate limit
pub async fn auth_rate_limit(
    State(state): State<crate::app::AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(request.headers(), peer.map(|ConnectInfo(addr)| addr));

    state.limiter.check_auth(&key).map_err(|retry_after| {
        tracing::warn!(client = %key, retry_after, "auth rate limit exceeded");
        ApiError::RateLimited { retry_after }
    })?;

    Ok(next.run(request).await)
}
