//! HTTP middleware
//!
//! - `rate_limit`: in-memory token bucket rate limiting per client IP
//! - `security`: security-related response headers

pub mod rate_limit;
pub mod security;
