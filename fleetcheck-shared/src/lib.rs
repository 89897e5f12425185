//! # FleetCheck Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the FleetCheck API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and tenant-scoped CRUD operations
//! - `auth`: Password hashing, JWT tokens, and the request access guard
//! - `audit`: Append-only audit log recorder
//! - `notify`: Email/SMS dispatch and message templates
//! - `export`: CSV export helpers
//! - `db`: Connection pool and migrations

pub mod audit;
pub mod auth;
pub mod db;
pub mod export;
pub mod models;
pub mod notify;

/// Current version of the FleetCheck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
