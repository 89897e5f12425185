//! API route handlers
//!
//! Handlers are grouped by resource. Every tenant-scoped handler takes its
//! `company_id` from the [`AuthUser`](fleetcheck_shared::auth::guard::AuthUser)
//! extension inserted by the access guard, never from the request body.

pub mod auth;
pub mod companies;
pub mod health;
pub mod inspections;
pub mod issues;
pub mod notifications;
pub mod templates;
pub mod users;
pub mod vehicles;

use crate::error::ApiError;
use serde::Deserialize;

/// Common pagination query parameters
///
/// Shared by all listing endpoints. Values are clamped so a hostile `limit`
/// cannot turn a listing into a table scan.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,

    /// Page size (max 100)
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Resolves page, limit, and the SQL offset
    pub fn resolve(&self) -> (u32, u32, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page as i64 - 1) * limit as i64;
        (page, limit, offset)
    }
}

/// Runs `validator` checks on a request body, mapping failures to a 400
fn validate_body<T: validator::Validate>(body: &T) -> Result<(), ApiError> {
    body.validate().map_err(ApiError::from_validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery {
            page: None,
            limit: None,
        };
        assert_eq!(query.resolve(), (1, 20, 0));
    }

    #[test]
    fn test_page_query_offset() {
        let query = PageQuery {
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(query.resolve(), (2, 10, 10));
    }

    #[test]
    fn test_page_query_clamped() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(10_000),
        };
        assert_eq!(query.resolve(), (1, 100, 0));
    }
}
