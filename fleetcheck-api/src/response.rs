/// JSON response envelope
///
/// Every successful response carries `{"success": true, ...}` with either a
/// `data` payload or a `message`, plus optional `pagination` metadata for
/// list endpoints. Pagination keys are camelCase to match the dashboard
/// client.

use serde::Serialize;

/// Pagination metadata included with list responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number
    pub current_page: u32,

    /// Total number of pages at the current page size
    pub total_pages: u32,

    /// Total matching rows
    pub total_items: i64,

    /// Page size
    pub items_per_page: u32,
}

impl Pagination {
    /// Builds pagination metadata from page, page size, and total row count
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as u64).div_ceil(limit.max(1) as u64)) as u32
        };
        Self {
            current_page: page,
            total_pages,
            total_items: total.max(0),
            items_per_page: limit,
        }
    }
}

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true for this type
    pub success: bool,

    /// Response payload, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Human-readable message, when there is no payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Pagination metadata for list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with a payload
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    /// Success response with a payload and pagination
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Success response carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rounding() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_items, 45);

        let p = Pagination::new(1, 20, 40);
        assert_eq!(p.total_pages, 2);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let p = Pagination::new(2, 20, 45);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalItems"], 45);
        assert_eq!(json["itemsPerPage"], 20);
    }

    #[test]
    fn test_data_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::data(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_message_envelope() {
        let json = serde_json::to_value(ApiResponse::message("Password updated")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Password updated");
        assert!(json.get("data").is_none());
    }
}
