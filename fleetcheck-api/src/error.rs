/// Error handling for the API server
///
/// Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
/// each variant to a status code and the standard `{success: false, message}`
/// envelope. Internal detail never leaks to clients: database and auth
/// failures are logged server-side and collapsed to generic messages.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetcheck_shared::auth::guard::AuthError;
use fleetcheck_shared::auth::jwt::JwtError;
use fleetcheck_shared::auth::password::PasswordError;
use serde::Serialize;
use serde_json::json;

/// One field-level validation failure
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorDetail {
    /// Name of the offending field
    pub field: String,

    /// Human-readable description of the problem
    pub message: String,
}

/// API error type covering all failure modes
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed field validation (400)
    #[error("Validation failed")]
    Validation(Vec<ValidationErrorDetail>),

    /// Request was well-formed but semantically invalid (400)
    #[error("{0}")]
    Unprocessable(String),

    /// Malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Authentication required or failed (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but not allowed (403)
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Resource does not exist, or belongs to another tenant (404)
    #[error("Resource not found")]
    NotFound,

    /// Uniqueness conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Too many requests (429)
    #[error("Too many requests, please try again later")]
    RateLimited {
        /// Seconds until the client may retry
        retry_after: u64,
    },

    /// Unexpected server failure (500)
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Builds a `Validation` error from `validator` output
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        ApiError::Validation(details)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Unprocessable(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Validation(details) => json!({
                "success": false,
                "message": "Validation failed",
                "errors": details,
            }),
            ApiError::Internal(source) => {
                tracing::error!(error = %source, "internal server error");
                json!({
                    "success": false,
                    "message": "Internal server error",
                })
            }
            other => json!({
                "success": false,
                "message": other.to_string(),
            }),
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default();
                let message = if constraint.contains("email") {
                    "Email already exists".to_string()
                } else if constraint.contains("license_plate") {
                    "A vehicle with this license plate already exists".to_string()
                } else {
                    "Resource already exists".to_string()
                };
                return ApiError::Conflict(message);
            }
        }
        ApiError::Internal(err.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Pool failures are server faults, everything else is a uniform 401
            AuthError::DatabaseError(db_err) => ApiError::Internal(db_err.into()),
            other => {
                tracing::debug!(reason = %other, "authentication rejected");
                ApiError::Unauthorized
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        tracing::debug!(reason = %err, "token rejected");
        ApiError::Unauthorized
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

/// Shorthand result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("dup".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::RateLimited { retry_after: 60 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused on 10.0.0.5"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_auth_error_collapses_to_unauthorized() {
        let err: ApiError = AuthError::MissingCredentials.into();
        assert!(matches!(err, ApiError::Unauthorized));

        let err: ApiError = AuthError::UnknownUser.into();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_from_validation_collects_fields() {
        use validator::Validate;

        #[derive(Validate)]
        struct Form {
            #[validate(email(message = "Invalid email format"))]
            email: String,
        }

        let form = Form {
            email: "not-an-email".to_string(),
        };
        let err = ApiError::from_validation(form.validate().unwrap_err());

        match err {
            ApiError::Validation(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, "Invalid email format");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
