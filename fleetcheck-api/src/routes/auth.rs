/// Authentication endpoints
///
/// - `POST /api/v1/auth/bootstrap`: one-time tenant + first admin creation
/// - `POST /api/v1/auth/register`: admin creates an account in their tenant
/// - `POST /api/v1/auth/login`: email/password login, returns token pair
/// - `POST /api/v1/auth/refresh`: exchanges a refresh token for a new access token
/// - `POST /api/v1/auth/forgot-password`: requests a password reset email
/// - `POST /api/v1/auth/reset-password`: consumes a reset token
///
/// # Failure Policy
///
/// Login failures are uniform: wrong password, unknown email, and
/// deactivated account all return the same 401 body. `forgot-password`
/// returns the same generic success whether or not the email exists.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::routes::validate_body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::auth::jwt::{self, Claims, TokenType};
use fleetcheck_shared::auth::password::{
    hash_password, validate_password_strength, verify_password,
};
use fleetcheck_shared::models::company::{Company, CreateCompany};
use fleetcheck_shared::models::user::{CreateUser, User, UserRole};
use fleetcheck_shared::notify::templates;
use fleetcheck_shared::notify::send_email_detached;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Reset tokens expire after one hour
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Request body for the bootstrap endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct BootstrapRequest {
    /// Name of the tenant company
    #[validate(length(min = 1, max = 255, message = "Company name is required"))]
    pub company_name: String,

    /// Optional company address
    pub address: Option<String>,

    /// Optional company phone
    pub phone: Option<String>,

    /// Optional company contact email
    #[validate(email(message = "Invalid company email format"))]
    pub company_email: Option<String>,

    /// Display name of the first admin
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    /// Email of the first admin
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password of the first admin
    pub password: String,
}

/// Request body for registering a new user (admin only)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Initial password
    pub password: String,

    /// Role for the new account
    pub role: UserRole,

    /// Optional phone number
    pub phone: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for the refresh endpoint
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// A valid refresh token
    pub refresh_token: String,
}

/// Request body for forgot-password
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address of the account
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Request body for reset-password
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Reset token from the email link
    pub token: String,

    /// New password
    pub password: String,
}

/// Token pair plus the authenticated user
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    /// The account
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Payload for the bootstrap response: the tenant comes back too
#[derive(Debug, Serialize)]
pub struct BootstrapPayload {
    /// The new tenant
    pub company: Company,

    /// The first admin
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

fn issue_token_pair(user: &User, secret: &str) -> Result<(String, String), ApiError> {
    let access = jwt::create_token(
        &Claims::new(user.id, user.company_id, &user.role, TokenType::Access),
        secret,
    )?;
    let refresh = jwt::create_token(
        &Claims::new(user.id, user.company_id, &user.role, TokenType::Refresh),
        secret,
    )?;
    Ok((access, refresh))
}

/// `POST /api/v1/auth/bootstrap`
///
/// Creates the tenant company and its first admin. Runs exactly once: any
/// later call returns 409 regardless of payload.
pub async fn bootstrap(
    State(state): State<AppState>,
    Json(body): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BootstrapPayload>>)> {
    validate_body(&body)?;
    validate_password_strength(&body.password).map_err(ApiError::Unprocessable)?;

    if Company::count(&state.db).await? > 0 {
        return Err(ApiError::Conflict(
            "System has already been bootstrapped".to_string(),
        ));
    }

    let password_hash = hash_password(&body.password)?;

    let company = Company::create(
        &state.db,
        CreateCompany {
            name: body.company_name,
            address: body.address,
            phone: body.phone,
            email: body.company_email,
        },
    )
    .await?;

    let user = User::create(
        &state.db,
        CreateUser {
            company_id: company.id,
            full_name: body.full_name,
            email: body.email,
            password_hash,
            role: UserRole::Admin,
            phone: None,
        },
    )
    .await?;

    let (access_token, refresh_token) = issue_token_pair(&user, state.jwt_secret())?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: company.id,
            user_id: user.id,
            action: "BOOTSTRAP".to_string(),
            resource_type: "company".to_string(),
            resource_id: Some(company.id),
            details: json!({ "company_name": company.name }),
        },
    );

    send_email_detached(
        state.notifier.clone(),
        user.email.clone(),
        templates::welcome_email(&user.full_name, &company.name),
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(BootstrapPayload {
            company,
            user,
            access_token,
            refresh_token,
        })),
    ))
}

/// `POST /api/v1/auth/register`
///
/// Admin-only. Creates a new account inside the admin's tenant and sends a
/// welcome email.
pub async fn register(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    if actor.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }

    validate_body(&body)?;
    validate_password_strength(&body.password).map_err(ApiError::Unprocessable)?;

    let password_hash = hash_password(&body.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            company_id: actor.company_id,
            full_name: body.full_name,
            email: body.email,
            password_hash,
            role: body.role,
            phone: body.phone,
        },
    )
    .await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_USER".to_string(),
            resource_type: "user".to_string(),
            resource_id: Some(user.id),
            details: json!({ "email": user.email, "role": user.role }),
        },
    );

    if let Some(company) = Company::find_by_id(&state.db, actor.company_id).await? {
        send_email_detached(
            state.notifier.clone(),
            user.email.clone(),
            templates::welcome_email(&user.full_name, &company.name),
        );
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::data(user))))
}

/// `POST /api/v1/auth/login`
///
/// Wrong password, unknown email, and deactivated account all fail with the
/// same generic 401.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthPayload>>> {
    validate_body(&body)?;

    let user = User::find_by_email(&state.db, &body.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.is_active || !verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized);
    }

    let (access_token, refresh_token) = issue_token_pair(&user, state.jwt_secret())?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: user.company_id,
            user_id: user.id,
            action: "LOGIN".to_string(),
            resource_type: "user".to_string(),
            resource_id: Some(user.id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(AuthPayload {
        user,
        access_token,
        refresh_token,
    })))
}

/// `POST /api/v1/auth/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let access_token = jwt::refresh_access_token(&body.refresh_token, state.jwt_secret())?;

    Ok(Json(ApiResponse::data(json!({
        "access_token": access_token,
    }))))
}

/// `POST /api/v1/auth/forgot-password`
///
/// Always answers with the same generic message so callers cannot probe
/// which emails exist. A reset token is stored and mailed only for real,
/// active accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate_body(&body)?;

    if let Some(user) = User::find_by_email(&state.db, &body.email).await? {
        if user.is_active {
            let token: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(64)
                .map(char::from)
                .collect();
            let expiry = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

            User::set_reset_token(&state.db, user.id, &token, expiry).await?;

            let reset_url = format!(
                "{}/reset-password?token={}",
                state.config.frontend_url.trim_end_matches('/'),
                token
            );

            send_email_detached(
                state.notifier.clone(),
                user.email.clone(),
                templates::password_reset_email(&user.full_name, &reset_url),
            );

            audit::record_detached(
                state.db.clone(),
                NewAuditLog {
                    company_id: user.company_id,
                    user_id: user.id,
                    action: "REQUEST_PASSWORD_RESET".to_string(),
                    resource_type: "user".to_string(),
                    resource_id: Some(user.id),
                    details: json!({}),
                },
            );
        }
    }

    Ok(Json(ApiResponse::message(
        "If an account exists for that email, a reset link has been sent",
    )))
}

/// `POST /api/v1/auth/reset-password`
///
/// Consumes a reset token. Tokens are single-use: the token columns are
/// cleared in the same flow that accepts them.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate_password_strength(&body.password).map_err(ApiError::Unprocessable)?;

    let user = User::find_by_reset_token(&state.db, &body.token)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = hash_password(&body.password)?;

    User::update_password(&state.db, user.id, &password_hash).await?;
    User::clear_reset_token(&state.db, user.id).await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: user.company_id,
            user_id: user.id,
            action: "RESET_PASSWORD".to_string(),
            resource_type: "user".to_string(),
            resource_id: Some(user.id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::message("Password has been reset")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let body = LoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(body.validate().is_err());

        let body = LoginRequest {
            email: "a@acme.com".to_string(),
            password: "Secret1!".to_string(),
        };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_bootstrap_request_validation() {
        let body = BootstrapRequest {
            company_name: String::new(),
            address: None,
            phone: None,
            company_email: None,
            full_name: "Ada".to_string(),
            email: "a@acme.com".to_string(),
            password: "Secret1!".to_string(),
        };
        assert!(body.validate().is_err());
    }
}
