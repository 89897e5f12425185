/// User management endpoints
///
/// - `GET /api/v1/users/me`: the authenticated account
/// - `PATCH /api/v1/users/me/password`: change own password
/// - `GET /api/v1/users`: list tenant users (admin/supervisor)
/// - `PATCH /api/v1/users/:id`: update a user
///
/// # Role Rules
///
/// Admins can update any user in their tenant, including role and
/// activation. Everyone else may update only their own `full_name`.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::{validate_body, PageQuery};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::auth::password::{
    hash_password, validate_password_strength, verify_password,
};
use fleetcheck_shared::models::user::{UpdateUser, User, UserRole};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Request body for updating a user
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 255, message = "Full name must not be empty"))]
    pub full_name: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New role (admin only)
    pub role: Option<UserRole>,

    /// Activate or deactivate (admin only)
    pub is_active: Option<bool>,
}

/// Request body for changing the own password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// The current password, re-checked before the change
    pub current_password: String,

    /// The new password
    pub new_password: String,
}

/// `GET /api/v1/users/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = User::find_in_company(&state.db, actor.id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ApiResponse::data(user)))
}

/// `PATCH /api/v1/users/me/password`
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate_password_strength(&body.new_password).map_err(ApiError::Unprocessable)?;

    let user = User::find_in_company(&state.db, actor.id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !verify_password(&body.current_password, &user.password_hash)? {
        return Err(ApiError::Unprocessable(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&body.new_password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CHANGE_PASSWORD".to_string(),
            resource_type: "user".to_string(),
            resource_id: Some(actor.id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::message("Password updated")))
}

/// `GET /api/v1/users`
///
/// Admin/supervisor only.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(page_query): Query<PageQuery>,
) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let (page, limit, offset) = page_query.resolve();
    let (users, total) =
        User::list_by_company(&state.db, actor.company_id, limit as i64, offset).await?;

    Ok(Json(ApiResponse::paginated(
        users,
        Pagination::new(page, limit, total),
    )))
}

/// `PATCH /api/v1/users/:id`
///
/// Admins may change anything; everyone else may change only their own
/// `full_name`. Cross-tenant targets come back 404 like any other resource.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    validate_body(&body)?;

    let is_admin = actor.role == UserRole::Admin;
    let is_self = actor.id == id;

    if !is_admin {
        if !is_self {
            return Err(ApiError::Forbidden);
        }
        if body.phone.is_some() || body.role.is_some() || body.is_active.is_some() {
            return Err(ApiError::Forbidden);
        }
    }

    let update = UpdateUser {
        full_name: body.full_name,
        phone: body.phone,
        role: body.role,
        is_active: body.is_active,
    };

    let user = User::update(&state.db, id, actor.company_id, update)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_USER".to_string(),
            resource_type: "user".to_string(),
            resource_id: Some(id),
            details: json!({ "self_update": is_self }),
        },
    );

    Ok(Json(ApiResponse::data(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_request_validation() {
        let body = UpdateUserRequest {
            full_name: Some(String::new()),
            phone: None,
            role: None,
            is_active: None,
        };
        assert!(body.validate().is_err());

        let body = UpdateUserRequest {
            full_name: Some("Ada Lovelace".to_string()),
            phone: None,
            role: None,
            is_active: None,
        };
        assert!(body.validate().is_ok());
    }
}
