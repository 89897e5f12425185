/// Company (tenant) endpoints
///
/// - `GET /api/v1/companies/:id`: the tenant profile
/// - `PATCH /api/v1/companies/:id`: update the tenant profile (admin)
///
/// A company is only visible to its own members. Requests for any other
/// company ID return 404, never 403, so tenant IDs cannot be probed.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::models::company::{Company, UpdateCompany};
use fleetcheck_shared::models::user::UserRole;
use serde_json::json;
use uuid::Uuid;

/// `GET /api/v1/companies/:id`
pub async fn get_company(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    if id != actor.company_id {
        return Err(ApiError::NotFound);
    }

    let company = Company::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ApiResponse::data(company)))
}

/// `PATCH /api/v1/companies/:id`
///
/// Admin only.
pub async fn update_company(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCompany>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    if id != actor.company_id {
        return Err(ApiError::NotFound);
    }
    if actor.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }

    let company = Company::update(&state.db, id, body)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_COMPANY".to_string(),
            resource_type: "company".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(company)))
}
