/// In-app notification endpoints
///
/// - `GET /api/v1/notifications`: the acting user's notifications
/// - `GET /api/v1/notifications/unread-count`: unread badge count
/// - `PATCH /api/v1/notifications/:id/read`: mark one as read
/// - `PATCH /api/v1/notifications/mark-all-read`: mark everything read
///
/// Reads are scoped by `user_id`, so users only ever see their own rows.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::PageQuery;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::models::notification::Notification;
use serde_json::json;
use uuid::Uuid;

/// `GET /api/v1/notifications`
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(page_query): Query<PageQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Notification>>>> {
    let (page, limit, offset) = page_query.resolve();

    let (notifications, total) =
        Notification::list_for_user(&state.db, actor.id, limit as i64, offset).await?;

    Ok(Json(ApiResponse::paginated(
        notifications,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/v1/notifications/unread-count`
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let count = Notification::unread_count(&state.db, actor.id).await?;

    Ok(Json(ApiResponse::data(json!({ "unread": count }))))
}

/// `PATCH /api/v1/notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let updated = Notification::mark_read(&state.db, id, actor.id).await?;
    if !updated {
        return Err(ApiError::NotFound);
    }

    Ok(Json(ApiResponse::message("Notification marked as read")))
}

/// `PATCH /api/v1/notifications/mark-all-read`
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let updated = Notification::mark_all_read(&state.db, actor.id).await?;

    Ok(Json(ApiResponse::data(json!({ "marked_read": updated }))))
}
