/// Issue endpoints
///
/// - `POST /api/v1/issues`: file an issue against a vehicle
/// - `GET /api/v1/issues`: list with filtering and pagination
/// - `GET /api/v1/issues/stats`: counts by resolution state and severity
/// - `GET /api/v1/issues/:id`: fetch one issue
/// - `PATCH /api/v1/issues/:id`: update an open issue (reporter or manager)
/// - `PATCH /api/v1/issues/:id/resolve`: resolve (admin/supervisor)
///
/// Filing an issue fans out to the tenant's managers: an in-app notification
/// row per admin/supervisor, plus an email when the channel is configured.
/// The fan-out runs detached after the insert and never fails the request.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::validate_body;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::models::issue::{
    CreateIssue, Issue, IssueFilter, IssueListRow, IssueSeverity, IssueStats, UpdateIssue,
};
use fleetcheck_shared::models::notification::{CreateNotification, Notification};
use fleetcheck_shared::models::user::User;
use fleetcheck_shared::models::vehicle::Vehicle;
use fleetcheck_shared::notify::templates;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Request body for filing an issue
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIssueRequest {
    /// Vehicle the issue concerns
    pub vehicle_id: Uuid,

    /// Severity
    pub severity: IssueSeverity,

    /// Problem description
    #[validate(length(min = 1, max = 5000, message = "Description is required"))]
    pub description: String,

    /// Photo URLs attached to the report
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Request body for resolving an issue
#[derive(Debug, Default, Deserialize)]
pub struct ResolveIssueRequest {
    /// Notes recorded at resolution time
    pub resolution_notes: Option<String>,
}

/// Query parameters for listing issues
#[derive(Debug, Deserialize)]
pub struct ListIssuesQuery {
    /// Restrict to one vehicle
    pub vehicle_id: Option<Uuid>,

    /// Restrict by resolution state
    pub resolved: Option<bool>,

    /// Restrict to one severity
    pub severity: Option<String>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub limit: Option<u32>,
}

/// Query parameters for issue stats
#[derive(Debug, Deserialize)]
pub struct IssueStatsQuery {
    /// Created at or after (RFC 3339)
    pub from: Option<DateTime<Utc>>,

    /// Created before (RFC 3339)
    pub to: Option<DateTime<Utc>>,
}

/// Notifies the tenant's managers about a freshly filed issue
///
/// Runs on a background task; failures are logged and swallowed.
fn notify_managers(state: &AppState, issue: &Issue, vehicle_name: String) {
    let db = state.db.clone();
    let notifier = state.notifier.clone();
    let company_id = issue.company_id;
    let issue_id = issue.id;
    let severity = issue.severity.clone();
    let description = issue.description.clone();

    tokio::spawn(async move {
        let managers = match User::list_managers(&db, company_id).await {
            Ok(managers) => managers,
            Err(e) => {
                tracing::warn!(error = %e, issue_id = %issue_id, "Failed to load managers for issue fan-out");
                return;
            }
        };

        for manager in managers {
            let result = Notification::create(
                &db,
                CreateNotification {
                    user_id: manager.id,
                    company_id,
                    kind: "issue_reported".to_string(),
                    title: format!("[{}] Issue reported on {}", severity, vehicle_name),
                    body: description.clone(),
                },
            )
            .await;

            if let Err(e) = result {
                tracing::warn!(error = %e, issue_id = %issue_id, "Failed to create issue notification");
            }

            if let Err(e) = notifier
                .send_email(
                    &manager.email,
                    &templates::issue_notification_email(
                        &manager.full_name,
                        &vehicle_name,
                        &severity,
                        &description,
                    ),
                )
                .await
            {
                tracing::warn!(error = %e, to = %manager.email, "Failed to send issue email");
            }

            // Critical issues also page managers by SMS when a number is on file
            if severity == IssueSeverity::Critical.as_str() {
                if let Some(phone) = &manager.phone {
                    if let Err(e) = notifier
                        .send_sms(
                            phone,
                            &templates::issue_notification_sms(&vehicle_name, &severity),
                        )
                        .await
                    {
                        tracing::warn!(error = %e, to = %phone, "Failed to send issue SMS");
                    }
                }
            }
        }
    });
}

/// `POST /api/v1/issues`
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<CreateIssueRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Issue>>)> {
    validate_body(&body)?;

    let vehicle = Vehicle::find_by_id(&state.db, body.vehicle_id, actor.company_id)
        .await?
        .ok_or_else(|| ApiError::Unprocessable("Unknown vehicle".to_string()))?;

    let issue = Issue::create(
        &state.db,
        CreateIssue {
            company_id: actor.company_id,
            vehicle_id: body.vehicle_id,
            reported_by: actor.id,
            severity: body.severity,
            description: body.description,
            photo_urls: body.photo_urls,
        },
    )
    .await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_ISSUE".to_string(),
            resource_type: "issue".to_string(),
            resource_id: Some(issue.id),
            details: json!({ "vehicle_id": issue.vehicle_id, "severity": issue.severity }),
        },
    );

    notify_managers(&state, &issue, vehicle.name);

    Ok((StatusCode::CREATED, Json(ApiResponse::data(issue))))
}

/// `GET /api/v1/issues`
pub async fn list_issues(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ListIssuesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<IssueListRow>>>> {
    let severity = match query.severity.as_deref() {
        Some(s) => Some(
            IssueSeverity::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid severity filter: {}", s)))?,
        ),
        None => None,
    };

    let filter = IssueFilter {
        vehicle_id: query.vehicle_id,
        resolved: query.resolved,
        severity,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page as i64 - 1) * limit as i64;

    let (rows, total) =
        Issue::list(&state.db, actor.company_id, &filter, limit as i64, offset).await?;

    Ok(Json(ApiResponse::paginated(
        rows,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/v1/issues/stats`
pub async fn issue_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<IssueStatsQuery>,
) -> ApiResult<Json<ApiResponse<IssueStats>>> {
    let stats = Issue::stats(&state.db, actor.company_id, query.from, query.to).await?;

    Ok(Json(ApiResponse::data(stats)))
}

/// `GET /api/v1/issues/:id`
pub async fn get_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Issue>>> {
    let issue = Issue::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ApiResponse::data(issue)))
}

/// Request body for updating an open issue
#[derive(Debug, Deserialize)]
pub struct UpdateIssueRequest {
    /// New severity
    pub severity: Option<IssueSeverity>,

    /// New description
    pub description: Option<String>,

    /// Replacement photo URL list
    pub photo_urls: Option<Vec<String>>,
}

/// `PATCH /api/v1/issues/:id`
///
/// Only the reporter or a manager may edit, and only while the issue is
/// open.
pub async fn update_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateIssueRequest>,
) -> ApiResult<Json<ApiResponse<Issue>>> {
    let current = Issue::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if current.reported_by != actor.id && !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }
    if current.resolved {
        return Err(ApiError::Unprocessable(
            "Resolved issues cannot be modified".to_string(),
        ));
    }

    let issue = Issue::update(
        &state.db,
        id,
        actor.company_id,
        UpdateIssue {
            severity: body.severity,
            description: body.description,
            photo_urls: body.photo_urls,
        },
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_ISSUE".to_string(),
            resource_type: "issue".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(issue)))
}

/// `PATCH /api/v1/issues/:id/resolve`
///
/// Admin/supervisor only. Resolution is one-way; resolving twice is a 400.
pub async fn resolve_issue(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveIssueRequest>,
) -> ApiResult<Json<ApiResponse<Issue>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let current = Issue::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if current.resolved {
        return Err(ApiError::Unprocessable(
            "Issue is already resolved".to_string(),
        ));
    }

    let issue = Issue::resolve(&state.db, id, actor.company_id, actor.id, body.resolution_notes)
        .await?
        // A concurrent resolver can win between the check and the update
        .ok_or_else(|| ApiError::Unprocessable("Issue is already resolved".to_string()))?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "RESOLVE_ISSUE".to_string(),
            resource_type: "issue".to_string(),
            resource_id: Some(id),
            details: json!({ "resolution_notes": issue.resolution_notes }),
        },
    );

    Ok(Json(ApiResponse::data(issue)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_issue_request_validation() {
        let body = CreateIssueRequest {
            vehicle_id: Uuid::new_v4(),
            severity: IssueSeverity::Critical,
            description: String::new(),
            photo_urls: vec![],
        };
        assert!(body.validate().is_err());

        let body = CreateIssueRequest {
            vehicle_id: Uuid::new_v4(),
            severity: IssueSeverity::Low,
            description: "Brakes grinding".to_string(),
            photo_urls: vec!["https://cdn.example/p.jpg".to_string()],
        };
        assert!(body.validate().is_ok());
    }
}
