/// Inspection endpoints
///
/// - `POST /api/v1/inspections`: start an inspection, optionally with answers
/// - `GET /api/v1/inspections`: list with filtering and pagination
/// - `GET /api/v1/inspections/stats`: status counts over a date range
/// - `GET /api/v1/inspections/export/csv`: CSV download of matching rows
/// - `GET /api/v1/inspections/:id`: fetch one inspection with its answers
/// - `PATCH /api/v1/inspections/:id`: update status/notes
/// - `POST /api/v1/inspections/:id/answers`: submit checklist answers
///
/// # State Machine
///
/// `pending -> in_progress -> completed`, forward only. A completed
/// inspection rejects both updates and answer submissions with a 400.
/// Submitting answers to a pending inspection moves it to `in_progress`.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::validate_body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::export::{export_filename, inspections_to_csv};
use fleetcheck_shared::models::inspection::{
    CreateAnswer, CreateInspection, Inspection, InspectionAnswer, InspectionFilter,
    InspectionListRow, InspectionStats, InspectionStatus, UpdateInspection,
};
use fleetcheck_shared::models::template::ChecklistTemplate;
use fleetcheck_shared::models::vehicle::Vehicle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// One answer in a submission body
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Checklist item being answered
    pub item_id: Uuid,

    /// Boolean answer (yes_no items)
    pub value_bool: Option<bool>,

    /// Text answer (text items)
    pub value_text: Option<String>,

    /// Numeric answer (number items)
    pub value_number: Option<f64>,

    /// Photo URL answer (photo items)
    pub value_photo_url: Option<String>,

    /// Optional per-answer notes
    pub notes: Option<String>,
}

impl From<AnswerRequest> for CreateAnswer {
    fn from(a: AnswerRequest) -> Self {
        CreateAnswer {
            item_id: a.item_id,
            value_bool: a.value_bool,
            value_text: a.value_text,
            value_number: a.value_number,
            value_photo_url: a.value_photo_url,
            notes: a.notes,
        }
    }
}

/// Request body for creating an inspection
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInspectionRequest {
    /// Vehicle being inspected
    pub vehicle_id: Uuid,

    /// Checklist template to answer against
    pub template_id: Uuid,

    /// Optional notes
    #[validate(length(max = 5000, message = "Notes are too long"))]
    pub notes: Option<String>,

    /// Answers recorded up front, if any
    pub answers: Option<Vec<AnswerRequest>>,
}

/// Request body for submitting answers to an existing inspection
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    /// The answers
    pub answers: Vec<AnswerRequest>,
}

/// Query parameters for listing, stats, and export
#[derive(Debug, Deserialize)]
pub struct InspectionQuery {
    /// Restrict to one vehicle
    pub vehicle_id: Option<Uuid>,

    /// Restrict to one inspector
    pub inspector_id: Option<Uuid>,

    /// Restrict to one status
    pub status: Option<String>,

    /// Created at or after (RFC 3339)
    pub from: Option<DateTime<Utc>>,

    /// Created before (RFC 3339)
    pub to: Option<DateTime<Utc>>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub limit: Option<u32>,
}

impl InspectionQuery {
    fn filter(&self) -> Result<InspectionFilter, ApiError> {
        let status = match self.status.as_deref() {
            Some(s) => Some(
                InspectionStatus::parse(s)
                    .ok_or_else(|| ApiError::BadRequest(format!("Invalid status filter: {}", s)))?,
            ),
            None => None,
        };

        Ok(InspectionFilter {
            vehicle_id: self.vehicle_id,
            inspector_id: self.inspector_id,
            status,
            from: self.from,
            to: self.to,
        })
    }
}

/// An inspection together with its recorded answers
#[derive(Debug, Serialize)]
pub struct InspectionWithAnswers {
    /// The inspection
    #[serde(flatten)]
    pub inspection: Inspection,

    /// Answers recorded so far
    pub answers: Vec<InspectionAnswer>,
}

/// `POST /api/v1/inspections`
///
/// The acting user becomes the inspector. Vehicle and template must exist
/// within the tenant.
pub async fn create_inspection(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<CreateInspectionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<InspectionWithAnswers>>)> {
    validate_body(&body)?;

    if Vehicle::find_by_id(&state.db, body.vehicle_id, actor.company_id)
        .await?
        .is_none()
    {
        return Err(ApiError::Unprocessable("Unknown vehicle".to_string()));
    }
    if ChecklistTemplate::find_by_id(&state.db, body.template_id, actor.company_id)
        .await?
        .is_none()
    {
        return Err(ApiError::Unprocessable("Unknown template".to_string()));
    }

    let inspection = Inspection::create(
        &state.db,
        CreateInspection {
            company_id: actor.company_id,
            vehicle_id: body.vehicle_id,
            template_id: body.template_id,
            inspector_id: actor.id,
            notes: body.notes,
        },
    )
    .await?;

    let mut answers = Vec::new();
    let mut inspection = inspection;
    if let Some(answer_bodies) = body.answers {
        if !answer_bodies.is_empty() {
            answers = InspectionAnswer::insert_many(
                &state.db,
                inspection.id,
                answer_bodies.into_iter().map(Into::into).collect(),
            )
            .await?;

            // Answers arriving with the creation mean work has started
            if let Some(updated) = Inspection::update(
                &state.db,
                inspection.id,
                actor.company_id,
                UpdateInspection {
                    status: Some(InspectionStatus::InProgress),
                    notes: None,
                },
            )
            .await?
            {
                inspection = updated;
            }
        }
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_INSPECTION".to_string(),
            resource_type: "inspection".to_string(),
            resource_id: Some(inspection.id),
            details: json!({ "vehicle_id": inspection.vehicle_id }),
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(InspectionWithAnswers {
            inspection,
            answers,
        })),
    ))
}

/// `GET /api/v1/inspections`
pub async fn list_inspections(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<InspectionQuery>,
) -> ApiResult<Json<ApiResponse<Vec<InspectionListRow>>>> {
    let filter = query.filter()?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page as i64 - 1) * limit as i64;

    let (rows, total) =
        Inspection::list(&state.db, actor.company_id, &filter, limit as i64, offset).await?;

    Ok(Json(ApiResponse::paginated(
        rows,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/v1/inspections/stats`
pub async fn inspection_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<InspectionQuery>,
) -> ApiResult<Json<ApiResponse<InspectionStats>>> {
    let stats = Inspection::stats(&state.db, actor.company_id, query.from, query.to).await?;

    Ok(Json(ApiResponse::data(stats)))
}

/// `GET /api/v1/inspections/export/csv`
///
/// Streams all matching rows as a CSV attachment named
/// `inspections_YYYY-MM-DD.csv`.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<InspectionQuery>,
) -> ApiResult<Response> {
    let filter = query.filter()?;

    let rows = Inspection::export(&state.db, actor.company_id, &filter).await?;
    let csv = inspections_to_csv(&rows);
    let filename = export_filename(Utc::now());

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "EXPORT_INSPECTIONS".to_string(),
            resource_type: "inspection".to_string(),
            resource_id: None,
            details: json!({ "row_count": rows.len() }),
        },
    );

    let response = (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response();

    Ok(response)
}

/// `GET /api/v1/inspections/:id`
pub async fn get_inspection(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<InspectionWithAnswers>>> {
    let inspection = Inspection::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let answers = InspectionAnswer::list_for_inspection(&state.db, inspection.id).await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "VIEW_INSPECTION".to_string(),
            resource_type: "inspection".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(InspectionWithAnswers {
        inspection,
        answers,
    })))
}

/// Request body for updating an inspection
#[derive(Debug, Deserialize)]
pub struct UpdateInspectionRequest {
    /// New status (must be a forward transition)
    pub status: Option<InspectionStatus>,

    /// New notes
    pub notes: Option<String>,
}

/// `PATCH /api/v1/inspections/:id`
pub async fn update_inspection(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInspectionRequest>,
) -> ApiResult<Json<ApiResponse<Inspection>>> {
    let current = Inspection::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let current_status = current
        .get_status()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unrecognized inspection status")))?;

    if current_status == InspectionStatus::Completed {
        return Err(ApiError::Unprocessable(
            "Completed inspections cannot be modified".to_string(),
        ));
    }

    if let Some(next) = body.status {
        if !current_status.can_transition_to(next) {
            return Err(ApiError::Unprocessable(format!(
                "Cannot move inspection from {} to {}",
                current_status.as_str(),
                next.as_str()
            )));
        }
    }

    let completing = body.status == Some(InspectionStatus::Completed);

    let inspection = Inspection::update(
        &state.db,
        id,
        actor.company_id,
        UpdateInspection {
            status: body.status,
            notes: body.notes,
        },
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: if completing {
                "COMPLETE_INSPECTION".to_string()
            } else {
                "UPDATE_INSPECTION".to_string()
            },
            resource_type: "inspection".to_string(),
            resource_id: Some(id),
            details: json!({ "status": inspection.status }),
        },
    );

    Ok(Json(ApiResponse::data(inspection)))
}

/// `POST /api/v1/inspections/:id/answers`
pub async fn submit_answers(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitAnswersRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<InspectionAnswer>>>)> {
    if body.answers.is_empty() {
        return Err(ApiError::BadRequest("No answers provided".to_string()));
    }

    let inspection = Inspection::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if inspection.get_status() == Some(InspectionStatus::Completed) {
        return Err(ApiError::Unprocessable(
            "Completed inspections cannot accept answers".to_string(),
        ));
    }

    let answers = InspectionAnswer::insert_many(
        &state.db,
        inspection.id,
        body.answers.into_iter().map(Into::into).collect(),
    )
    .await?;

    if inspection.get_status() == Some(InspectionStatus::Pending) {
        Inspection::update(
            &state.db,
            inspection.id,
            actor.company_id,
            UpdateInspection {
                status: Some(InspectionStatus::InProgress),
                notes: None,
            },
        )
        .await?;
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "SUBMIT_ANSWERS".to_string(),
            resource_type: "inspection".to_string(),
            resource_id: Some(id),
            details: json!({ "answer_count": answers.len() }),
        },
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::data(answers))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_invalid_status() {
        let query = InspectionQuery {
            vehicle_id: None,
            inspector_id: None,
            status: Some("done".to_string()),
            from: None,
            to: None,
            page: None,
            limit: None,
        };

        assert!(matches!(query.filter(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_query_accepts_valid_status() {
        let query = InspectionQuery {
            vehicle_id: None,
            inspector_id: None,
            status: Some("in_progress".to_string()),
            from: None,
            to: None,
            page: None,
            limit: None,
        };

        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(InspectionStatus::InProgress));
    }
}
