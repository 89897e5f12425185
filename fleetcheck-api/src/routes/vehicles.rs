/// Vehicle endpoints
///
/// - `POST /api/v1/vehicles`: add a vehicle (admin/supervisor)
/// - `GET /api/v1/vehicles`: list with filtering, search, sorting, pagination
/// - `GET /api/v1/vehicles/:id`: fetch one vehicle
/// - `PATCH /api/v1/vehicles/:id`: update (admin/supervisor)
/// - `DELETE /api/v1/vehicles/:id`: soft delete (admin/supervisor)

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::validate_body;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::models::vehicle::{
    sort_column, CreateVehicle, UpdateVehicle, Vehicle, VehicleFilter, VehicleStatus,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a vehicle
///
/// No tenant field exists; `company_id` is stamped from the acting user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// License plate, unique within the tenant
    #[validate(length(min = 1, max = 50, message = "License plate is required"))]
    pub license_plate: String,

    /// Optional vehicle type
    pub vehicle_type: Option<String>,

    /// Optional manufacturer
    pub make: Option<String>,

    /// Optional model
    pub model: Option<String>,

    /// Optional model year
    #[validate(range(min = 1900, max = 2100, message = "Year is out of range"))]
    pub year: Option<i32>,
}

/// Query parameters for listing vehicles
#[derive(Debug, Deserialize)]
pub struct ListVehiclesQuery {
    /// Restrict to one status
    pub status: Option<String>,

    /// Restrict to a vehicle type
    pub vehicle_type: Option<String>,

    /// Substring search over name and license plate
    pub search: Option<String>,

    /// Sort column (whitelisted)
    pub sort_by: Option<String>,

    /// "asc" or "desc" (default desc)
    pub sort_order: Option<String>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub limit: Option<u32>,
}

/// `POST /api/v1/vehicles`
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<CreateVehicleRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }
    validate_body(&body)?;

    let vehicle = Vehicle::create(
        &state.db,
        CreateVehicle {
            company_id: actor.company_id,
            name: body.name,
            license_plate: body.license_plate,
            vehicle_type: body.vehicle_type,
            make: body.make,
            model: body.model,
            year: body.year,
        },
    )
    .await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_VEHICLE".to_string(),
            resource_type: "vehicle".to_string(),
            resource_id: Some(vehicle.id),
            details: json!({ "license_plate": vehicle.license_plate }),
        },
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::data(vehicle))))
}

/// `GET /api/v1/vehicles`
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ListVehiclesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Vehicle>>>> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            VehicleStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status filter: {}", s)))?,
        ),
        None => None,
    };

    let filter = VehicleFilter {
        status,
        vehicle_type: query.vehicle_type,
        search: query.search,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page as i64 - 1) * limit as i64;

    let sort_by = sort_column(query.sort_by.as_deref());
    let descending = !matches!(query.sort_order.as_deref(), Some("asc"));

    let (vehicles, total) = Vehicle::list(
        &state.db,
        actor.company_id,
        &filter,
        sort_by,
        descending,
        limit as i64,
        offset,
    )
    .await?;

    Ok(Json(ApiResponse::paginated(
        vehicles,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/v1/vehicles/:id`
pub async fn get_vehicle(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = Vehicle::find_by_id(&state.db, id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "VIEW_VEHICLE".to_string(),
            resource_type: "vehicle".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(vehicle)))
}

/// `PATCH /api/v1/vehicles/:id`
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVehicle>,
) -> ApiResult<Json<ApiResponse<Vehicle>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let vehicle = Vehicle::update(&state.db, id, actor.company_id, body)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_VEHICLE".to_string(),
            resource_type: "vehicle".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(vehicle)))
}

/// `DELETE /api/v1/vehicles/:id`
///
/// Soft delete: the vehicle flips to `inactive` and stays for inspection
/// history.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let deleted = Vehicle::soft_delete(&state.db, id, actor.company_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "DELETE_VEHICLE".to_string(),
            resource_type: "vehicle".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::message("Vehicle deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vehicle_request_validation() {
        let body = CreateVehicleRequest {
            name: String::new(),
            license_plate: "ABC-1".to_string(),
            vehicle_type: None,
            make: None,
            model: None,
            year: Some(1200),
        };

        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("year"));
    }
}
