/// Checklist template endpoints
///
/// - `POST /api/v1/templates`: create a template, optionally with items
/// - `GET /api/v1/templates`: list templates
/// - `GET /api/v1/templates/:id`: fetch a template with its items
/// - `PATCH /api/v1/templates/:id`: update
/// - `DELETE /api/v1/templates/:id`: soft delete
/// - `POST /api/v1/templates/:id/items`: add an item
/// - `PATCH /api/v1/templates/:id/items/:item_id`: update an item
/// - `DELETE /api/v1/templates/:id/items/:item_id`: remove an item
/// - `POST /api/v1/templates/:id/items/reorder`: reorder all items
///
/// All item operations resolve the template within the acting user's tenant
/// first, so cross-tenant item IDs dead-end at the same 404 as templates.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, Pagination};
use crate::routes::{validate_body, PageQuery};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use fleetcheck_shared::audit::{self, NewAuditLog};
use fleetcheck_shared::auth::guard::AuthUser;
use fleetcheck_shared::models::template::{
    ChecklistItem, ChecklistTemplate, CreateItem, CreateTemplate, ItemInputType, UpdateItem,
    UpdateTemplate,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Item payload nested inside a template creation request
#[derive(Debug, Deserialize, Validate)]
pub struct ItemRequest {
    /// Prompt shown to the inspector
    #[validate(length(min = 1, max = 500, message = "Label is required"))]
    pub label: String,

    /// Input type
    pub input_type: ItemInputType,

    /// Whether an answer is required (default true)
    pub is_required: Option<bool>,

    /// Position within the template (defaults to insertion order)
    pub sort_order: Option<i32>,
}

/// Request body for creating a template
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    /// Template name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Items to create with the template
    #[validate(nested)]
    pub items: Option<Vec<ItemRequest>>,
}

/// Query parameters for listing templates
#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    /// Filter out soft-deleted templates (default true)
    pub active_only: Option<bool>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub limit: Option<u32>,
}

/// Request body for reordering items
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Complete desired item order
    pub item_ids: Vec<Uuid>,
}

/// A template together with its ordered items
#[derive(Debug, Serialize)]
pub struct TemplateWithItems {
    /// The template
    #[serde(flatten)]
    pub template: ChecklistTemplate,

    /// Items in sort order
    pub items: Vec<ChecklistItem>,
}

async fn resolve_template(
    state: &AppState,
    actor: &AuthUser,
    template_id: Uuid,
) -> ApiResult<ChecklistTemplate> {
    ChecklistTemplate::find_by_id(&state.db, template_id, actor.company_id)
        .await?
        .ok_or(ApiError::NotFound)
}

/// `POST /api/v1/templates`
pub async fn create_template(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(body): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TemplateWithItems>>)> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }
    validate_body(&body)?;

    let template = ChecklistTemplate::create(
        &state.db,
        CreateTemplate {
            company_id: actor.company_id,
            name: body.name,
            description: body.description,
            created_by: actor.id,
        },
    )
    .await?;

    let mut items = Vec::new();
    if let Some(item_bodies) = body.items {
        for (position, item) in item_bodies.into_iter().enumerate() {
            let created = ChecklistItem::create(
                &state.db,
                template.id,
                CreateItem {
                    label: item.label,
                    input_type: item.input_type,
                    is_required: item.is_required.unwrap_or(true),
                    sort_order: item.sort_order.unwrap_or(position as i32),
                },
            )
            .await?;
            items.push(created);
        }
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_TEMPLATE".to_string(),
            resource_type: "checklist_template".to_string(),
            resource_id: Some(template.id),
            details: json!({ "name": template.name, "item_count": items.len() }),
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(TemplateWithItems { template, items })),
    ))
}

/// `GET /api/v1/templates`
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ListTemplatesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ChecklistTemplate>>>> {
    let page_query = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (page, limit, offset) = page_query.resolve();

    let (templates, total) = ChecklistTemplate::list(
        &state.db,
        actor.company_id,
        query.active_only.unwrap_or(true),
        limit as i64,
        offset,
    )
    .await?;

    Ok(Json(ApiResponse::paginated(
        templates,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/v1/templates/:id`
pub async fn get_template(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TemplateWithItems>>> {
    let template = resolve_template(&state, &actor, id).await?;
    let items = ChecklistItem::list_for_template(&state.db, template.id).await?;

    Ok(Json(ApiResponse::data(TemplateWithItems { template, items })))
}

/// `PATCH /api/v1/templates/:id`
pub async fn update_template(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTemplate>,
) -> ApiResult<Json<ApiResponse<ChecklistTemplate>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let template = ChecklistTemplate::update(&state.db, id, actor.company_id, body)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_TEMPLATE".to_string(),
            resource_type: "checklist_template".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::data(template)))
}

/// `DELETE /api/v1/templates/:id`
///
/// Soft delete; completed inspections keep their item references.
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let deleted = ChecklistTemplate::soft_delete(&state.db, id, actor.company_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "DELETE_TEMPLATE".to_string(),
            resource_type: "checklist_template".to_string(),
            resource_id: Some(id),
            details: json!({}),
        },
    );

    Ok(Json(ApiResponse::message("Template deleted")))
}

/// `POST /api/v1/templates/:id/items`
pub async fn add_item(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ItemRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ChecklistItem>>)> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }
    validate_body(&body)?;

    let template = resolve_template(&state, &actor, id).await?;

    let item = ChecklistItem::create(
        &state.db,
        template.id,
        CreateItem {
            label: body.label,
            input_type: body.input_type,
            is_required: body.is_required.unwrap_or(true),
            sort_order: body.sort_order.unwrap_or(0),
        },
    )
    .await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "CREATE_TEMPLATE_ITEM".to_string(),
            resource_type: "checklist_item".to_string(),
            resource_id: Some(item.id),
            details: json!({ "template_id": template.id }),
        },
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::data(item))))
}

/// `PATCH /api/v1/templates/:id/items/:item_id`
pub async fn update_item(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateItem>,
) -> ApiResult<Json<ApiResponse<ChecklistItem>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let template = resolve_template(&state, &actor, id).await?;

    let item = ChecklistItem::update(&state.db, item_id, template.id, body)
        .await?
        .ok_or(ApiError::NotFound)?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "UPDATE_TEMPLATE_ITEM".to_string(),
            resource_type: "checklist_item".to_string(),
            resource_id: Some(item_id),
            details: json!({ "template_id": template.id }),
        },
    );

    Ok(Json(ApiResponse::data(item)))
}

/// `DELETE /api/v1/templates/:id/items/:item_id`
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let template = resolve_template(&state, &actor, id).await?;

    let deleted = ChecklistItem::delete(&state.db, item_id, template.id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "DELETE_TEMPLATE_ITEM".to_string(),
            resource_type: "checklist_item".to_string(),
            resource_id: Some(item_id),
            details: json!({ "template_id": template.id }),
        },
    );

    Ok(Json(ApiResponse::message("Item deleted")))
}

/// `POST /api/v1/templates/:id/items/reorder`
///
/// The body carries the complete desired order; every item gets its list
/// index as the new sort position.
pub async fn reorder_items(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReorderRequest>,
) -> ApiResult<Json<ApiResponse<Vec<ChecklistItem>>>> {
    if !actor.is_manager() {
        return Err(ApiError::Forbidden);
    }

    let template = resolve_template(&state, &actor, id).await?;

    ChecklistItem::reorder(&state.db, template.id, &body.item_ids).await?;
    let items = ChecklistItem::list_for_template(&state.db, template.id).await?;

    audit::record_detached(
        state.db.clone(),
        NewAuditLog {
            company_id: actor.company_id,
            user_id: actor.id,
            action: "REORDER_TEMPLATE_ITEMS".to_string(),
            resource_type: "checklist_template".to_string(),
            resource_id: Some(template.id),
            details: json!({ "item_count": body.item_ids.len() }),
        },
    );

    Ok(Json(ApiResponse::data(items)))
}
