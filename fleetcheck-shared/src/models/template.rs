/// Checklist template and item models
///
/// A template is a tenant-scoped, ordered list of checklist items that
/// inspections answer against. Items belong to their template and inherit
/// its tenancy; all item access first resolves the template within the
/// acting user's company.
///
/// Template deletion is soft (`is_active = false`) so completed inspections
/// keep their item references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Input type of a checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemInputType {
    /// Boolean pass/fail answer
    YesNo,

    /// Free-form text answer
    Text,

    /// Numeric answer (e.g. tire pressure)
    Number,

    /// Photo URL answer
    Photo,
}

impl ItemInputType {
    /// Gets the input type as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemInputType::YesNo => "yes_no",
            ItemInputType::Text => "text",
            ItemInputType::Number => "number",
            ItemInputType::Photo => "photo",
        }
    }

    /// Parses an input type from its database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes_no" => Some(ItemInputType::YesNo),
            "text" => Some(ItemInputType::Text),
            "number" => Some(ItemInputType::Number),
            "photo" => Some(ItemInputType::Photo),
            _ => None,
        }
    }
}

/// Checklist template model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistTemplate {
    /// Unique template ID (UUID v4)
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Template name (e.g. "Daily pre-trip")
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the template
    pub created_by: Uuid,

    /// Soft-delete flag
    pub is_active: bool,

    /// When the template was created
    pub created_at: DateTime<Utc>,

    /// When the template was last updated
    pub updated_at: DateTime<Utc>,
}

/// Checklist item model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistItem {
    /// Unique item ID (UUID v4)
    pub id: Uuid,

    /// Template the item belongs to
    pub template_id: Uuid,

    /// Prompt shown to the inspector
    pub label: String,

    /// Input type string; use `get_input_type()` for the typed variant
    pub input_type: String,

    /// Whether an answer is required to complete an inspection
    pub is_required: bool,

    /// Position within the template
    pub sort_order: i32,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    /// Owning company (stamped from the acting user)
    pub company_id: Uuid,

    /// Template name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Creating user
    pub created_by: Uuid,
}

/// Input for updating an existing template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Reactivate or deactivate
    pub is_active: Option<bool>,
}

/// Input for creating a checklist item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    /// Prompt shown to the inspector
    pub label: String,

    /// Input type
    pub input_type: ItemInputType,

    /// Whether an answer is required
    pub is_required: bool,

    /// Position within the template
    pub sort_order: i32,
}

/// Input for updating a checklist item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// New label
    pub label: Option<String>,

    /// New input type
    pub input_type: Option<ItemInputType>,

    /// New required flag
    pub is_required: Option<bool>,

    /// New position
    pub sort_order: Option<i32>,
}

impl ChecklistTemplate {
    /// Creates a new template
    pub async fn create(pool: &PgPool, data: CreateTemplate) -> Result<Self, sqlx::Error> {
        let template = sqlx::query_as::<_, ChecklistTemplate>(
            r#"
            INSERT INTO checklist_templates (company_id, name, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, name, description, created_by, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(data.company_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(template)
    }

    /// Finds a template by ID within a company
    ///
    /// Returns None both for missing rows and rows owned by another tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let template = sqlx::query_as::<_, ChecklistTemplate>(
            r#"
            SELECT id, company_id, name, description, created_by, is_active,
                   created_at, updated_at
            FROM checklist_templates
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(template)
    }

    /// Updates an existing template within a company
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        data: UpdateTemplate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE checklist_templates SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND company_id = $2 \
             RETURNING id, company_id, name, description, created_by, is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, ChecklistTemplate>(&query)
            .bind(id)
            .bind(company_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let template = q.fetch_optional(pool).await?;

        Ok(template)
    }

    /// Soft-deletes a template
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE checklist_templates
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists templates in a company with pagination
    ///
    /// When `active_only` is set, soft-deleted templates are filtered out.
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let active_clause = if active_only {
            " AND is_active = TRUE"
        } else {
            ""
        };

        let list_query = format!(
            "SELECT id, company_id, name, description, created_by, is_active, \
                    created_at, updated_at \
             FROM checklist_templates \
             WHERE company_id = $1{active_clause} \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let count_query = format!(
            "SELECT COUNT(*) FROM checklist_templates WHERE company_id = $1{active_clause}"
        );

        let templates = sqlx::query_as::<_, ChecklistTemplate>(&list_query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(company_id)
            .fetch_one(pool)
            .await?;

        Ok((templates, total))
    }
}

impl ChecklistItem {
    /// Typed input type accessor
    pub fn get_input_type(&self) -> Option<ItemInputType> {
        ItemInputType::parse(&self.input_type)
    }

    /// Adds an item to a template
    ///
    /// Tenancy is enforced by the caller resolving the template first.
    pub async fn create(
        pool: &PgPool,
        template_id: Uuid,
        data: CreateItem,
    ) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            INSERT INTO checklist_items (template_id, label, input_type, is_required, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, template_id, label, input_type, is_required, sort_order, created_at
            "#,
        )
        .bind(template_id)
        .bind(data.label)
        .bind(data.input_type.as_str())
        .bind(data.is_required)
        .bind(data.sort_order)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// Finds an item by ID within a template
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        template_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, template_id, label, input_type, is_required, sort_order, created_at
            FROM checklist_items
            WHERE id = $1 AND template_id = $2
            "#,
        )
        .bind(id)
        .bind(template_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Updates an item within a template
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        template_id: Uuid,
        data: UpdateItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE checklist_items SET id = id");
        let mut bind_count = 2;

        if data.label.is_some() {
            bind_count += 1;
            query.push_str(&format!(", label = ${}", bind_count));
        }
        if data.input_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", input_type = ${}", bind_count));
        }
        if data.is_required.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_required = ${}", bind_count));
        }
        if data.sort_order.is_some() {
            bind_count += 1;
            query.push_str(&format!(", sort_order = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND template_id = $2 \
             RETURNING id, template_id, label, input_type, is_required, sort_order, created_at",
        );

        let mut q = sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(id)
            .bind(template_id);

        if let Some(label) = data.label {
            q = q.bind(label);
        }
        if let Some(input_type) = data.input_type {
            q = q.bind(input_type.as_str());
        }
        if let Some(is_required) = data.is_required {
            q = q.bind(is_required);
        }
        if let Some(sort_order) = data.sort_order {
            q = q.bind(sort_order);
        }

        let item = q.fetch_optional(pool).await?;

        Ok(item)
    }

    /// Deletes an item from a template
    pub async fn delete(pool: &PgPool, id: Uuid, template_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklist_items WHERE id = $1 AND template_id = $2")
            .bind(id)
            .bind(template_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists items of a template ordered by their sort position
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, template_id, label, input_type, is_required, sort_order, created_at
            FROM checklist_items
            WHERE template_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(template_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Reorders the items of a template
    ///
    /// `item_ids` is the complete desired order; each item gets its index as
    /// the new `sort_order`. IDs not belonging to the template are ignored.
    pub async fn reorder(
        pool: &PgPool,
        template_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (position, item_id) in item_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE checklist_items SET sort_order = $1 WHERE id = $2 AND template_id = $3",
            )
            .bind(position as i32)
            .bind(item_id)
            .bind(template_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_type_roundtrip() {
        for input_type in [
            ItemInputType::YesNo,
            ItemInputType::Text,
            ItemInputType::Number,
            ItemInputType::Photo,
        ] {
            assert_eq!(ItemInputType::parse(input_type.as_str()), Some(input_type));
        }
    }

    #[test]
    fn test_input_type_parse_unknown() {
        assert_eq!(ItemInputType::parse("checkbox"), None);
        assert_eq!(ItemInputType::parse(""), None);
    }

    #[test]
    fn test_update_item_default() {
        let update = UpdateItem::default();
        assert!(update.label.is_none());
        assert!(update.input_type.is_none());
        assert!(update.is_required.is_none());
        assert!(update.sort_order.is_none());
    }

    // Database operations are covered by the API integration tests
}
