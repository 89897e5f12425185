/// Inspection model and database operations
///
/// An inspection ties a vehicle, a checklist template, and an inspector
/// together and walks a one-way state machine:
///
/// ```text
/// pending -> in_progress -> completed
/// ```
///
/// `completed` is terminal. Once there, the inspection rejects further
/// updates and answer submissions; that enforcement lives in the handlers,
/// the model only reports the status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Inspection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    /// Created, no answers yet
    Pending,

    /// Inspector is working through the checklist
    InProgress,

    /// Finished; terminal state
    Completed,
}

impl InspectionStatus {
    /// Gets the status as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Pending => "pending",
            InspectionStatus::InProgress => "in_progress",
            InspectionStatus::Completed => "completed",
        }
    }

    /// Parses a status from its database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InspectionStatus::Pending),
            "in_progress" => Some(InspectionStatus::InProgress),
            "completed" => Some(InspectionStatus::Completed),
            _ => None,
        }
    }

    /// Position in the state machine, used for transition checks
    fn rank(&self) -> u8 {
        match self {
            InspectionStatus::Pending => 0,
            InspectionStatus::InProgress => 1,
            InspectionStatus::Completed => 2,
        }
    }

    /// Whether the state machine allows moving to `next`
    ///
    /// Transitions only go forward; `completed` allows nothing.
    pub fn can_transition_to(&self, next: InspectionStatus) -> bool {
        *self != InspectionStatus::Completed && next.rank() > self.rank()
    }
}

/// Inspection model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inspection {
    /// Unique inspection ID (UUID v4)
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Vehicle being inspected
    pub vehicle_id: Uuid,

    /// Checklist template answered against
    pub template_id: Uuid,

    /// User performing the inspection
    pub inspector_id: Uuid,

    /// Status string; use `get_status()` for the typed variant
    pub status: String,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// Set when the inspection reaches `completed`
    pub completed_at: Option<DateTime<Utc>>,

    /// When the inspection was created
    pub created_at: DateTime<Utc>,

    /// When the inspection was last updated
    pub updated_at: DateTime<Utc>,
}

const INSPECTION_COLUMNS: &str = "id, company_id, vehicle_id, template_id, inspector_id, status, \
     notes, completed_at, created_at, updated_at";

/// Inspection row joined with vehicle, template, and inspector names
///
/// Used by listings and the CSV export so clients don't need follow-up
/// lookups for display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InspectionListRow {
    /// Inspection ID
    pub id: Uuid,

    /// Vehicle ID
    pub vehicle_id: Uuid,

    /// Vehicle display name
    pub vehicle_name: String,

    /// Vehicle license plate
    pub license_plate: String,

    /// Template ID
    pub template_id: Uuid,

    /// Template name
    pub template_name: String,

    /// Inspector ID
    pub inspector_id: Uuid,

    /// Inspector display name
    pub inspector_name: String,

    /// Status string
    pub status: String,

    /// Optional notes
    pub notes: Option<String>,

    /// Completion timestamp
    pub completed_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

const LIST_ROW_SELECT: &str = "SELECT i.id, i.vehicle_id, v.name AS vehicle_name, \
     v.license_plate, i.template_id, t.name AS template_name, \
     i.inspector_id, u.full_name AS inspector_name, i.status, i.notes, \
     i.completed_at, i.created_at \
     FROM inspections i \
     JOIN vehicles v ON v.id = i.vehicle_id \
     JOIN checklist_templates t ON t.id = i.template_id \
     JOIN users u ON u.id = i.inspector_id";

/// Input for creating a new inspection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInspection {
    /// Owning company (stamped from the acting user)
    pub company_id: Uuid,

    /// Vehicle being inspected
    pub vehicle_id: Uuid,

    /// Checklist template
    pub template_id: Uuid,

    /// Inspector (the acting user)
    pub inspector_id: Uuid,

    /// Optional notes
    pub notes: Option<String>,
}

/// Input for updating an inspection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInspection {
    /// New status (must be a forward transition)
    pub status: Option<InspectionStatus>,

    /// New notes
    pub notes: Option<String>,
}

/// Filters for listing inspections
#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    /// Restrict to one vehicle
    pub vehicle_id: Option<Uuid>,

    /// Restrict to one inspector
    pub inspector_id: Option<Uuid>,

    /// Restrict to one status
    pub status: Option<InspectionStatus>,

    /// Created at or after this time
    pub from: Option<DateTime<Utc>>,

    /// Created before this time
    pub to: Option<DateTime<Utc>>,
}

/// Status counts for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InspectionStats {
    /// Total inspections in range
    pub total: i64,

    /// Count in `pending`
    pub pending: i64,

    /// Count in `in_progress`
    pub in_progress: i64,

    /// Count in `completed`
    pub completed: i64,
}

/// A submitted answer to a checklist item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InspectionAnswer {
    /// Unique answer ID (UUID v4)
    pub id: Uuid,

    /// Inspection the answer belongs to
    pub inspection_id: Uuid,

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

    /// When the answer was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for submitting one answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnswer {
    /// Checklist item being answered
    pub item_id: Uuid,

    /// Boolean answer
    pub value_bool: Option<bool>,

    /// Text answer
    pub value_text: Option<String>,

    /// Numeric answer
    pub value_number: Option<f64>,

    /// Photo URL answer
    pub value_photo_url: Option<String>,

    /// Optional per-answer notes
    pub notes: Option<String>,
}

impl Inspection {
    /// Typed status accessor
    pub fn get_status(&self) -> Option<InspectionStatus> {
        InspectionStatus::parse(&self.status)
    }

    /// Creates a new inspection in the `pending` state
    pub async fn create(pool: &PgPool, data: CreateInspection) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO inspections (company_id, vehicle_id, template_id, inspector_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INSPECTION_COLUMNS}
            "#
        );

        let inspection = sqlx::query_as::<_, Inspection>(&query)
            .bind(data.company_id)
            .bind(data.vehicle_id)
            .bind(data.template_id)
            .bind(data.inspector_id)
            .bind(data.notes)
            .fetch_one(pool)
            .await?;

        Ok(inspection)
    }

    /// Finds an inspection by ID within a company
    ///
    /// Returns None both for missing rows and rows owned by another tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {INSPECTION_COLUMNS} FROM inspections WHERE id = $1 AND company_id = $2"
        );

        let inspection = sqlx::query_as::<_, Inspection>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await?;

        Ok(inspection)
    }

    /// Updates an inspection within a company
    ///
    /// When the status moves to `completed`, `completed_at` is stamped in
    /// the same statement. State machine legality is the caller's check.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        data: UpdateInspection,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE inspections SET updated_at = NOW()");
        let mut bind_count = 2;

        if let Some(status) = data.status {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
            if status == InspectionStatus::Completed {
                query.push_str(", completed_at = NOW()");
            }
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND company_id = $2 RETURNING {INSPECTION_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Inspection>(&query)
            .bind(id)
            .bind(company_id);

        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }

        let inspection = q.fetch_optional(pool).await?;

        Ok(inspection)
    }

    /// Lists inspections in a company with filtering and pagination
    ///
    /// Rows come back joined with vehicle, template, and inspector names,
    /// newest first.
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        filter: &InspectionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<InspectionListRow>, i64), sqlx::Error> {
        let (conditions, bind_count) = filter_conditions(filter);

        let list_query = format!(
            "{LIST_ROW_SELECT} WHERE {conditions} \
             ORDER BY i.created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        );
        let count_query = format!("SELECT COUNT(*) FROM inspections i WHERE {conditions}");

        let q = bind_filter(
            sqlx::query_as::<_, InspectionListRow>(&list_query).bind(company_id),
            filter,
        );
        let c = bind_filter(
            sqlx::query_as::<_, (i64,)>(&count_query).bind(company_id),
            filter,
        );

        let rows = q.bind(limit).bind(offset).fetch_all(pool).await?;
        let (total,) = c.fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Returns all inspections matching the filters, without pagination
    ///
    /// Backs the CSV export.
    pub async fn export(
        pool: &PgPool,
        company_id: Uuid,
        filter: &InspectionFilter,
    ) -> Result<Vec<InspectionListRow>, sqlx::Error> {
        let (conditions, _) = filter_conditions(filter);

        let query = format!("{LIST_ROW_SELECT} WHERE {conditions} ORDER BY i.created_at DESC");

        let q = bind_filter(
            sqlx::query_as::<_, InspectionListRow>(&query).bind(company_id),
            filter,
        );

        q.fetch_all(pool).await
    }

    /// Counts inspections by status within an optional date range
    pub async fn stats(
        pool: &PgPool,
        company_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<InspectionStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, InspectionStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed
            FROM inspections
            WHERE company_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            "#,
        )
        .bind(company_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}

/// Builds the WHERE clause for inspection filters; $1 is always company_id
fn filter_conditions(filter: &InspectionFilter) -> (String, usize) {
    let mut conditions = String::from("i.company_id = $1");
    let mut bind_count = 1;

    if filter.vehicle_id.is_some() {
        bind_count += 1;
        conditions.push_str(&format!(" AND i.vehicle_id = ${}", bind_count));
    }
    if filter.inspector_id.is_some() {
        bind_count += 1;
        conditions.push_str(&format!(" AND i.inspector_id = ${}", bind_count));
    }
    if filter.status.is_some() {
        bind_count += 1;
        conditions.push_str(&format!(" AND i.status = ${}", bind_count));
    }
    if filter.from.is_some() {
        bind_count += 1;
        conditions.push_str(&format!(" AND i.created_at >= ${}", bind_count));
    }
    if filter.to.is_some() {
        bind_count += 1;
        conditions.push_str(&format!(" AND i.created_at < ${}", bind_count));
    }

    (conditions, bind_count)
}

/// Binds filter values in the same order `filter_conditions` emitted them
fn bind_filter<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    filter: &InspectionFilter,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    if let Some(vehicle_id) = filter.vehicle_id {
        q = q.bind(vehicle_id);
    }
    if let Some(inspector_id) = filter.inspector_id {
        q = q.bind(inspector_id);
    }
    if let Some(status) = filter.status {
        q = q.bind(status.as_str());
    }
    if let Some(from) = filter.from {
        q = q.bind(from);
    }
    if let Some(to) = filter.to {
        q = q.bind(to);
    }
    q
}

impl InspectionAnswer {
    /// Inserts a batch of answers for an inspection
    ///
    /// All answers land in one transaction so a mid-batch failure leaves
    /// nothing behind. Tenancy and state checks happen in the handler
    /// before this is called.
    pub async fn insert_many(
        pool: &PgPool,
        inspection_id: Uuid,
        answers: Vec<CreateAnswer>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = Vec::with_capacity(answers.len());

        for answer in answers {
            let row = sqlx::query_as::<_, InspectionAnswer>(
                r#"
                INSERT INTO inspection_answers
                    (inspection_id, item_id, value_bool, value_text, value_number,
                     value_photo_url, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, inspection_id, item_id, value_bool, value_text, value_number,
                          value_photo_url, notes, created_at
                "#,
            )
            .bind(inspection_id)
            .bind(answer.item_id)
            .bind(answer.value_bool)
            .bind(answer.value_text)
            .bind(answer.value_number)
            .bind(answer.value_photo_url)
            .bind(answer.notes)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Lists the answers of an inspection
    pub async fn list_for_inspection(
        pool: &PgPool,
        inspection_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let answers = sqlx::query_as::<_, InspectionAnswer>(
            r#"
            SELECT id, inspection_id, item_id, value_bool, value_text, value_number,
                   value_photo_url, notes, created_at
            FROM inspection_answers
            WHERE inspection_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(inspection_id)
        .fetch_all(pool)
        .await?;

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            InspectionStatus::Pending,
            InspectionStatus::InProgress,
            InspectionStatus::Completed,
        ] {
            assert_eq!(InspectionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(InspectionStatus::parse("done"), None);
        assert_eq!(InspectionStatus::parse(""), None);
    }

    #[test]
    fn test_transitions_forward_only() {
        use InspectionStatus::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));

        // No backward moves
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Pending));

        // No self transitions
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_filter_conditions_bind_order() {
        let filter = InspectionFilter {
            vehicle_id: Some(Uuid::new_v4()),
            status: Some(InspectionStatus::Completed),
            ..Default::default()
        };

        let (conditions, bind_count) = filter_conditions(&filter);
        assert_eq!(bind_count, 3);
        assert!(conditions.contains("i.vehicle_id = $2"));
        assert!(conditions.contains("i.status = $3"));
    }

    #[test]
    fn test_filter_conditions_empty() {
        let (conditions, bind_count) = filter_conditions(&InspectionFilter::default());
        assert_eq!(conditions, "i.company_id = $1");
        assert_eq!(bind_count, 1);
    }

    // Database operations are covered by the API integration tests
}
