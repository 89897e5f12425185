/// Append-only audit log recorder
///
/// Every state-changing or sensitive-read operation appends a row here.
/// Recording is best-effort: the primary operation has already committed
/// when the audit insert runs, and an audit failure is logged and swallowed
/// rather than surfaced to the client. There is no retry and no two-phase
/// guarantee; a crash between the mutation and the insert loses the entry.
///
/// Rows are never updated or deleted.
///
/// # Example
///
/// ```no_run
/// use fleetcheck_shared::audit::{self, NewAuditLog};
/// use serde_json::json;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # fn example(pool: PgPool, user_id: Uuid, company_id: Uuid, vehicle_id: Uuid) {
/// audit::record_detached(
///     pool,
///     NewAuditLog {
///         company_id,
///         user_id,
///         action: "CREATE_VEHICLE".to_string(),
///         resource_type: "vehicle".to_string(),
///         resource_id: Some(vehicle_id),
///         details: json!({ "license_plate": "ABC-1" }),
///     },
/// );
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Audit log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    /// Unique entry ID (UUID v4)
    pub id: Uuid,

    /// Tenant the action happened in
    pub company_id: Uuid,

    /// Acting user
    pub user_id: Uuid,

    /// Action verb (e.g. "CREATE_VEHICLE", "RESOLVE_ISSUE", "VIEW_INSPECTION")
    pub action: String,

    /// Resource type the action touched
    pub resource_type: String,

    /// Resource ID, when one exists
    pub resource_id: Option<Uuid>,

    /// Free-form context (JSONB)
    pub details: Value,

    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for recording an audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditLog {
    /// Tenant the action happened in
    pub company_id: Uuid,

    /// Acting user
    pub user_id: Uuid,

    /// Action verb
    pub action: String,

    /// Resource type
    pub resource_type: String,

    /// Resource ID, when one exists
    pub resource_id: Option<Uuid>,

    /// Free-form context
    pub details: Value,
}

/// Inserts an audit entry synchronously
///
/// Used directly by tests and by [`record_detached`]. Handlers normally go
/// through the detached variant so audit latency never sits on the request
/// path.
pub async fn record(pool: &PgPool, entry: NewAuditLog) -> Result<AuditLog, sqlx::Error> {
    let row = sqlx::query_as::<_, AuditLog>(
        r#"
        INSERT INTO audit_logs (company_id, user_id, action, resource_type, resource_id, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, company_id, user_id, action, resource_type, resource_id, details, created_at
        "#,
    )
    .bind(entry.company_id)
    .bind(entry.user_id)
    .bind(entry.action)
    .bind(entry.resource_type)
    .bind(entry.resource_id)
    .bind(entry.details)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Inserts an audit entry on a background task
///
/// Called after the primary mutation has succeeded, never before. Failures
/// are logged and swallowed.
pub fn record_detached(pool: PgPool, entry: NewAuditLog) {
    tokio::spawn(async move {
        let action = entry.action.clone();
        if let Err(e) = record(&pool, entry).await {
            warn!(error = %e, action = %action, "Failed to record audit log entry");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_audit_log_serializes() {
        let entry = NewAuditLog {
            company_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            action: "CREATE_VEHICLE".to_string(),
            resource_type: "vehicle".to_string(),
            resource_id: Some(Uuid::new_v4()),
            details: json!({ "license_plate": "ABC-1" }),
        };

        let serialized = serde_json::to_string(&entry).unwrap();
        assert!(serialized.contains("CREATE_VEHICLE"));
        assert!(serialized.contains("ABC-1"));
    }

    // Insert behavior is covered by the API integration tests
}
