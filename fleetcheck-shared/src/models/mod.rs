/// Database models for FleetCheck
///
/// This module contains all database models and their CRUD operations.
///
/// Every tenant-owned model takes the acting user's `company_id` in its
/// per-row lookups. A row belonging to another tenant is indistinguishable
/// from a missing row: both return `None`.
///
/// # Models
///
/// - `company`: Tenant records
/// - `user`: User accounts with roles
/// - `vehicle`: Fleet vehicles
/// - `template`: Checklist templates and their items
/// - `inspection`: Inspections and submitted answers
/// - `issue`: Reported vehicle issues
/// - `notification`: In-app notifications
///
/// # Example
///
/// ```no_run
/// use fleetcheck_shared::models::vehicle::Vehicle;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, id: Uuid, company_id: Uuid) -> Result<(), sqlx::Error> {
/// // None for missing rows AND rows owned by another tenant
/// let vehicle = Vehicle::find_by_id(&pool, id, company_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod company;
pub mod inspection;
pub mod issue;
pub mod notification;
pub mod template;
pub mod user;
pub mod vehicle;
