/// Issue model and database operations
///
/// Issues are problem reports filed against a vehicle. The `resolved` flag
/// is one-way: a resolved issue never reopens, and the resolving user and
/// timestamp are stamped alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Cosmetic or minor
    Low,

    /// Needs attention soon
    Medium,

    /// Vehicle should not be driven
    Critical,
}

impl IssueSeverity {
    /// Gets the severity as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::Critical => "critical",
        }
    }

    /// Parses a severity from its database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(IssueSeverity::Low),
            "medium" => Some(IssueSeverity::Medium),
            "critical" => Some(IssueSeverity::Critical),
            _ => None,
        }
    }
}

/// Issue model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    /// Unique issue ID (UUID v4)
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Vehicle the issue was reported against
    pub vehicle_id: Uuid,

    /// User who filed the report
    pub reported_by: Uuid,

    /// Severity string; use `get_severity()` for the typed variant
    pub severity: String,

    /// Problem description
    pub description: String,

    /// Photo URLs attached to the report (JSONB array)
    pub photo_urls: Json<Vec<String>>,

    /// One-way resolution flag
    pub resolved: bool,

    /// User who resolved the issue
    pub resolved_by: Option<Uuid>,

    /// When the issue was resolved
    pub resolved_at: Option<DateTime<Utc>>,

    /// Notes recorded at resolution time
    pub resolution_notes: Option<String>,

    /// When the issue was filed
    pub created_at: DateTime<Utc>,

    /// When the issue was last updated
    pub updated_at: DateTime<Utc>,
}

const ISSUE_COLUMNS: &str = "id, company_id, vehicle_id, reported_by, severity, description, \
     photo_urls, resolved, resolved_by, resolved_at, resolution_notes, created_at, updated_at";

/// Issue row joined with vehicle and reporter names for listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssueListRow {
    /// Issue ID
    pub id: Uuid,

    /// Vehicle ID
    pub vehicle_id: Uuid,

    /// Vehicle display name
    pub vehicle_name: String,

    /// Vehicle license plate
    pub license_plate: String,

    /// Reporter ID
    pub reported_by: Uuid,

    /// Reporter display name
    pub reporter_name: String,

    /// Severity string
    pub severity: String,

    /// Problem description
    pub description: String,

    /// Resolution flag
    pub resolved: bool,

    /// When the issue was filed
    pub created_at: DateTime<Utc>,
}

/// Input for filing a new issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssue {
    /// Owning company (stamped from the acting user)
    pub company_id: Uuid,

    /// Vehicle the issue concerns
    pub vehicle_id: Uuid,

    /// Reporting user (the acting user)
    pub reported_by: Uuid,

    /// Severity
    pub severity: IssueSeverity,

    /// Problem description
    pub description: String,

    /// Photo URLs attached to the report
    pub photo_urls: Vec<String>,
}

/// Input for updating an open issue
///
/// Resolution goes through [`Issue::resolve`], not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIssue {
    /// New severity
    pub severity: Option<IssueSeverity>,

    /// New description
    pub description: Option<String>,

    /// Replacement photo URL list
    pub photo_urls: Option<Vec<String>>,
}

/// Filters for listing issues
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Restrict to one vehicle
    pub vehicle_id: Option<Uuid>,

    /// Restrict by resolution state
    pub resolved: Option<bool>,

    /// Restrict to one severity
    pub severity: Option<IssueSeverity>,
}

/// Issue counts for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssueStats {
    /// Total issues in range
    pub total: i64,

    /// Unresolved issues
    pub open: i64,

    /// Resolved issues
    pub resolved: i64,

    /// Count with severity `low`
    pub low: i64,

    /// Count with severity `medium`
    pub medium: i64,

    /// Count with severity `critical`
    pub critical: i64,
}

impl Issue {
    /// Typed severity accessor
    pub fn get_severity(&self) -> Option<IssueSeverity> {
        IssueSeverity::parse(&self.severity)
    }

    /// Files a new issue
    pub async fn create(pool: &PgPool, data: CreateIssue) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO issues (company_id, vehicle_id, reported_by, severity, description, photo_urls)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ISSUE_COLUMNS}
            "#
        );

        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(data.company_id)
            .bind(data.vehicle_id)
            .bind(data.reported_by)
            .bind(data.severity.as_str())
            .bind(data.description)
            .bind(Json(data.photo_urls))
            .fetch_one(pool)
            .await?;

        Ok(issue)
    }

    /// Finds an issue by ID within a company
    ///
    /// Returns None both for missing rows and rows owned by another tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1 AND company_id = $2");

        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await?;

        Ok(issue)
    }

    /// Updates an open issue within a company
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        data: UpdateIssue,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE issues SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.severity.is_some() {
            bind_count += 1;
            query.push_str(&format!(", severity = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.photo_urls.is_some() {
            bind_count += 1;
            query.push_str(&format!(", photo_urls = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND company_id = $2 RETURNING {ISSUE_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Issue>(&query).bind(id).bind(company_id);

        if let Some(severity) = data.severity {
            q = q.bind(severity.as_str());
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(photo_urls) = data.photo_urls {
            q = q.bind(Json(photo_urls));
        }

        let issue = q.fetch_optional(pool).await?;

        Ok(issue)
    }

    /// Resolves an issue (one-way)
    ///
    /// The `AND resolved = FALSE` guard makes resolution idempotent at the
    /// row level: re-resolving returns None and the original resolver stays.
    pub async fn resolve(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        resolved_by: Uuid,
        resolution_notes: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE issues
            SET resolved = TRUE, resolved_by = $3, resolved_at = NOW(),
                resolution_notes = $4, updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND resolved = FALSE
            RETURNING {ISSUE_COLUMNS}
            "#
        );

        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(company_id)
            .bind(resolved_by)
            .bind(resolution_notes)
            .fetch_optional(pool)
            .await?;

        Ok(issue)
    }

    /// Lists issues in a company with filtering and pagination
    ///
    /// Rows come back joined with vehicle and reporter names, newest first.
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        filter: &IssueFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<IssueListRow>, i64), sqlx::Error> {
        let mut conditions = String::from("i.company_id = $1");
        let mut bind_count = 1;

        if filter.vehicle_id.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND i.vehicle_id = ${}", bind_count));
        }
        if filter.resolved.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND i.resolved = ${}", bind_count));
        }
        if filter.severity.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND i.severity = ${}", bind_count));
        }

        let list_query = format!(
            "SELECT i.id, i.vehicle_id, v.name AS vehicle_name, v.license_plate, \
                    i.reported_by, u.full_name AS reporter_name, i.severity, \
                    i.description, i.resolved, i.created_at \
             FROM issues i \
             JOIN vehicles v ON v.id = i.vehicle_id \
             JOIN users u ON u.id = i.reported_by \
             WHERE {conditions} \
             ORDER BY i.created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        );
        let count_query = format!("SELECT COUNT(*) FROM issues i WHERE {conditions}");

        let mut q = sqlx::query_as::<_, IssueListRow>(&list_query).bind(company_id);
        let mut c = sqlx::query_as::<_, (i64,)>(&count_query).bind(company_id);

        if let Some(vehicle_id) = filter.vehicle_id {
            q = q.bind(vehicle_id);
            c = c.bind(vehicle_id);
        }
        if let Some(resolved) = filter.resolved {
            q = q.bind(resolved);
            c = c.bind(resolved);
        }
        if let Some(severity) = filter.severity {
            q = q.bind(severity.as_str());
            c = c.bind(severity.as_str());
        }

        let rows = q.bind(limit).bind(offset).fetch_all(pool).await?;
        let (total,) = c.fetch_one(pool).await?;

        Ok((rows, total))
    }

    /// Counts issues by resolution state and severity within a date range
    pub async fn stats(
        pool: &PgPool,
        company_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<IssueStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, IssueStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE resolved = FALSE) AS open,
                COUNT(*) FILTER (WHERE resolved = TRUE) AS resolved,
                COUNT(*) FILTER (WHERE severity = 'low') AS low,
                COUNT(*) FILTER (WHERE severity = 'medium') AS medium,
                COUNT(*) FILTER (WHERE severity = 'critical') AS critical
            FROM issues
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_roundtrip() {
        for severity in [
            IssueSeverity::Low,
            IssueSeverity::Medium,
            IssueSeverity::Critical,
        ] {
            assert_eq!(IssueSeverity::parse(severity.as_str()), Some(severity));
        }
    }

    #[test]
    fn test_severity_parse_unknown() {
        assert_eq!(IssueSeverity::parse("urgent"), None);
        assert_eq!(IssueSeverity::parse(""), None);
    }

    #[test]
    fn test_update_issue_default() {
        let update = UpdateIssue::default();
        assert!(update.severity.is_none());
        assert!(update.description.is_none());
        assert!(update.photo_urls.is_none());
    }

    // Database operations are covered by the API integration tests
}
