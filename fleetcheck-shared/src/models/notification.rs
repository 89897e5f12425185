/// In-app notification model
///
/// Notifications are addressed to a single user; reads are scoped by
/// `user_id`, not by company. The `company_id` column exists for tenancy
/// bookkeeping and cascade deletes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// In-app notification
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID (UUID v4)
    pub id: Uuid,

    /// Addressed user
    pub user_id: Uuid,

    /// Tenant of the addressed user
    pub company_id: Uuid,

    /// Notification kind (e.g. "issue_reported")
    pub kind: String,

    /// Short title
    pub title: String,

    /// Message body
    pub body: String,

    /// Whether the user has read it
    pub is_read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Addressed user
    pub user_id: Uuid,

    /// Tenant of the addressed user
    pub company_id: Uuid,

    /// Notification kind
    pub kind: String,

    /// Short title
    pub title: String,

    /// Message body
    pub body: String,
}

impl Notification {
    /// Creates a notification
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, company_id, kind, title, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, company_id, kind, title, body, is_read, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.company_id)
        .bind(data.kind)
        .bind(data.title)
        .bind(data.body)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Lists a user's notifications with pagination, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, company_id, kind, title, body, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok((notifications, total))
    }

    /// Counts a user's unread notifications
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Marks one notification as read
    ///
    /// Scoped by `user_id` so users cannot mark each other's notifications.
    pub async fn mark_read(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks all of a user's notifications as read
    ///
    /// Returns the number of rows flipped.
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_notification_struct() {
        let data = CreateNotification {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            kind: "issue_reported".to_string(),
            title: "New issue".to_string(),
            body: "A critical issue was reported on Truck 7".to_string(),
        };

        assert_eq!(data.kind, "issue_reported");
    }

    // Database operations are covered by the API integration tests
}
