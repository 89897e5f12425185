/// User model and database operations
///
/// Users belong to exactly one company and carry a role that narrows what
/// they may do. Deactivation (`is_active = false`) is the soft-delete flag;
/// deactivated users fail authentication exactly like unknown users.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     full_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(20) NOT NULL DEFAULT 'driver',
///     phone VARCHAR(50),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     reset_token VARCHAR(128),
///     reset_token_expiry TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User role within a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full control over the tenant
    Admin,

    /// Can manage users and resolve issues
    Supervisor,

    /// Performs inspections
    Driver,

    /// Performs inspections and repairs
    Mechanic,
}

impl UserRole {
    /// Gets the role as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Supervisor => "supervisor",
            UserRole::Driver => "driver",
            UserRole::Mechanic => "mechanic",
        }
    }

    /// Parses a role from its database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "supervisor" => Some(UserRole::Supervisor),
            "driver" => Some(UserRole::Driver),
            "mechanic" => Some(UserRole::Mechanic),
            _ => None,
        }
    }
}

/// User model representing an account within a company
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Company the user belongs to
    pub company_id: Uuid,

    /// Display name
    pub full_name: String,

    /// Email address (globally unique, stored lowercase)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role string; use `get_role()` for the typed variant
    pub role: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Soft-delete flag; inactive users cannot authenticate
    pub is_active: bool,

    /// Outstanding password reset token, if any
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,

    /// When the reset token expires
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, company_id, full_name, email, password_hash, role, phone, \
     is_active, reset_token, reset_token_expiry, created_at, updated_at";

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Company the user belongs to
    pub company_id: Uuid,

    /// Display name
    pub full_name: String,

    /// Email address (lowercased before insert)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Role for the new account
    pub role: UserRole,

    /// Optional phone number
    pub phone: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub full_name: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New role
    pub role: Option<UserRole>,

    /// Activate or deactivate the account
    pub is_active: Option<bool>,
}

impl User {
    /// Typed role accessor
    ///
    /// Returns None for an unrecognized role string in the database.
    pub fn get_role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    /// Creates a new user
    ///
    /// The email is lowercased so lookups stay case-insensitive.
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the email is already taken
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (company_id, full_name, email, password_hash, role, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.company_id)
            .bind(data.full_name)
            .bind(data.email.to_lowercase())
            .bind(data.password_hash)
            .bind(data.role.as_str())
            .bind(data.phone)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID without tenant scoping
    ///
    /// Only the access guard uses this (the token subject is the scope);
    /// everything else goes through `find_in_company`.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID within a company
    ///
    /// Returns None both for missing users and for users in another company.
    pub async fn find_in_company(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND company_id = $2");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user holding an unexpired reset token
    pub async fn find_by_reset_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_token = $1 AND reset_token_expiry > NOW()"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Updates an existing user within a company
    ///
    /// Only non-None fields in `data` are updated. The `updated_at` timestamp
    /// is bumped automatically.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND company_id = $2 RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id).bind(company_id);

        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(role) = data.role {
            q = q.bind(role.as_str());
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Replaces the user's password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a password reset token with its expiry
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expiry = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expiry)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears any outstanding reset token
    ///
    /// Called after a successful reset so tokens are single-use.
    pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = NULL, reset_token_expiry = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users in a company with pagination
    ///
    /// Returns the page and the total row count, ordered by creation date
    /// (newest first).
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE company_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );

        let users = sqlx::query_as::<_, User>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(pool)
            .await?;

        Ok((users, total))
    }

    /// Lists active managers (admins and supervisors) in a company
    ///
    /// Used when fanning out in-app notifications for new issues.
    pub async fn list_managers(pool: &PgPool, company_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE company_id = $1 AND role IN ('admin', 'supervisor') AND is_active = TRUE"
        );

        let users = sqlx::query_as::<_, User>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [
            UserRole::Admin,
            UserRole::Supervisor,
            UserRole::Driver,
            UserRole::Mechanic,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_unknown() {
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(UserRole::parse(""), None);
        assert_eq!(UserRole::parse("Admin"), None); // case-sensitive
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.full_name.is_none());
        assert!(update.phone.is_none());
        assert!(update.role.is_none());
        assert!(update.is_active.is_none());
    }

    // Database operations are covered by the API integration tests
}
