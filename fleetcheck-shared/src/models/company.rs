/// Company (tenant) model and database operations
///
/// Companies are the tenancy root. One is created by the one-time bootstrap
/// flow together with its first admin; there is no self-service signup for
/// additional tenants.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     address TEXT,
///     phone VARCHAR(50),
///     email VARCHAR(255),
///     website VARCHAR(255),
///     industry VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Company model representing a tenant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID (UUID v4)
    pub id: Uuid,

    /// Company display name
    pub name: String,

    /// Optional postal address
    pub address: Option<String>,

    /// Optional contact phone number
    pub phone: Option<String>,

    /// Optional contact email
    pub email: Option<String>,

    /// Optional website URL
    pub website: Option<String>,

    /// Optional industry descriptor
    pub industry: Option<String>,

    /// When the company was created
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Company display name
    pub name: String,

    /// Optional postal address
    pub address: Option<String>,

    /// Optional contact phone number
    pub phone: Option<String>,

    /// Optional contact email
    pub email: Option<String>,
}

/// Input for updating an existing company
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New display name
    pub name: Option<String>,

    /// New address
    pub address: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New contact email
    pub email: Option<String>,

    /// New website URL
    pub website: Option<String>,

    /// New industry descriptor
    pub industry: Option<String>,
}

impl Company {
    /// Creates a new company
    ///
    /// Only the bootstrap flow calls this; tenants are never created through
    /// the authenticated API surface.
    pub async fn create(pool: &PgPool, data: CreateCompany) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, address, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, phone, email, website, industry,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.address)
        .bind(data.phone)
        .bind(data.email)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    ///
    /// Unlike other models this takes no separate `company_id` argument: the
    /// company IS the tenant, and handlers compare `id` against the acting
    /// user's `company_id` before calling.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, address, phone, email, website, industry,
                   created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Updates an existing company
    ///
    /// Only non-None fields in `data` are updated. `updated_at` is bumped
    /// automatically.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE companies SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.website.is_some() {
            bind_count += 1;
            query.push_str(&format!(", website = ${}", bind_count));
        }
        if data.industry.is_some() {
            bind_count += 1;
            query.push_str(&format!(", industry = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, address, phone, email, website, industry, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Company>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(website) = data.website {
            q = q.bind(website);
        }
        if let Some(industry) = data.industry {
            q = q.bind(industry);
        }

        let company = q.fetch_optional(pool).await?;

        Ok(company)
    }

    /// Counts all companies
    ///
    /// Used by the bootstrap endpoint to decide whether it may run.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_company_default() {
        let update = UpdateCompany::default();
        assert!(update.name.is_none());
        assert!(update.address.is_none());
        assert!(update.phone.is_none());
        assert!(update.email.is_none());
        assert!(update.website.is_none());
        assert!(update.industry.is_none());
    }

    // Database operations are covered by the API integration tests
}
