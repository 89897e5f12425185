/// Vehicle model and database operations
///
/// Vehicles are tenant-scoped fleet entries. License plates are unique per
/// company, not globally. Deletion is soft: the status flips to `inactive`
/// and the row stays for inspection history.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vehicles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     license_plate VARCHAR(50) NOT NULL,
///     vehicle_type VARCHAR(100),
///     make VARCHAR(100),
///     model VARCHAR(100),
///     year INTEGER,
///     status VARCHAR(20) NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT vehicles_company_license_plate_key UNIQUE (company_id, license_plate)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Vehicle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    /// In service
    Active,

    /// Soft-deleted
    Inactive,

    /// Temporarily out of service
    Maintenance,
}

impl VehicleStatus {
    /// Gets the status as its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Inactive => "inactive",
            VehicleStatus::Maintenance => "maintenance",
        }
    }

    /// Parses a status from its database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(VehicleStatus::Active),
            "inactive" => Some(VehicleStatus::Inactive),
            "maintenance" => Some(VehicleStatus::Maintenance),
            _ => None,
        }
    }
}

/// Vehicle model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    /// Unique vehicle ID (UUID v4)
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Display name (e.g. "Truck 7")
    pub name: String,

    /// License plate, unique within the company
    pub license_plate: String,

    /// Optional vehicle type (e.g. "truck", "van")
    pub vehicle_type: Option<String>,

    /// Optional manufacturer
    pub make: Option<String>,

    /// Optional model
    pub model: Option<String>,

    /// Optional model year
    pub year: Option<i32>,

    /// Status string; use `get_status()` for the typed variant
    pub status: String,

    /// When the vehicle was created
    pub created_at: DateTime<Utc>,

    /// When the vehicle was last updated
    pub updated_at: DateTime<Utc>,
}

const VEHICLE_COLUMNS: &str = "id, company_id, name, license_plate, vehicle_type, make, model, \
     year, status, created_at, updated_at";

/// Input for creating a new vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicle {
    /// Owning company (stamped from the acting user, never from the request)
    pub company_id: Uuid,

    /// Display name
    pub name: String,

    /// License plate
    pub license_plate: String,

    /// Optional vehicle type
    pub vehicle_type: Option<String>,

    /// Optional manufacturer
    pub make: Option<String>,

    /// Optional model
    pub model: Option<String>,

    /// Optional model year
    pub year: Option<i32>,
}

/// Input for updating an existing vehicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVehicle {
    /// New display name
    pub name: Option<String>,

    /// New license plate
    pub license_plate: Option<String>,

    /// New vehicle type
    pub vehicle_type: Option<String>,

    /// New manufacturer
    pub make: Option<String>,

    /// New model
    pub model: Option<String>,

    /// New model year
    pub year: Option<i32>,

    /// New status
    pub status: Option<VehicleStatus>,
}

/// Filters for listing vehicles
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    /// Restrict to a single status
    pub status: Option<VehicleStatus>,

    /// Restrict to a vehicle type
    pub vehicle_type: Option<String>,

    /// Substring match against name and license plate
    pub search: Option<String>,
}

/// Whitelisted sort columns for vehicle listings
///
/// Sorting is interpolated into SQL, so anything outside this list falls
/// back to `created_at`.
pub fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("name") => "name",
        Some("license_plate") => "license_plate",
        Some("status") => "status",
        Some("year") => "year",
        _ => "created_at",
    }
}

impl Vehicle {
    /// Typed status accessor
    pub fn get_status(&self) -> Option<VehicleStatus> {
        VehicleStatus::parse(&self.status)
    }

    /// Creates a new vehicle
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the license plate already exists
    /// within the company
    pub async fn create(pool: &PgPool, data: CreateVehicle) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO vehicles (company_id, name, license_plate, vehicle_type, make, model, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VEHICLE_COLUMNS}
            "#
        );

        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(data.company_id)
            .bind(data.name)
            .bind(data.license_plate)
            .bind(data.vehicle_type)
            .bind(data.make)
            .bind(data.model)
            .bind(data.year)
            .fetch_one(pool)
            .await?;

        Ok(vehicle)
    }

    /// Finds a vehicle by ID within a company
    ///
    /// Returns None both for missing rows and rows owned by another tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query =
            format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 AND company_id = $2");

        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await?;

        Ok(vehicle)
    }

    /// Updates an existing vehicle within a company
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
        data: UpdateVehicle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE vehicles SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.license_plate.is_some() {
            bind_count += 1;
            query.push_str(&format!(", license_plate = ${}", bind_count));
        }
        if data.vehicle_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", vehicle_type = ${}", bind_count));
        }
        if data.make.is_some() {
            bind_count += 1;
            query.push_str(&format!(", make = ${}", bind_count));
        }
        if data.model.is_some() {
            bind_count += 1;
            query.push_str(&format!(", model = ${}", bind_count));
        }
        if data.year.is_some() {
            bind_count += 1;
            query.push_str(&format!(", year = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND company_id = $2 RETURNING {VEHICLE_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(company_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(license_plate) = data.license_plate {
            q = q.bind(license_plate);
        }
        if let Some(vehicle_type) = data.vehicle_type {
            q = q.bind(vehicle_type);
        }
        if let Some(make) = data.make {
            q = q.bind(make);
        }
        if let Some(model) = data.model {
            q = q.bind(model);
        }
        if let Some(year) = data.year {
            q = q.bind(year);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }

        let vehicle = q.fetch_optional(pool).await?;

        Ok(vehicle)
    }

    /// Soft-deletes a vehicle by setting its status to inactive
    ///
    /// Returns false when the vehicle is missing or belongs to another
    /// tenant.
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET status = 'inactive', updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists vehicles in a company with filtering, sorting, and pagination
    ///
    /// Returns the page and the total count matching the filters. The sort
    /// column must come from [`sort_column`].
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        filter: &VehicleFilter,
        sort_by: &str,
        descending: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let mut conditions = String::from("company_id = $1");
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.vehicle_type.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND vehicle_type = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (name ILIKE ${n} OR license_plate ILIKE ${n})",
                n = bind_count
            ));
        }

        let direction = if descending { "DESC" } else { "ASC" };
        let list_query = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE {conditions} \
             ORDER BY {sort_by} {direction} LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        );
        let count_query = format!("SELECT COUNT(*) FROM vehicles WHERE {conditions}");

        let mut q = sqlx::query_as::<_, Vehicle>(&list_query).bind(company_id);
        let mut c = sqlx::query_as::<_, (i64,)>(&count_query).bind(company_id);

        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
            c = c.bind(status.as_str());
        }
        if let Some(ref vehicle_type) = filter.vehicle_type {
            q = q.bind(vehicle_type.clone());
            c = c.bind(vehicle_type.clone());
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search);
            q = q.bind(pattern.clone());
            c = c.bind(pattern);
        }

        let vehicles = q.bind(limit).bind(offset).fetch_all(pool).await?;
        let (total,) = c.fetch_one(pool).await?;

        Ok((vehicles, total))
    }
}
