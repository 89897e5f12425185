/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test company and user creation
/// - JWT token generation
/// - Request/response helpers
///
/// The tests expect `DATABASE_URL` and `JWT_SECRET` in the environment (a
/// `.env` file works) and are marked `#[ignore]` so `cargo test` stays green
/// without a database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleetcheck_api::app::{build_router, AppState};
use fleetcheck_api::config::Config;
use fleetcheck_shared::auth::jwt::{create_token, Claims, TokenType};
use fleetcheck_shared::auth::password::hash_password;
use fleetcheck_shared::db::migrations::run_migrations;
use fleetcheck_shared::models::company::{Company, CreateCompany};
use fleetcheck_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "Sup3rSecret!pass";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub company: Company,
    pub admin: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh company and admin user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let company = Company::create(
            &db,
            CreateCompany {
                name: format!("Test Fleet {}", Uuid::new_v4()),
                address: None,
                phone: None,
                email: None,
            },
        )
        .await?;

        let admin = create_user(&db, company.id, UserRole::Admin).await?;
        let token = token_for(&admin, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            company,
            admin,
            token,
        })
    }

    /// Returns the admin's authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Creates an extra user in the context's company and returns it with
    /// a valid access token
    pub async fn user_with_role(&self, role: UserRole) -> anyhow::Result<(User, String)> {
        let user = create_user(&self.db, self.company.id, role).await?;
        let token = token_for(&user, &self.config.jwt.secret)?;
        Ok((user, token))
    }

    /// Creates a second company with its own admin, for cross-tenant tests
    pub async fn other_company(&self) -> anyhow::Result<(Company, User, String)> {
        let company = Company::create(
            &self.db,
            CreateCompany {
                name: format!("Other Fleet {}", Uuid::new_v4()),
                address: None,
                phone: None,
                email: None,
            },
        )
        .await?;

        let admin = create_user(&self.db, company.id, UserRole::Admin).await?;
        let token = token_for(&admin, &self.config.jwt.secret)?;
        Ok((company, admin, token))
    }

    /// Cleans up test data (companies cascade to their rows)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        delete_company(&self.db, self.company.id).await
    }
}

/// Creates a user with a known password hash
pub async fn create_user(
    db: &PgPool,
    company_id: Uuid,
    role: UserRole,
) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            company_id,
            full_name: "Test User".to_string(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: hash_password(TEST_PASSWORD)?,
            role,
            phone: None,
        },
    )
    .await?;

    Ok(user)
}

/// Signs an access token for a user
pub fn token_for(user: &User, secret: &str) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, user.company_id, user.role.as_str(), TokenType::Access);
    Ok(create_token(&claims, secret)?)
}

/// Deletes a company and everything hanging off it
pub async fn delete_company(db: &PgPool, company_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Helper to wait for a condition with a timeout
pub async fn wait_for<F, Fut>(condition: F, timeout_secs: u64) -> anyhow::Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_secs);

    loop {
        if condition().await {
            return Ok(());
        }

        if start.elapsed() > timeout {
            anyhow::bail!("Condition not met within {} seconds", timeout_secs);
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}

/// Sends a JSON request through the router and returns status + parsed body
pub async fn send_json(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
