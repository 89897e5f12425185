//! # FleetCheck API Server
//!
//! HTTP API for multi-tenant vehicle-inspection management: companies
//! bootstrap a tenant, admins manage users, vehicles, and checklist
//! templates, inspectors submit inspections, issues get reported and
//! resolved, and users receive notifications.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fleetcheck-api
//! ```

use fleetcheck_api::app::{build_router, AppState};
use fleetcheck_api::config::Config;
use fleetcheck_shared::db::migrations::run_migrations;
use fleetcheck_shared::db::pool::{create_pool, DatabaseConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetcheck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FleetCheck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
