/// Embedded database migration runner
///
/// Migrations live in the `migrations/` directory of this crate and are
/// compiled into the binary via `sqlx::migrate!`, so deployments never depend
/// on loose `.sql` files being present on disk.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the database connection
/// is lost mid-run. Failed migrations are rolled back where PostgreSQL allows.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
