//! Database migration command.
//!
//! Applies `crates/server/migrations/` (schema `configurator`: option,
//! admin_user and session tables).
//!
//! # Environment Variables
//!
//! - `CONFIGURATOR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use tracing::info;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
