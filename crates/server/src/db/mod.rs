//! Catalog and admin storage.
//!
//! # Backends
//!
//! - [`PgCatalogStore`] - `PostgreSQL` (`configurator.option` table)
//! - [`JsonFileStore`] - a single JSON file rewritten on every change
//! - [`MemoryCatalogStore`] - process memory (local development and tests)
//!
//! Every operation is attempted exactly once. Callers decide what a failure
//! means for the user; see `services::catalog`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p configurator-cli -- migrate
//! ```

pub mod admin_users;
pub mod file;
pub mod memory;
pub mod options;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch};

pub use admin_users::{AdminCredential, AdminDirectory, MemoryAdminDirectory, PgAdminDirectory};
pub use file::JsonFileStore;
pub use memory::MemoryCatalogStore;
pub use options::PgCatalogStore;

/// Errors from catalog and admin storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog file could not be read or written.
    #[error("catalog file error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file contents are not a valid option list.
    #[error("catalog file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Update targeted an id the store does not hold.
    #[error("no option with id {0}")]
    MissingDocument(OptionId),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create/read/update/delete access to the option catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All options, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError>;

    /// Insert a new option. The store assigns the id and sets `created_at`
    /// and `updated_at` to the same instant.
    async fn create(&self, fields: NewOption) -> Result<OptionId, StoreError>;

    /// Replace the supplied fields and refresh `updated_at`.
    ///
    /// Fails with [`StoreError::MissingDocument`] if `id` does not exist.
    async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), StoreError>;

    /// Remove an option. Missing ids are not an error.
    async fn delete(&self, id: &OptionId) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
