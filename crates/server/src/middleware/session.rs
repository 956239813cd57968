//! Session layer configuration.
//!
//! Sessions live in `PostgreSQL` (`configurator.session`) when the catalog
//! does, and in process memory otherwise.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "configurator_session";

/// Inactivity before a session expires, in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Session store over the `configurator.session` table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the schema or table name is rejected.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    PostgresStore::new(pool.clone())
        .with_schema_name("configurator")
        .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))?
        .with_table_name("session")
        .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))
}

/// Wrap `store` in the session layer used by every route.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &ServerConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
