//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::Session;

use crate::config::ServerConfig;
use crate::db::{AdminDirectory, CatalogStore};
use crate::services::CatalogController;
use crate::services::auth::{LoginThrottle, SessionIdentity};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    catalog: CatalogController,
    admins: Arc<dyn AdminDirectory>,
    throttle: Arc<LoginThrottle>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Catalog backend
    /// * `admins` - Admin accounts for sign-in
    /// * `pool` - `PostgreSQL` pool, when the backend uses one (readiness checks)
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn CatalogStore>,
        admins: Arc<dyn AdminDirectory>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: CatalogController::new(store),
                admins,
                throttle: Arc::new(LoginThrottle::default()),
                pool,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the catalog controller.
    #[must_use]
    pub fn catalog(&self) -> &CatalogController {
        &self.inner.catalog
    }

    /// Get the database pool, if the catalog lives in `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Identity provider for one browser session.
    #[must_use]
    pub fn identity(&self, session: Session) -> SessionIdentity {
        SessionIdentity::new(
            session,
            Arc::clone(&self.inner.admins),
            Arc::clone(&self.inner.throttle),
        )
    }
}
