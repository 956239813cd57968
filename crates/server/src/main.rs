//! Add-on configurator server.
//!
//! Serves the option picker, the price summary and the admin catalog on
//! port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Catalog in `PostgreSQL`, a JSON file, or process memory (`CONFIGURATOR_STORE`)
//! - Admin sign-in with argon2 password hashes and tower-sessions
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p configurator-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use configurator_server::config::{ServerConfig, StoreBackend};
use configurator_server::db::{
    self, AdminDirectory, CatalogStore, JsonFileStore, MemoryAdminDirectory, MemoryCatalogStore,
    PgAdminDirectory, PgCatalogStore,
};
use configurator_server::middleware::{create_session_layer, postgres_store};
use configurator_server::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "configurator_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::info!(store = config.store.name(), "Starting configurator");

    let addr = config.socket_addr();
    let app = match config.store.clone() {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(&database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");

            let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
            let admins: Arc<dyn AdminDirectory> = Arc::new(PgAdminDirectory::new(pool.clone()));
            let sessions = postgres_store(&pool).expect("Invalid session table configuration");
            let session_layer = create_session_layer(sessions, &config);

            let state = AppState::new(config, store, admins, Some(pool));
            load_catalog(&state).await;
            configurator_server::app(state, session_layer)
        }
        StoreBackend::File { path } => {
            let store = JsonFileStore::open(&path)
                .await
                .expect("Failed to open catalog file");
            tracing::info!(path = %path.display(), "Catalog file opened");

            let admins = Arc::new(MemoryAdminDirectory::from_bootstrap(
                config.bootstrap_admin.as_ref(),
            ));
            let session_layer = create_session_layer(MemoryStore::default(), &config);

            let state = AppState::new(config, Arc::new(store), admins, None);
            load_catalog(&state).await;
            configurator_server::app(state, session_layer)
        }
        StoreBackend::Memory => {
            let admins = Arc::new(MemoryAdminDirectory::from_bootstrap(
                config.bootstrap_admin.as_ref(),
            ));
            let session_layer = create_session_layer(MemoryStore::default(), &config);

            let state = AppState::new(config, Arc::new(MemoryCatalogStore::seeded()), admins, None);
            load_catalog(&state).await;
            configurator_server::app(state, session_layer)
        }
    };

    tracing::info!("configurator listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Initial catalog load. A failure is shown on the pages, not fatal.
async fn load_catalog(state: &AppState) {
    match state.catalog().refresh().await {
        Ok(()) => {
            let count = state.catalog().snapshot().await.options.len();
            tracing::info!(count, "Catalog loaded");
        }
        Err(e) => tracing::warn!(error = %e, "Initial catalog load failed"),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
