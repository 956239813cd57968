//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CONFIGURATOR_BASE_URL` - Public URL of the server (`https://` enables secure cookies)
//! - `CONFIGURATOR_DATABASE_URL` - `PostgreSQL` connection string (only for the `postgres` store;
//!   falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CONFIGURATOR_STORE` - Catalog backend: `postgres` (default), `file`, or `memory`
//! - `CONFIGURATOR_CATALOG_FILE` - JSON catalog path for the `file` store (default: data/options.json)
//! - `CONFIGURATOR_HOST` - Bind address (default: 127.0.0.1)
//! - `CONFIGURATOR_PORT` - Listen port (default: 3000)
//! - `CONFIGURATOR_ADMIN_EMAIL` - Bootstrap admin for the `file`/`memory` stores
//! - `CONFIGURATOR_ADMIN_PASSWORD_HASH` - Argon2 PHC hash for the bootstrap admin
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use configurator_core::Email;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CATALOG_FILE: &str = "data/options.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the option catalog is kept.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Remote `PostgreSQL` database.
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
    },
    /// Single JSON file rewritten on every change.
    File {
        /// Path of the catalog file
        path: PathBuf,
    },
    /// Process memory, seeded with the starter catalog.
    Memory,
}

impl StoreBackend {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::File { .. } => "file",
            Self::Memory => "memory",
        }
    }
}

/// Admin account configured through the environment.
///
/// Used when the catalog does not live in `PostgreSQL` and so there is no
/// admin table to sign in against.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: Email,
    /// Argon2 PHC string
    pub password_hash: SecretString,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Catalog storage backend
    pub store: StoreBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Admin account for non-database stores
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let store = match env.or_default("CONFIGURATOR_STORE", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: env
                    .get("CONFIGURATOR_DATABASE_URL")
                    .or_else(|| env.get("DATABASE_URL"))
                    .map(SecretString::from)
                    .ok_or_else(|| {
                        ConfigError::MissingEnvVar("CONFIGURATOR_DATABASE_URL".to_string())
                    })?,
            },
            "file" => StoreBackend::File {
                path: PathBuf::from(env.or_default("CONFIGURATOR_CATALOG_FILE", DEFAULT_CATALOG_FILE)),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "CONFIGURATOR_STORE".to_string(),
                    format!("unknown store '{other}' (expected postgres, file or memory)"),
                ));
            }
        };

        let host = env
            .or_default("CONFIGURATOR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONFIGURATOR_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("CONFIGURATOR_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONFIGURATOR_PORT".to_string(), e.to_string()))?;
        let base_url = env.required("CONFIGURATOR_BASE_URL")?;

        let bootstrap_admin = match (
            env.get("CONFIGURATOR_ADMIN_EMAIL"),
            env.get("CONFIGURATOR_ADMIN_PASSWORD_HASH"),
        ) {
            (Some(email), Some(hash)) => Some(BootstrapAdmin {
                email: Email::parse(&email).map_err(|e| {
                    ConfigError::InvalidEnvVar("CONFIGURATOR_ADMIN_EMAIL".to_string(), e.to_string())
                })?,
                password_hash: SecretString::from(hash),
            }),
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "CONFIGURATOR_ADMIN_PASSWORD_HASH".to_string(),
                ));
            }
            _ => None,
        };

        Ok(Self {
            store,
            host,
            port,
            base_url,
            bootstrap_admin,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}
