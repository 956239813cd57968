//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin in PostgreSQL
//! CONFIGURATOR_ADMIN_PASSWORD=... cfg-cli admin create -e admin@example.com
//!
//! # Hash a password for CONFIGURATOR_ADMIN_PASSWORD_HASH (file/memory stores)
//! CONFIGURATOR_ADMIN_PASSWORD=... cfg-cli admin hash
//!
//! # Disable or re-enable an account
//! cfg-cli admin disable -e admin@example.com
//! cfg-cli admin enable -e admin@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIGURATOR_DATABASE_URL` - `PostgreSQL` connection string
//! - `CONFIGURATOR_ADMIN_PASSWORD` - Password (name configurable via `--password-env`)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use configurator_core::{Email, EmailError};
use configurator_server::db::{PgAdminDirectory, StoreError};
use configurator_server::services::auth::{AuthError, hash_password};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// No account with this email.
    #[error("No admin user with email: {0}")]
    UnknownUser(String),

    /// Store error.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError` if the email or password is invalid, the account
/// already exists, or the database fails.
pub async fn create(email: &str, password_env: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(AdminError::from)?;
    let password = read_password(password_env)?;
    let password_hash = hash_password(password.expose_secret()).map_err(AdminError::from)?;

    let directory = PgAdminDirectory::new(super::connect().await?);

    tracing::info!("Creating admin user: {}", email);
    let admin = directory
        .create(&email, &password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Store(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        admin.subject,
        admin.email
    );
    Ok(())
}

/// Print the Argon2 hash of the password in `password_env`.
///
/// # Errors
///
/// Returns `AdminError` if the password is missing, too short, or cannot be hashed.
pub fn hash(password_env: &str) -> Result<(), Box<dyn std::error::Error>> {
    let password = read_password(password_env)?;
    let password_hash = hash_password(password.expose_secret()).map_err(AdminError::from)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{password_hash}");
    }
    Ok(())
}

/// Enable or disable an account.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no account matches.
pub async fn set_disabled(email: &str, disabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(AdminError::from)?;
    let directory = PgAdminDirectory::new(super::connect().await?);

    if !directory.set_disabled(&email, disabled).await.map_err(AdminError::from)? {
        return Err(AdminError::UnknownUser(email.to_string()).into());
    }

    let state = if disabled { "disabled" } else { "enabled" };
    tracing::info!("Admin user {} {}", email, state);
    Ok(())
}

fn read_password(password_env: &str) -> Result<SecretString, AdminError> {
    dotenvy::dotenv().ok();

    let password = std::env::var(password_env)
        .map_err(|_| AdminError::MissingEnvVar(password_env.to_owned()))?;
    validate_password(&password)?;
    Ok(SecretString::from(password))
}

fn validate_password(password: &str) -> Result<(), AdminError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }
    Ok(())
}
