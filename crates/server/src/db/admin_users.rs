//! Admin accounts allowed to manage the catalog.

use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use configurator_core::Email;

use super::StoreError;
use crate::config::BootstrapAdmin;

/// Stored admin login.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    /// Stable account identifier
    pub subject: String,
    pub email: Email,
    /// Argon2 PHC string
    pub password_hash: SecretString,
    /// Disabled accounts cannot sign in.
    pub disabled: bool,
}

/// Lookup of admin accounts by email.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Find the account registered under `email`, if any.
    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminCredential>, StoreError>;
}

/// Admin accounts in the `configurator.admin_user` table.
#[derive(Clone)]
pub struct PgAdminDirectory {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    email: String,
    password_hash: String,
    disabled: bool,
}

impl TryFrom<AdminRow> for AdminCredential {
    type Error = StoreError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            subject: row.id.to_string(),
            email,
            password_hash: SecretString::from(row.password_hash),
            disabled: row.disabled,
        })
    }
}

impl PgAdminDirectory {
    /// Create a new directory over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<AdminCredential, StoreError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            INSERT INTO configurator.admin_user (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, disabled
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            StoreError::Database(e)
        })?;

        AdminCredential::try_from(row)
    }

    /// Enable or disable an account. Returns whether an account matched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn set_disabled(&self, email: &Email, disabled: bool) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE configurator.admin_user SET disabled = $2 WHERE email = $1")
                .bind(email.as_str())
                .bind(disabled)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdminDirectory for PgAdminDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminCredential>, StoreError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, email, password_hash, disabled
            FROM configurator.admin_user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AdminCredential::try_from).transpose()
    }
}

/// Fixed set of admin accounts held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdminDirectory {
    admins: Vec<AdminCredential>,
}

impl MemoryAdminDirectory {
    /// Directory with no accounts; every sign-in fails with user-not-found.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory holding the bootstrap admin from configuration, if any.
    #[must_use]
    pub fn from_bootstrap(admin: Option<&BootstrapAdmin>) -> Self {
        let admins = admin
            .map(|admin| AdminCredential {
                subject: format!("bootstrap:{}", admin.email),
                email: admin.email.clone(),
                password_hash: admin.password_hash.clone(),
                disabled: false,
            })
            .into_iter()
            .collect();

        Self { admins }
    }

    /// Add an account.
    #[must_use]
    pub fn with_admin(mut self, admin: AdminCredential) -> Self {
        self.admins.push(admin);
        self
    }
}

#[async_trait]
impl AdminDirectory for MemoryAdminDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<AdminCredential>, StoreError> {
        Ok(self.admins.iter().find(|a| &a.email == email).cloned())
    }
}
