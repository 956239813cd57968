//! `PostgreSQL` catalog store.
//!
//! Ids are UUID v4 strings generated on insert. Both timestamps default to
//! `now()`, which is fixed for the duration of a statement, so a fresh row
//! always has `created_at == updated_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch, Price};

use super::{CatalogStore, StoreError};

/// Catalog store backed by the `configurator.option` table.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    id: OptionId,
    name: String,
    description: String,
    price: Price,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OptionRow> for AddonOption {
    type Error = StoreError;

    fn try_from(row: OptionRow) -> Result<Self, Self::Error> {
        if row.price.is_negative() {
            return Err(StoreError::DataCorruption(format!(
                "negative price for option {}",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgCatalogStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError> {
        let rows = sqlx::query_as::<_, OptionRow>(
            r"
            SELECT id, name, description, price, created_at, updated_at
            FROM configurator.option
            ORDER BY created_at DESC, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AddonOption::try_from).collect()
    }

    #[instrument(skip(self, fields), fields(name = %fields.name))]
    async fn create(&self, fields: NewOption) -> Result<OptionId, StoreError> {
        let id = OptionId::new(Uuid::new_v4().to_string());

        sqlx::query(
            r"
            INSERT INTO configurator.option (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE configurator.option
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                updated_at = GREATEST(now(), updated_at)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MissingDocument(id.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &OptionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM configurator.option WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
