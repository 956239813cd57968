//! In-process catalog store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use configurator_core::defaults::default_options;
use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch};

use super::{CatalogStore, StoreError};

/// Catalog held in a `Vec`, newest first.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    options: RwLock<Vec<AddonOption>>,
}

impl MemoryCatalogStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with an existing list (kept in the given order).
    #[must_use]
    pub fn with_options(options: Vec<AddonOption>) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }

    /// Store preloaded with the starter catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let mut options = Vec::new();
        for fields in default_options() {
            insert_new(&mut options, fields);
        }
        Self::with_options(options)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError> {
        Ok(self.options.read().await.clone())
    }

    async fn create(&self, fields: NewOption) -> Result<OptionId, StoreError> {
        let mut options = self.options.write().await;
        Ok(insert_new(&mut options, fields))
    }

    async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), StoreError> {
        let mut options = self.options.write().await;
        apply_patch(&mut options, id, &patch)
    }

    async fn delete(&self, id: &OptionId) -> Result<(), StoreError> {
        self.options.write().await.retain(|option| &option.id != id);
        Ok(())
    }
}

/// Insert a freshly stamped option at the front of a newest-first list.
pub(crate) fn insert_new(options: &mut Vec<AddonOption>, fields: NewOption) -> OptionId {
    let now = Utc::now();
    let id = OptionId::new(Uuid::new_v4().to_string());

    options.insert(
        0,
        AddonOption {
            id: id.clone(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            created_at: now,
            updated_at: now,
        },
    );

    id
}

/// Patch the option with `id` in place. `updated_at` never moves backwards.
pub(crate) fn apply_patch(
    options: &mut [AddonOption],
    id: &OptionId,
    patch: &OptionPatch,
) -> Result<(), StoreError> {
    let option = options
        .iter_mut()
        .find(|option| &option.id == id)
        .ok_or_else(|| StoreError::MissingDocument(id.clone()))?;

    let now = Utc::now().max(option.updated_at);
    patch.apply(option, now);
    Ok(())
}
