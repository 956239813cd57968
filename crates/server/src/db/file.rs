//! JSON file catalog store.
//!
//! The whole list is rewritten on every change. A write that fails leaves
//! both the file and the in-memory copy as they were.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch};

use super::memory::{apply_patch, insert_new};
use super::{CatalogStore, StoreError};

/// Catalog persisted to a single JSON array on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    options: Mutex<Vec<AddonOption>>,
}

impl JsonFileStore {
    /// Open the catalog at `path`. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file exists but cannot be read, or
    /// `StoreError::Serialization` if it is not a valid option list.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let options = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<AddonOption>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Catalog file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            options: Mutex::new(options),
        })
    }

    async fn persist(&self, options: &[AddonOption]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(options)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError> {
        Ok(self.options.lock().await.clone())
    }

    #[instrument(skip(self, fields), fields(path = %self.path.display()))]
    async fn create(&self, fields: NewOption) -> Result<OptionId, StoreError> {
        let mut options = self.options.lock().await;
        let mut next = options.clone();
        let id = insert_new(&mut next, fields);

        self.persist(&next).await?;
        *options = next;
        Ok(id)
    }

    #[instrument(skip(self, patch), fields(path = %self.path.display()))]
    async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), StoreError> {
        let mut options = self.options.lock().await;
        let mut next = options.clone();
        apply_patch(&mut next, id, &patch)?;

        self.persist(&next).await?;
        *options = next;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self, id: &OptionId) -> Result<(), StoreError> {
        let mut options = self.options.lock().await;
        let next: Vec<AddonOption> = options
            .iter()
            .filter(|option| &option.id != id)
            .cloned()
            .collect();

        self.persist(&next).await?;
        *options = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use configurator_core::Price;

    use super::*;

    fn fields(name: &str, cents: i64) -> NewOption {
        NewOption {
            name: name.to_owned(),
            description: format!("{name} description"),
            price: Price::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("options.json"))
            .await
            .unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("options.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let kept = store.create(fields("Relevo", 11000)).await.unwrap();
        let dropped = store.create(fields("Impressão UV", 14000)).await.unwrap();
        store
            .update(&kept, OptionPatch::price(Price::from_cents(11500)))
            .await
            .unwrap();
        store.delete(&dropped).await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let options = reopened.list_all().await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, kept);
        assert_eq!(options[0].price, Price::from_cents(11500));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        tokio::fs::write(&path, b"{ not a list").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.create(fields("Relevo", 11000)).await.unwrap();
        let before = tokio::fs::read(&path).await.unwrap();

        let err = store
            .update(&OptionId::new("missing"), OptionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDocument(_)));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), before);
    }
}
