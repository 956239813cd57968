//! Catalog controller.
//!
//! Owns the list of options every page renders from. Writes go to the store
//! and are followed by a full reload; the in-memory list is never patched
//! directly.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch};

use crate::db::{CatalogStore, StoreError};

/// Which catalog operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOperation {
    Load,
    Add,
    Update,
    Delete,
}

impl CatalogOperation {
    /// Fixed message shown to users when this operation fails.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::Load => "Erro ao carregar opções",
            Self::Add => "Erro ao adicionar opção",
            Self::Update => "Erro ao atualizar opção",
            Self::Delete => "Erro ao deletar opção",
        }
    }
}

/// A catalog operation failed in the store.
#[derive(Debug, Error)]
#[error("{}", .operation.user_message())]
pub struct CatalogError {
    pub operation: CatalogOperation,
    #[source]
    pub source: StoreError,
}

/// What the pages see of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    /// Newest first, as returned by the last successful load.
    pub options: Vec<AddonOption>,
    /// A load is in flight.
    pub loading: bool,
    /// Message from the last failed load. The configurator hides its grid
    /// while set.
    pub error: Option<String>,
    /// Message from the last failed add, update or delete. Only the admin
    /// page shows it.
    pub write_error: Option<String>,
}

impl CatalogState {
    /// Look up an option by id.
    #[must_use]
    pub fn find(&self, id: &OptionId) -> Option<&AddonOption> {
        self.options.iter().find(|option| &option.id == id)
    }
}

/// Shared catalog state plus the store it is loaded from.
pub struct CatalogController {
    store: Arc<dyn CatalogStore>,
    state: RwLock<CatalogState>,
}

impl CatalogController {
    /// Create a controller with an empty, not-yet-loaded catalog.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> CatalogState {
        self.state.read().await.clone()
    }

    /// Reload the catalog for one page render and return what it saw.
    ///
    /// A failed load is logged and recorded in the returned state.
    pub async fn load(&self) -> CatalogState {
        let _ = self.refresh().await;
        let mut state = self.snapshot().await;
        // This render's own load is done even if another is still running.
        state.loading = false;
        state
    }

    /// Reload every option from the store.
    ///
    /// Clears both error messages first. On failure the previous options
    /// are kept next to the load error.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` with `CatalogOperation::Load` if the store fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.write_error = None;
        }

        let result = self.store.list_all().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(options) => {
                state.options = options;
                Ok(())
            }
            Err(source) => {
                error!(error = %source, "Failed to load catalog");
                state.error = Some(CatalogOperation::Load.user_message().to_owned());
                Err(CatalogError {
                    operation: CatalogOperation::Load,
                    source,
                })
            }
        }
    }

    /// Create an option and reload the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` with `CatalogOperation::Add` if the store
    /// rejects the insert.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub async fn add(&self, fields: NewOption) -> Result<OptionId, CatalogError> {
        self.clear_error().await;

        match self.store.create(fields).await {
            Ok(id) => {
                info!(id = %id, "Option created");
                let _ = self.refresh().await;
                Ok(id)
            }
            Err(source) => Err(self.write_failed(CatalogOperation::Add, source).await),
        }
    }

    /// Patch an option and reload the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` with `CatalogOperation::Update` if the store
    /// rejects the update (including unknown ids).
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), CatalogError> {
        self.clear_error().await;

        match self.store.update(id, patch).await {
            Ok(()) => {
                info!("Option updated");
                let _ = self.refresh().await;
                Ok(())
            }
            Err(source) => Err(self.write_failed(CatalogOperation::Update, source).await),
        }
    }

    /// Delete an option and reload the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` with `CatalogOperation::Delete` if the store
    /// rejects the delete.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: &OptionId) -> Result<(), CatalogError> {
        self.clear_error().await;

        match self.store.delete(id).await {
            Ok(()) => {
                info!("Option deleted");
                let _ = self.refresh().await;
                Ok(())
            }
            Err(source) => Err(self.write_failed(CatalogOperation::Delete, source).await),
        }
    }

    async fn clear_error(&self) {
        self.state.write().await.write_error = None;
    }

    async fn write_failed(&self, operation: CatalogOperation, source: StoreError) -> CatalogError {
        error!(error = %source, ?operation, "Catalog write failed");
        self.state.write().await.write_error = Some(operation.user_message().to_owned());
        CatalogError { operation, source }
    }
}
