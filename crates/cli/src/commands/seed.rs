//! Catalog seeding.
//!
//! Every option is inserted as a new record, so running the command twice
//! produces duplicates. A failed insert is logged and the rest continue.
//!
//! # File format
//!
//! ```yaml
//! options:
//!   - name: Capa Básica
//!     description: Capa simples em material resistente
//!     price: "150.00"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use configurator_core::NewOption;
use configurator_core::defaults::default_options;
use configurator_server::db::{CatalogStore, JsonFileStore, PgCatalogStore};

/// Contents of a seed file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    options: Vec<NewOption>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub failed: usize,
}

/// Seed catalog options.
///
/// # Arguments
///
/// * `file_path` - YAML file to read; the starter catalog when `None`
/// * `catalog_file` - JSON catalog to write; `PostgreSQL` when `None`
///
/// # Errors
///
/// Returns an error if the seed file cannot be read or the store cannot be
/// opened. Individual insert failures are logged, not returned.
pub async fn options(
    file_path: Option<&str>,
    catalog_file: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = match file_path {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(format!("File not found: {}", path.display()).into());
            }
            info!(path = %path.display(), "Loading options from file");
            let content = tokio::fs::read_to_string(path).await?;
            parse_seed_file(&content)?
        }
        None => {
            info!("Using the starter catalog");
            default_options()
        }
    };

    let store: Arc<dyn CatalogStore> = match catalog_file {
        Some(path) => Arc::new(JsonFileStore::open(path).await?),
        None => Arc::new(PgCatalogStore::new(super::connect().await?)),
    };

    let summary = seed_into(store.as_ref(), options).await;

    info!("Seeding complete!");
    info!("  Options inserted: {}", summary.inserted);
    if summary.failed > 0 {
        error!("  Options failed: {}", summary.failed);
    }

    Ok(())
}

fn parse_seed_file(content: &str) -> Result<Vec<NewOption>, serde_yaml::Error> {
    serde_yaml::from_str::<SeedFile>(content).map(|file| file.options)
}

async fn seed_into(store: &dyn CatalogStore, options: Vec<NewOption>) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for option in options {
        let name = option.name.clone();

        if name.trim().is_empty() || option.description.trim().is_empty() {
            error!(name = %name, "Skipping option with blank fields");
            summary.failed += 1;
            continue;
        }
        if option.price.is_negative() {
            error!(name = %name, price = %option.price, "Skipping option with negative price");
            summary.failed += 1;
            continue;
        }
        if !option.price.is_whole_cents() {
            error!(name = %name, price = %option.price.amount(), "Skipping option with fractional centavos");
            summary.failed += 1;
            continue;
        }

        match store.create(option).await {
            Ok(id) => {
                info!(name = %name, id = %id, "Added option");
                summary.inserted += 1;
            }
            Err(e) => {
                error!(name = %name, error = %e, "Failed to add option");
                summary.failed += 1;
            }
        }
    }

    summary
}
