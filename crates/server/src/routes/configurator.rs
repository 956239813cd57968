//! Configurator page: option picker and price summary.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use configurator_core::{AddonOption, OptionId, Selection};

use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One option card on the picker.
#[derive(Debug, Clone)]
pub struct OptionCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub selected: bool,
}

impl OptionCard {
    fn new(option: &AddonOption, selection: &Selection) -> Self {
        Self {
            id: option.id.to_string(),
            name: option.name.clone(),
            price: option.price.to_string(),
            selected: selection.contains(&option.id),
        }
    }
}

/// One line of the price summary.
#[derive(Debug, Clone)]
pub struct SummaryLine {
    pub name: String,
    pub price: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Configurator page template.
#[derive(Template)]
#[template(path = "configurator.html")]
pub struct ConfiguratorTemplate {
    pub loading: bool,
    pub error: Option<String>,
    pub options: Vec<OptionCard>,
    pub summary: Vec<SummaryLine>,
    pub total: String,
}

/// Option detail template.
#[derive(Template)]
#[template(path = "option_detail.html")]
pub struct OptionDetailTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub selected: bool,
}

// =============================================================================
// Form Types
// =============================================================================

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub option_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the configurator.
///
/// The catalog is reloaded for every render. The stored selection is then
/// trimmed to options that still exist.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    let catalog = state.catalog().load().await;
    let mut selection = load_selection(&session).await?;

    // A failed load may leave an empty or stale list; keep the selection
    // until the catalog is known again.
    if catalog.error.is_none() && selection.reconcile(&catalog.options) {
        save_selection(&session, &selection).await?;
    }

    let quote = selection.quote(&catalog.options);
    let template = ConfiguratorTemplate {
        loading: catalog.loading,
        error: catalog.error,
        options: catalog
            .options
            .iter()
            .map(|option| OptionCard::new(option, &selection))
            .collect(),
        summary: quote
            .items
            .into_iter()
            .map(|item| SummaryLine {
                name: item.name,
                price: item.price.to_string(),
            })
            .collect(),
        total: quote.total.to_string(),
    };

    Ok(Html(template.render()?))
}

/// Select or deselect one option.
#[instrument(skip(session))]
pub async fn toggle(session: Session, Form(form): Form<ToggleForm>) -> Result<Redirect> {
    let mut selection = load_selection(&session).await?;
    let selected = selection.toggle(OptionId::new(form.option_id));
    save_selection(&session, &selection).await?;

    tracing::debug!(selected, count = selection.len(), "Selection toggled");
    Ok(Redirect::to("/"))
}

/// Option details.
#[instrument(skip(state, session))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = OptionId::new(id);
    let catalog = state.catalog().load().await;
    let option = catalog
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("option {id}")))?;
    let selection = load_selection(&session).await?;

    let template = OptionDetailTemplate {
        id: option.id.to_string(),
        name: option.name.clone(),
        description: option.description.clone(),
        price: option.price.to_string(),
        selected: selection.contains(&option.id),
    };

    Ok(Html(template.render()?))
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn load_selection(session: &Session) -> Result<Selection> {
    Ok(session
        .get::<Selection>(session_keys::SELECTION)
        .await?
        .unwrap_or_default())
}

async fn save_selection(session: &Session, selection: &Selection) -> Result<()> {
    session.insert(session_keys::SELECTION, selection).await?;
    Ok(())
}
