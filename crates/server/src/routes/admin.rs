//! Catalog administration (requires a signed-in admin).

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{instrument, warn};

use configurator_core::{AddonOption, OptionForm, OptionId, OptionPatch};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::CatalogState;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Form field values plus the message from a failed submission.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub name: String,
    pub description: String,
    pub price: String,
    pub error: Option<String>,
}

impl FormView {
    fn filled(form: OptionForm, error: Option<String>) -> Self {
        Self {
            name: form.name,
            description: form.description,
            price: form.price,
            error,
        }
    }
}

/// One option in the admin list, with its edit form.
#[derive(Debug, Clone)]
pub struct AdminOptionRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub edit: FormView,
}

impl From<&AddonOption> for AdminOptionRow {
    fn from(option: &AddonOption) -> Self {
        Self {
            id: option.id.to_string(),
            name: option.name.clone(),
            description: option.description.clone(),
            price: option.price.to_string(),
            edit: FormView::filled(OptionForm::from_option(option), None),
        }
    }
}

/// Admin page template.
#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub admin_email: String,
    pub loading: bool,
    pub error: Option<String>,
    pub write_error: Option<String>,
    pub options: Vec<AdminOptionRow>,
    pub new_option: FormView,
}

/// A submission to re-render into the page.
enum Rejected {
    Add(FormView),
    Edit(OptionId, FormView),
}

// =============================================================================
// Handlers
// =============================================================================

/// Admin catalog list, reloaded on every visit.
#[instrument(skip_all)]
pub async fn index(admin: RequireAdmin, State(state): State<AppState>) -> Result<Html<String>> {
    let catalog = state.catalog().load().await;
    render(&admin, catalog, None)
}

/// Create an option.
#[instrument(skip_all)]
pub async fn create(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<OptionForm>,
) -> Result<Response> {
    let form = form.with_masked_price();

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => {
            let view = FormView::filled(form, Some(e.user_message().to_owned()));
            return rerender(
                &admin,
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
                Some(Rejected::Add(view)),
            )
            .await;
        }
    };

    match state.catalog().add(fields).await {
        Ok(_) => Ok(Redirect::to("/admin").into_response()),
        Err(e) => {
            let message = e.to_string();
            let view = FormView::filled(form, Some(message.clone()));
            rerender(
                &admin,
                &state,
                StatusCode::SERVICE_UNAVAILABLE,
                Some(message),
                Some(Rejected::Add(view)),
            )
            .await
        }
    }
}

/// Update an option. Only changed fields are sent to the store.
#[instrument(skip(admin, state, form))]
pub async fn update(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<OptionForm>,
) -> Result<Response> {
    let id = OptionId::new(id);
    let form = form.with_masked_price();

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(e) => {
            let view = FormView::filled(form, Some(e.user_message().to_owned()));
            return rerender(
                &admin,
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
                Some(Rejected::Edit(id, view)),
            )
            .await;
        }
    };

    let patch = state
        .catalog()
        .snapshot()
        .await
        .find(&id)
        .map_or_else(
            || OptionPatch::from(fields.clone()),
            |current| OptionPatch::between(current, &fields),
        );

    match state.catalog().update(&id, patch).await {
        Ok(()) => Ok(Redirect::to("/admin").into_response()),
        Err(e) => {
            let message = e.to_string();
            let view = FormView::filled(form, Some(message.clone()));
            rerender(
                &admin,
                &state,
                StatusCode::SERVICE_UNAVAILABLE,
                Some(message),
                Some(Rejected::Edit(id, view)),
            )
            .await
        }
    }
}

/// Delete an option.
#[instrument(skip(admin, state))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = OptionId::new(id);

    match state.catalog().remove(&id).await {
        Ok(()) => Ok(Redirect::to("/admin").into_response()),
        Err(e) => {
            warn!(error = %e, "Delete failed");
            rerender(
                &admin,
                &state,
                StatusCode::SERVICE_UNAVAILABLE,
                Some(e.to_string()),
                None,
            )
            .await
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Render the page after a rejected submission.
///
/// The write error is taken from this request, never from shared state.
async fn rerender(
    admin: &RequireAdmin,
    state: &AppState,
    status: StatusCode,
    write_error: Option<String>,
    rejected: Option<Rejected>,
) -> Result<Response> {
    let mut catalog = state.catalog().snapshot().await;
    catalog.write_error = write_error;
    let page = render(admin, catalog, rejected)?;
    Ok((status, page).into_response())
}

fn render(
    admin: &RequireAdmin,
    catalog: CatalogState,
    rejected: Option<Rejected>,
) -> Result<Html<String>> {
    let mut options: Vec<AdminOptionRow> =
        catalog.options.iter().map(AdminOptionRow::from).collect();
    let mut new_option = FormView::default();

    match rejected {
        Some(Rejected::Add(view)) => new_option = view,
        Some(Rejected::Edit(id, view)) => {
            if let Some(row) = options.iter_mut().find(|row| row.id == id.as_str()) {
                row.edit = view;
            }
        }
        None => {}
    }

    let template = AdminTemplate {
        admin_email: admin.user.email.to_string(),
        loading: catalog.loading,
        error: catalog.error,
        write_error: catalog.write_error,
        options,
        new_option,
    };

    Ok(Html(template.render()?))
}
