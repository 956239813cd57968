//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Configurator (options + price summary)
//! POST /selection/toggle          - Select/deselect an option
//! GET  /options/{id}              - Option details
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check
//!
//! # Admin (requires sign-in)
//! GET  /admin                     - Catalog management
//! POST /admin/options             - Create option
//! POST /admin/options/{id}        - Update option
//! POST /admin/options/{id}/delete - Delete option
//! POST /admin/logout              - Sign out
//!
//! # Auth
//! GET  /admin/login               - Login page
//! POST /admin/login               - Login action
//! ```

pub mod admin;
pub mod auth;
pub mod configurator;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router (mounted at `/admin`).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/options", post(admin::create))
        .route("/options/{id}", post(admin::update))
        .route("/options/{id}/delete", post(admin::delete))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the main routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(configurator::index))
        .route("/selection/toggle", post(configurator::toggle))
        .route("/options/{id}", get(configurator::detail))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/admin", admin_routes())
}
