//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response is written.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;
use crate::services::CatalogError;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed in the store.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage failed outside a catalog operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template could not be rendered.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog(_) | Self::Store(_) | Self::Session(_) | Self::Template(_) => true,
            Self::Auth(err) => err.is_server_error(),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Catalog(_) | Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Session(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) if err.is_server_error() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(AuthError::TooManyRequests) => StatusCode::TOO_MANY_REQUESTS,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Never expose store or session details to clients
        let message = match &self {
            Self::Catalog(err) => err.operation.user_message().to_owned(),
            Self::Store(_) | Self::Session(_) | Self::Template(_) => {
                "Erro interno. Tente novamente".to_owned()
            }
            Self::Auth(err) => err.localized_message().to_owned(),
            Self::NotFound(_) => "Página não encontrada".to_owned(),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with the signed-in admin.
pub fn set_sentry_user(subject: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(subject.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Stop associating Sentry events with an admin.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
