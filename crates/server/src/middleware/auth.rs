//! Admin gate for route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::SessionUser;
use crate::services::auth::{AdminAccess, AuthController, SessionIdentity};
use crate::state::AppState;

/// Where signed-out visitors are sent.
pub const LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires a signed-in admin.
///
/// Waits for the session to resolve, then either yields the admin or
/// redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn admin_index(RequireAdmin { user, .. }: RequireAdmin) -> impl IntoResponse {
///     format!("Olá, {}", user.email)
/// }
/// ```
pub struct RequireAdmin {
    pub user: SessionUser,
    /// Provider for this session, for signing out.
    pub identity: SessionIdentity,
}

/// Rejection for [`RequireAdmin`].
pub enum AdminRejection {
    /// Not signed in.
    RedirectToLogin,
    /// Session layer missing from the router.
    NoSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::NoSession)?;

        let identity = state.identity(session);
        let mut controller = AuthController::new(&identity);

        match controller.resolved().await {
            AdminAccess::Authenticated(user) => Ok(Self { user, identity }),
            AdminAccess::Unauthenticated | AdminAccess::Unknown => {
                Err(AdminRejection::RedirectToLogin)
            }
        }
    }
}
