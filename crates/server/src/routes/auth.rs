//! Admin sign-in and sign-out.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, instrument, warn};

use crate::error::Result;
use crate::middleware::{LOGIN_PATH, RequireAdmin};
use crate::services::auth::{AdminAccess, AuthController, AuthError, IdentityProvider};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Display the login page, or skip it when already signed in.
#[instrument(skip_all)]
pub async fn login_page(State(state): State<AppState>, session: Session) -> Result<Response> {
    let identity = state.identity(session);
    let mut controller = AuthController::new(&identity);

    if let AdminAccess::Authenticated(_) = controller.resolved().await {
        return Ok(Redirect::to("/admin").into_response());
    }

    let template = LoginTemplate {
        email: String::new(),
        error: None,
    };
    Ok(Html(template.render()?).into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let identity = state.identity(session);

    match identity.sign_in(&form.email, &form.password).await {
        Ok(_) => Ok(Redirect::to("/admin").into_response()),
        Err(e) => {
            if e.is_server_error() {
                error!(error = %e, "Login failed");
            } else {
                warn!(code = e.code(), "Login rejected");
            }

            let template = LoginTemplate {
                email: form.email,
                error: Some(e.localized_message().to_owned()),
            };
            Ok((login_status(&e), Html(template.render()?)).into_response())
        }
    }
}

/// Sign out and return to the login page.
#[instrument(skip_all)]
pub async fn logout(admin: RequireAdmin) -> Result<Redirect> {
    admin.identity.sign_out().await?;
    Ok(Redirect::to(LOGIN_PATH))
}

const fn login_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthError::InvalidEmail(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ if err.is_server_error() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::UNAUTHORIZED,
    }
}
