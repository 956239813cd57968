//! In-process HTTP tests for the add-on configurator.
//!
//! Each test builds the full router over memory-backed stores and drives it
//! with `tower::ServiceExt::oneshot`. No database or running server is needed.
//!
//! ```bash
//! cargo test -p configurator-integration-tests
//! ```
//!
//! # Test Files
//!
//! - `configurator` - Option picker, price summary, option details
//! - `admin_auth` - Admin gate, login errors, logout
//! - `admin_catalog` - Creating, editing and deleting options

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, TimeZone, Utc};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use configurator_core::{AddonOption, Email, OptionId, Price};
use configurator_server::config::ServerConfig;
use configurator_server::db::{AdminCredential, CatalogStore, MemoryAdminDirectory, MemoryCatalogStore};
use configurator_server::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use configurator_server::services::auth::hash_password;
use configurator_server::state::AppState;

/// Email of the admin every test app knows.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Password of [`ADMIN_EMAIL`].
pub const ADMIN_PASSWORD: &str = "senha-secreta-123";

/// Build a catalog record. Larger `age_minutes` sorts further down.
#[must_use]
pub fn option(id: &str, name: &str, description: &str, cents: i64, age_minutes: i64) -> AddonOption {
    let at = Utc
        .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        - Duration::minutes(age_minutes);

    AddonOption {
        id: OptionId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Price::from_cents(cents),
        created_at: at,
        updated_at: at,
    }
}

/// Three options, newest first: R$ 150,00, R$ 80,00 and R$ 110,00.
#[must_use]
pub fn fixture_catalog() -> Vec<AddonOption> {
    vec![
        option(
            "capa-basica",
            "Capa Básica",
            "Capa simples em material resistente",
            15000,
            0,
        ),
        option(
            "laminacao-fosca",
            "Laminação Fosca",
            "Acabamento fosco elegante e sofisticado",
            8000,
            1,
        ),
        option(
            "relevo",
            "Relevo",
            "Textura em relevo para um efeito tátil",
            11000,
            2,
        ),
    ]
}

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Assert a redirect to `path`.
    pub fn assert_redirect(&self, path: &str) {
        assert!(
            self.status.is_redirection(),
            "expected redirect to {path}, got {} with body:\n{}",
            self.status,
            self.body
        );
        assert_eq!(self.location.as_deref(), Some(path));
    }
}

/// The application plus one browser's session cookie.
pub struct TestApp {
    router: Router,
    state: AppState,
    cookie: Option<String>,
}

impl TestApp {
    /// App over the fixture catalog.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryCatalogStore::with_options(fixture_catalog()))).await
    }

    /// App over `store`, loaded once like the server does at startup.
    pub async fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        let config = ServerConfig::from_lookup(|key| match key {
            "CONFIGURATOR_BASE_URL" => Some("http://localhost:3000".to_owned()),
            "CONFIGURATOR_STORE" => Some("memory".to_owned()),
            _ => None,
        })
        .expect("test configuration");

        let admins = MemoryAdminDirectory::empty().with_admin(AdminCredential {
            subject: "admin-1".to_owned(),
            email: Email::parse(ADMIN_EMAIL).expect("valid email"),
            password_hash: SecretString::from(hash_password(ADMIN_PASSWORD).expect("hash")),
            disabled: false,
        });

        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, store, Arc::new(admins), None);
        // A failed first load is part of some tests; the state records it.
        let _ = state.catalog().refresh().await;

        Self {
            router: configurator_server::app(state.clone(), session_layer),
            state,
            cookie: None,
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Forget the session cookie, as a new browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self
            .request(path)
            .method("GET")
            .body(Body::empty())
            .expect("request");
        self.send(request).await
    }

    /// `POST path` with a urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request(path)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Sign in as [`ADMIN_EMAIL`].
    pub async fn sign_in(&mut self) {
        let response = self
            .post_form(
                "/admin/login",
                &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)],
            )
            .await;
        response.assert_redirect("/admin");
    }

    fn request(&self, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");

        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Some(pair) = value
                .to_str()
                .ok()
                .and_then(|v| v.split(';').next())
                .filter(|pair| pair.starts_with(&prefix))
            {
                self.cookie = Some(pair.to_owned());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
