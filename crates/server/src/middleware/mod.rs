//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (new hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, `PostgreSQL` or memory store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{LOGIN_PATH, RequireAdmin};
pub use request_id::{RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_store};
