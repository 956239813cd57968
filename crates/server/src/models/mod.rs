//! Session-scoped models.

pub mod session;

pub use session::{SessionUser, keys as session_keys};
