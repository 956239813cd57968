//! Business logic services.
//!
//! # Services
//!
//! - `catalog` - Option catalog state, reloaded after every write
//! - `auth` - Admin sign-in (argon2 passwords, session-backed identity)

pub mod auth;
pub mod catalog;

pub use catalog::{CatalogController, CatalogError, CatalogOperation, CatalogState};
