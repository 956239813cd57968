//! Configurator Core - Shared types library.
//!
//! This crate provides the domain types used across all configurator components:
//! - `server` - Configurator page, admin catalog management, login
//! - `cli` - Migrations, catalog seeding, admin user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Price arithmetic, selection bookkeeping and form
//! validation live here so they can be tested without a running store.
//!
//! # Modules
//!
//! - [`types`] - Option records, ids, BRL prices, selections, emails
//! - [`defaults`] - The built-in starter catalog used by the seed command

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod defaults;
pub mod types;

pub use types::*;
