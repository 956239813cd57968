//! Core types for the configurator.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod email;
pub mod id;
pub mod option;
pub mod price;
pub mod selection;

pub use email::{Email, EmailError};
pub use id::OptionId;
pub use option::{AddonOption, NewOption, OptionForm, OptionPatch, ValidationError};
pub use price::{Price, PriceParseError, format_cents, mask_typed_digits, parse_display};
pub use selection::{Quote, SelectedItem, Selection};
