//! Store-assigned option identifiers.
//!
//! Catalog records are keyed by opaque strings handed out by the store
//! (UUIDs for the `PostgreSQL` backend). Wrapping them keeps option ids from
//! being mixed up with names or other free-form strings in handlers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catalog option.
///
/// # Example
///
/// ```rust
/// # use configurator_core::OptionId;
/// let id = OptionId::new("a");
/// assert_eq!(id.as_str(), "a");
/// assert_eq!(id.to_string(), "a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    /// Wrap a store-assigned id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OptionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<OptionId> for String {
    fn from(id: OptionId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = OptionId::new("3f2a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"3f2a\"");

        let parsed: OptionId = serde_json::from_str("\"3f2a\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_ordering_follows_string_order() {
        assert!(OptionId::new("a") < OptionId::new("b"));
    }
}
