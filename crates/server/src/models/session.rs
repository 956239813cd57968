//! Types stored in the browser session.

use serde::{Deserialize, Serialize};

use configurator_core::Email;

/// Signed-in admin, as kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account identifier from the admin directory.
    pub subject: String,
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Signed-in admin ([`super::SessionUser`]).
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Options picked on the configurator page.
    pub const SELECTION: &str = "selection";
}
