//! Auth controller: the signed-in admin as pages see it.

use tokio::sync::watch;

use super::{AuthSnapshot, IdentityProvider};
use crate::models::SessionUser;

/// Whether the admin surface may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    /// The provider has not reported yet.
    Unknown,
    Authenticated(SessionUser),
    Unauthenticated,
}

/// Follows an [`IdentityProvider`] and exposes the latest user.
///
/// State only changes when the provider publishes.
pub struct AuthController {
    changes: watch::Receiver<AuthSnapshot>,
}

impl AuthController {
    /// Start following `provider`.
    #[must_use]
    pub fn new(provider: &dyn IdentityProvider) -> Self {
        Self {
            changes: provider.subscribe(),
        }
    }

    /// Signed-in admin, if the provider has reported one.
    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        match &*self.changes.borrow() {
            AuthSnapshot::Resolved(user) => user.clone(),
            AuthSnapshot::Pending => None,
        }
    }

    /// True until the provider's first report.
    #[must_use]
    pub fn loading(&self) -> bool {
        *self.changes.borrow() == AuthSnapshot::Pending
    }

    /// Current access decision.
    #[must_use]
    pub fn access(&self) -> AdminAccess {
        access_for(&self.changes.borrow())
    }

    /// Wait for the provider's first report, then return the decision.
    ///
    /// A provider that goes away before reporting counts as signed out.
    pub async fn resolved(&mut self) -> AdminAccess {
        match self
            .changes
            .wait_for(|snapshot| *snapshot != AuthSnapshot::Pending)
            .await
        {
            Ok(snapshot) => access_for(&snapshot),
            Err(_) => AdminAccess::Unauthenticated,
        }
    }
}

fn access_for(snapshot: &AuthSnapshot) -> AdminAccess {
    match snapshot {
        AuthSnapshot::Pending => AdminAccess::Unknown,
        AuthSnapshot::Resolved(Some(user)) => AdminAccess::Authenticated(user.clone()),
        AuthSnapshot::Resolved(None) => AdminAccess::Unauthenticated,
    }
}
