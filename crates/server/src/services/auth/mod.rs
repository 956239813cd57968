//! Admin authentication.
//!
//! Sign-in is email and password against the [`AdminDirectory`]. The signed-in
//! admin is kept in the browser session. Pages learn about it through
//! [`IdentityProvider::subscribe`], which starts out [`AuthSnapshot::Pending`]
//! and resolves once the session has been read.

mod controller;
mod error;

pub use controller::{AdminAccess, AuthController};
pub use error::{AuthError, FALLBACK_MESSAGE, message_for_code};

use std::num::NonZeroU32;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use configurator_core::Email;

use crate::db::AdminDirectory;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{SessionUser, session_keys};

/// Sign-in attempts allowed per email per minute.
const ATTEMPTS_PER_MINUTE: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Emails tracked before idle entries are dropped.
const MAX_TRACKED_EMAILS: usize = 10_000;

/// Session state as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSnapshot {
    /// The provider has not reported yet.
    Pending,
    /// The provider has reported; `None` means signed out.
    Resolved(Option<SessionUser>),
}

/// Source of the signed-in admin.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a signed-in session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Receive every session change, starting with the current state.
    fn subscribe(&self) -> watch::Receiver<AuthSnapshot>;
}

/// Per-email limit on sign-in attempts.
///
/// Once more than `max_tracked` emails are known, entries whose limit has
/// fully replenished are dropped.
pub struct LoginThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
    max_tracked: usize,
}

impl LoginThrottle {
    /// Allow `per_minute` attempts per email.
    #[must_use]
    pub fn new(per_minute: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(per_minute), MAX_TRACKED_EMAILS)
    }

    fn with_quota(quota: Quota, max_tracked: usize) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            max_tracked,
        }
    }

    /// Record an attempt for `email`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TooManyRequests` once the limit is spent.
    pub fn check(&self, email: &Email) -> Result<(), AuthError> {
        let result = self
            .limiter
            .check_key(&email.as_str().to_owned())
            .map_err(|_| AuthError::TooManyRequests);

        if self.limiter.len() > self.max_tracked {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            debug!(tracked = self.limiter.len(), "Pruned login throttle");
        }

        result
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.limiter.len()
    }
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(ATTEMPTS_PER_MINUTE)
    }
}

/// Identity provider backed by the browser's session cookie.
pub struct SessionIdentity {
    session: Session,
    directory: Arc<dyn AdminDirectory>,
    throttle: Arc<LoginThrottle>,
    snapshot: Arc<watch::Sender<AuthSnapshot>>,
}

impl SessionIdentity {
    /// Attach to `session` and start reading the stored admin.
    ///
    /// Subscribers see [`AuthSnapshot::Pending`] until the read finishes.
    #[must_use]
    pub fn new(
        session: Session,
        directory: Arc<dyn AdminDirectory>,
        throttle: Arc<LoginThrottle>,
    ) -> Self {
        let (sender, _) = watch::channel(AuthSnapshot::Pending);
        let snapshot = Arc::new(sender);

        let restore = session.clone();
        let publisher = Arc::clone(&snapshot);
        tokio::spawn(async move {
            let user = match restore.get::<SessionUser>(session_keys::CURRENT_ADMIN).await {
                Ok(user) => user,
                Err(e) => {
                    warn!(error = %e, "Failed to read admin from session");
                    None
                }
            };
            publisher.send_if_modified(|current| {
                if *current == AuthSnapshot::Pending {
                    *current = AuthSnapshot::Resolved(user);
                    true
                } else {
                    false
                }
            });
        });

        Self {
            session,
            directory,
            throttle,
            snapshot,
        }
    }

    fn publish(&self, user: Option<SessionUser>) {
        self.snapshot.send_replace(AuthSnapshot::Resolved(user));
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let email = Email::parse(email)?;
        self.throttle.check(&email)?;

        let admin = self
            .directory
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if admin.disabled {
            return Err(AuthError::UserDisabled);
        }

        verify_password(password, admin.password_hash.expose_secret())?;

        let user = SessionUser {
            subject: admin.subject,
            email: admin.email,
        };

        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::CURRENT_ADMIN, &user)
            .await?;

        set_sentry_user(&user.subject, Some(user.email.as_str()));
        info!(subject = %user.subject, "Admin signed in");
        self.publish(Some(user.clone()));

        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session
            .remove::<SessionUser>(session_keys::CURRENT_ADMIN)
            .await?;

        clear_sentry_user();
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot.subscribe()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash a password with Argon2 for storage.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored Argon2 PHC string.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredential` if the stored hash is unreadable
/// and `AuthError::WrongPassword` if the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredential)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::WrongPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::db::{AdminCredential, MemoryAdminDirectory};

    const PASSWORD: &str = "correct horse battery";

    fn directory() -> Arc<dyn AdminDirectory> {
        let hash = hash_password(PASSWORD).unwrap();
        Arc::new(
            MemoryAdminDirectory::empty()
                .with_admin(AdminCredential {
                    subject: "admin-1".to_owned(),
                    email: Email::parse("admin@example.com").unwrap(),
                    password_hash: SecretString::from(hash.clone()),
                    disabled: false,
                })
                .with_admin(AdminCredential {
                    subject: "admin-2".to_owned(),
                    email: Email::parse("former@example.com").unwrap(),
                    password_hash: SecretString::from(hash),
                    disabled: true,
                }),
        )
    }

    fn identity(session: Session) -> SessionIdentity {
        SessionIdentity::new(session, directory(), Arc::new(LoginThrottle::default()))
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password(PASSWORD).unwrap();
        assert!(verify_password(PASSWORD, &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            verify_password(PASSWORD, "not-a-hash"),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_stores_user_and_publishes() {
        let session = session();
        let identity = identity(session.clone());
        let mut changes = identity.subscribe();

        let user = identity.sign_in("Admin@Example.com", PASSWORD).await.unwrap();
        assert_eq!(user.subject, "admin-1");

        changes
            .wait_for(|s| *s == AuthSnapshot::Resolved(Some(user.clone())))
            .await
            .unwrap();

        let stored: Option<SessionUser> = session.get(session_keys::CURRENT_ADMIN).await.unwrap();
        assert_eq!(stored, Some(user));
    }

    #[tokio::test]
    async fn test_sign_in_failures_map_to_codes() {
        let identity = identity(session());

        let err = identity.sign_in("not-an-email", PASSWORD).await.unwrap_err();
        assert_eq!(err.code(), "invalid-email");

        let err = identity.sign_in("nobody@example.com", PASSWORD).await.unwrap_err();
        assert_eq!(err.code(), "user-not-found");

        let err = identity.sign_in("admin@example.com", "nope").await.unwrap_err();
        assert_eq!(err.localized_message(), "Senha incorreta");

        let err = identity.sign_in("former@example.com", PASSWORD).await.unwrap_err();
        assert_eq!(err.code(), "user-disabled");
    }

    #[tokio::test]
    async fn test_repeated_attempts_are_throttled() {
        let identity = identity(session());
        for _ in 0..5 {
            let err = identity.sign_in("admin@example.com", "nope").await.unwrap_err();
            assert!(matches!(err, AuthError::WrongPassword));
        }

        let err = identity.sign_in("admin@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::TooManyRequests));
    }

    #[test]
    fn test_throttle_drops_idle_emails() {
        let quota = Quota::with_period(std::time::Duration::from_nanos(1)).unwrap();
        let throttle = LoginThrottle::with_quota(quota, 100);

        for n in 0..1000 {
            let email = Email::parse(&format!("user{n}@example.com")).unwrap();
            throttle.check(&email).unwrap();
            assert!(throttle.tracked() <= 100);
        }
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let session = session();
        let identity = identity(session.clone());
        identity.sign_in("admin@example.com", PASSWORD).await.unwrap();

        identity.sign_out().await.unwrap();

        assert_eq!(*identity.subscribe().borrow(), AuthSnapshot::Resolved(None));
        let stored: Option<SessionUser> = session.get(session_keys::CURRENT_ADMIN).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_existing_session_resolves_to_user() {
        let session = session();
        let user = SessionUser {
            subject: "admin-1".to_owned(),
            email: Email::parse("admin@example.com").unwrap(),
        };
        session.insert(session_keys::CURRENT_ADMIN, &user).await.unwrap();

        let identity = identity(session);
        let mut changes = identity.subscribe();
        let snapshot = changes
            .wait_for(|s| *s != AuthSnapshot::Pending)
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot, AuthSnapshot::Resolved(Some(user)));
    }
}
