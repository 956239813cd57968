//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;

/// Fallback shown when a failure has no dedicated message.
pub const FALLBACK_MESSAGE: &str = "Erro ao fazer login. Tente novamente";

/// Errors that can occur while signing an admin in or out.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] configurator_core::EmailError),

    /// The account exists but has been disabled.
    #[error("user disabled")]
    UserDisabled,

    /// No account is registered under the email.
    #[error("user not found")]
    UserNotFound,

    /// The password does not match the stored hash.
    #[error("wrong password")]
    WrongPassword,

    /// The stored credential could not be checked.
    #[error("invalid credential")]
    InvalidCredential,

    /// Too many attempts for this email in a short period.
    #[error("too many requests")]
    TooManyRequests,

    /// The admin directory could not be reached.
    #[error("directory unavailable: {0}")]
    Directory(#[from] StoreError),

    /// The browser session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Stable error code, in the `kebab-case` form identity providers use.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "invalid-email",
            Self::UserDisabled => "user-disabled",
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidCredential => "invalid-credential",
            Self::TooManyRequests => "too-many-requests",
            Self::Directory(_) => "network-request-failed",
            Self::Session(_) => "session-unavailable",
            Self::PasswordHash => "internal-error",
        }
    }

    /// Portuguese message shown on the login form.
    #[must_use]
    pub fn localized_message(&self) -> &'static str {
        message_for_code(self.code())
    }

    /// Whether the failure is on our side rather than the user's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Session(_) | Self::PasswordHash)
    }
}

/// Map a provider error code to its Portuguese message.
#[must_use]
pub fn message_for_code(code: &str) -> &'static str {
    match code {
        "invalid-email" => "Email inválido",
        "user-disabled" => "Usuário desabilitado",
        "user-not-found" => "Usuário não encontrado",
        "wrong-password" => "Senha incorreta",
        "invalid-credential" => "Email ou senha incorretos",
        "too-many-requests" => "Muitas tentativas. Tente novamente mais tarde",
        "network-request-failed" => "Erro de conexão. Verifique sua internet",
        _ => FALLBACK_MESSAGE,
    }
}
