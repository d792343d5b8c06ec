//! Session states, credentials and error definitions.

use std::time::Duration;

use thiserror::Error;

use crate::wallet::WalletError;

/// Lifecycle of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Launching,
    Authenticating,
    Ready,
    /// Terminal: the handshake failed and the browser has been released.
    AuthFailed,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Launching => "launching",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::AuthFailed => "auth_failed",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials captured by a successful handshake.
#[derive(Clone)]
pub struct Session {
    pub user_id: String,
    auth_token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Bearer token for GraphQL calls.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.auth_token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Errors raised by the browser session and the operations built on it.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// Browser could not be started or configured.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation timed out after {}s", .0.as_secs())]
    NavigationTimeout(Duration),

    #[error("No CSRF token returned by the auth endpoint")]
    MissingCsrfToken,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network or driver failure during an in-page request.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Session is not authenticated")]
    NotAuthenticated,

    #[error("Operation not allowed in state {0}")]
    InvalidState(SessionState),
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::InvalidKey(msg) => SessionError::InvalidKey(msg),
            WalletError::Signing(msg) => SessionError::Signing(msg),
            WalletError::KeySource(e) => SessionError::InvalidKey(e.to_string()),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
