//! Client error types.
//!
//! Every operation on the auth API surfaces one of these variants; the
//! session controller turns them into the single message it exposes to
//! callers via [`std::fmt::Display`].

/// Error type for all auth API and session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Server reported a field-level validation problem (HTTP 400/422).
    /// The message is the first server-reported field error verbatim.
    #[error("{0}")]
    Validation(String),

    /// Email or username already taken (HTTP 409). Carries the server's
    /// literal error string.
    #[error("{0}")]
    Conflict(String),

    /// Invalid credentials or denied authorization (HTTP 401/403), after
    /// the single transparent refresh attempt has been spent.
    #[error("{0}")]
    Auth(String),

    /// Transport-level failure or undecodable response body. Never retried.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The refresh attempt itself failed; local tokens have been cleared
    /// and the caller must send the user back to sign-in.
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// Any other non-success response.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Token storage or configuration failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
