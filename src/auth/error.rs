use thiserror::Error;

/// Errors raised by the login manager and two-factor handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed login: {0}")]
    FailedLogin(String),

    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("Two-factor authentication failed: {0}")]
    TwoFactorFailed(String),

    #[error("No two-factor method at index {0}")]
    UnknownStrategy(usize),

    #[error("Response missing '{0}'")]
    MissingField(&'static str),

    #[error("API error (HTTP {code}): {message}")]
    ApiError { code: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
