//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed identity token: {0}")]
    MalformedToken(String),

    #[error("Malformed token response: {0}")]
    MalformedResponse(String),

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Failed to persist session: {0}")]
    Persistence(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Not implemented")]
    NotImplemented,

    #[error("A login flow is already in progress")]
    FlowAlreadyInProgress,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Unrecognized redirect: {0}")]
    UnrecognizedRedirect(String),

    #[error("Authorization flow timed out")]
    FlowTimeout,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Browser surface error: {0}")]
    Surface(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<AuthError> for String {
    fn from(err: AuthError) -> String {
        err.to_string()
    }
}
