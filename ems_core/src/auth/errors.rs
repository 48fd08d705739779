//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Access token could not be parsed into the expected claims
    #[error("Malformed access token: {0}")]
    MalformedToken(#[from] jsonwebtoken::errors::Error),

    /// Reading or writing persisted session state failed
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Persisted session state could not be (de)serialized
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Get a user-facing message that doesn't echo token contents or paths.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::MalformedToken(_) => "Received an invalid session token".to_string(),
            AuthError::Storage(_) | AuthError::Serialization(_) => {
                "Could not persist the session".to_string()
            }
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
