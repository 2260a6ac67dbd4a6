//! Error types for the API client.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the workforce API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credential missing, or the token exchange was rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Non-2xx response after the allowed retries.
    #[error("request to {path} failed with status {status}: {body}")]
    RemoteRequest {
        path: String,
        status: u16,
        body: String,
    },

    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RemoteRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the server rejected the request's token.
    pub fn is_auth_rejection(&self) -> bool {
        self.status() == Some(401)
    }
}
