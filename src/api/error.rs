//! Client error types

use thiserror::Error;

/// Shown when the backend gives no message of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered 2xx but with `success: false`
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Session cookie missing or expired
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error reported by the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Message for the user: the backend's own text when it sent one, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(m) | Self::Forbidden(m) | Self::NotFound(m) | Self::Validation(m) if !m.trim().is_empty() => m.clone(),
            Self::Unauthorized => "Please sign in to continue.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
