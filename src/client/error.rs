//! Errors raised by the HTTP client.

use thiserror::Error;

use crate::client::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No session is stored, so no Bearer credential can be attached.
    #[error("Not authenticated - please log in first")]
    NotAuthenticated,

    /// The server rejected the credential. The stored session has been cleared.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The server answered with an error status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The server answered with a success status other than the one the
    /// endpoint contract promises.
    #[error("Unexpected response status {actual} (expected {expected})")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("Failed to reach the API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from the API: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Builds the error for a non-success response.
    ///
    /// The server's structured `error.message` wins; otherwise a generic text
    /// for the status class is used.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|response| response.error.message)
            .unwrap_or_else(|_| generic_message(status).to_string());

        if status == 401 {
            ClientError::Unauthorized { message }
        } else {
            ClientError::Api { status, message }
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::UnexpectedStatus { actual, .. } => Some(*actual),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "The request was rejected by the server",
        401 => "Authentication expired or invalid. Please log in again.",
        403 => "Access denied",
        404 => "Resource not found",
        429 => "Too many requests, try again later",
        500..=599 => "The server encountered an error",
        _ => "Something went wrong",
    }
}
