//! Error types for upstream forwarding

use thiserror::Error;

/// Anything that stops a request from reaching the upstream or its body from
/// coming back. Callers treat every variant the same way.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
