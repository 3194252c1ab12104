//! Error types for rpcbridge core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid JSON-RPC message: {0}")]
    InvalidMessage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
