//! Error types for WealthWise

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected credentials or session, message is shown to the user as-is
    #[error("{0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Busy: {0}")]
    Busy(String),
}

impl Error {
    /// Whether this error came from the transport rather than the remote
    /// service answering. Only these trigger a local fallback.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
