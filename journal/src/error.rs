//! Error types for the journal
//!
//! All errors use thiserror for structured error handling.
//! None of them are fatal: callers log them or show them to the user.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Subscription to the remote store failed or was cancelled
    #[error("Remote read failed: {0}")]
    RemoteRead(String),

    /// Commit or delete was rejected by the remote store
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    /// An uploaded file could not be decoded as an image
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Invalid date key: {0}")]
    InvalidDateKey(String),

    #[error("No entry is open in the editor")]
    EditorClosed,

    #[error("Nothing to save: both sides are empty")]
    NothingToSave,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
