//! Error types for viewsync-rs.

use thiserror::Error;

/// The main error type for viewsync-rs operations.
#[derive(Error, Debug)]
pub enum ViewsyncError {
    /// An HTTP fetch failed, either with a non-2xx status or a transport error.
    #[error("fetch of '{url}' failed: {detail}")]
    Fetch { url: String, detail: String },

    /// No recognizable structure was found in a pose or intrinsics payload.
    #[error("unrecognized format: {0}")]
    Format(String),

    /// A viewer with the given name is already registered with the hub.
    #[error("viewer '{0}' already exists")]
    ViewerExists(String),

    /// No viewer with the given name is registered with the hub.
    #[error("viewer '{0}' not found")]
    ViewerNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for viewsync-rs operations.
pub type Result<T> = std::result::Result<T, ViewsyncError>;
