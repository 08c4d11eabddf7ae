//! Error types for the data layer.

use thiserror::Error;

/// Errors surfaced by the catalog and the club store.
#[derive(Debug, Error)]
pub enum DataError {
    /// A member or role lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// `add_member` would collide on an existing id.
    #[error("duplicate member id: {0}")]
    DuplicateId(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted file did not decode; the caller must not silently reset.
    #[error("corrupt state in {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
