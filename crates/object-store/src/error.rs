//! Error types for the blob store.

use std::path::PathBuf;

/// Errors that can occur when working with the blob store.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hash parse error
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// Blob not found
    #[error("blob not found: {0}")]
    NotFound(String),

    /// A storage directory path is occupied by something else
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A blob path is occupied by something other than a regular file
    #[error("path is not a file: {0}")]
    NotAFile(PathBuf),

    /// Moving a staged upload into its final location failed
    #[error("failed to place blob {hash}: {source}")]
    Placement {
        hash: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for blob store operations.
pub type Result<T> = std::result::Result<T, BlobStoreError>;
