use object_store::BlobStoreError;

use crate::metadata::MetadataError;
use crate::path::PathError;

/// Errors surfaced by the file store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No descriptor, blob or tree node matched the request
    #[error("not found: {0}")]
    NotFound(String),
    /// The path is protected and the presented secret did not match
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A competing write or a file/directory clash on the path
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("blob store error: {0}")]
    Blob(#[source] BlobStoreError),
    #[error("metadata provider error: {0}")]
    Metadata(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to generate secret: {0}")]
    Entropy(getrandom::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True for failures of the underlying storage rather than of the request.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            StoreError::Blob(_) | StoreError::Metadata(_) | StoreError::Entropy(_)
        )
    }
}

impl From<BlobStoreError> for StoreError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotFound(hash) => StoreError::NotFound(format!("blob {hash}")),
            other => StoreError::Blob(other),
        }
    }
}

impl From<PathError> for StoreError {
    fn from(err: PathError) -> Self {
        StoreError::InvalidInput(err.to_string())
    }
}

impl<T> From<MetadataError<T>> for StoreError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: MetadataError<T>) -> Self {
        match err {
            MetadataError::Provider(e) => StoreError::Metadata(Box::new(e)),
            conflict @ MetadataError::VersionTaken(..) => StoreError::Conflict(conflict.to_string()),
        }
    }
}
