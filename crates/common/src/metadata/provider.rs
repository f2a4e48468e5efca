use std::fmt::{Debug, Display};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::descriptor::{Descriptor, DescriptorQuery};
use crate::path::FilePath;
use crate::tree::TreeNode;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError<T> {
    #[error("unhandled metadata provider error: {0}")]
    Provider(#[from] T),
    /// A descriptor already holds this version of the path --
    ///  path, version
    #[error("version {1} of {0} already exists")]
    VersionTaken(String, u64),
}

/// Persistence for descriptors and tree nodes.
///
/// Implementations only store and query. Version numbering, protection and
/// tree shape are enforced by [`DescriptorStore`](crate::versions::DescriptorStore).
#[async_trait]
pub trait MetadataProvider: Send + Sync + Debug + Clone + 'static {
    type Error: std::error::Error + Display + Debug + Send + Sync + 'static;

    /// The highest version of `path` matching `query`
    async fn latest(
        &self,
        path: &FilePath,
        query: &DescriptorQuery,
    ) -> Result<Option<Descriptor>, MetadataError<Self::Error>>;

    /// Descriptors of `path`, newest first
    async fn history(
        &self,
        path: &FilePath,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Descriptor>, MetadataError<Self::Error>>;

    /// Store a new descriptor
    ///
    /// Must fail with `MetadataError::VersionTaken` if the path already has
    ///  a descriptor at this version.
    async fn insert(&self, descriptor: &Descriptor) -> Result<(), MetadataError<Self::Error>>;

    /// Bump the download counter of a descriptor and stamp its last download
    async fn record_download(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), MetadataError<Self::Error>>;

    async fn tree_node(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<TreeNode>, MetadataError<Self::Error>>;

    /// Insert a node unless one already exists under the same namespace and
    ///  name
    ///
    /// # Returns
    /// * `Ok(None)` - the node was inserted
    /// * `Ok(Some(existing))` - a node was already there and was left untouched
    async fn insert_tree_node(
        &self,
        node: &TreeNode,
    ) -> Result<Option<TreeNode>, MetadataError<Self::Error>>;

    /// Direct children of a namespace, ordered by name
    async fn children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeNode>, MetadataError<Self::Error>>;
}
