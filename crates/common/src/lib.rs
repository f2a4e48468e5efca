/**
 * Write protection for paths.
 *  - Secret digests and constant time checks
 *  - Secret generation
 */
pub mod access;
/**
 * Per-version file metadata and the filters
 *  used to resolve it.
 */
pub mod descriptor;
pub mod error;
/**
 * The store as callers see it: uploads, reads,
 *  history, listings and links on top of the
 *  blob store and a metadata provider.
 */
pub mod file_store;
pub mod link;
pub mod locks;
/**
 * Storage backend for descriptors and tree nodes.
 *  Anything implementing the provider trait can
 *  back a store; an in-memory one is included.
 */
pub mod metadata;
pub mod mime_type;
pub mod path;
/**
 * Directory-like index of every path ever
 *  written, used for listings.
 */
pub mod tree;
/**
 * Version chains: numbering, protection and
 *  download bookkeeping.
 */
pub mod versions;

pub mod prelude {
    pub use crate::access::{Protection, ProtectionDigest};
    pub use crate::descriptor::{ContentFields, Descriptor, DescriptorQuery, NewVersion};
    pub use crate::error::StoreError;
    pub use crate::file_store::{Download, FileStore, LinkRequest, UploadRequest};
    pub use crate::metadata::{MemoryMetadataProvider, MetadataError, MetadataProvider};
    pub use crate::path::{clean_label, FilePath};
    pub use crate::tree::{NodeKind, TreeNode};
    pub use crate::versions::DescriptorStore;
    pub use object_store::{BlobReader, BlobStore, ContentHash, StagedBlob, StagedUpload};
}
