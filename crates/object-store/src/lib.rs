//! Filesystem Blob Store
//!
//! This crate provides the content-addressed half of the file store: blobs are
//! immutable byte sequences on disk, identified solely by the SHA-256 hash of
//! their content.
//!
//! # Features
//!
//! - Content-addressed storage using SHA-256 hashes
//! - Deduplicated placement: the same content is only ever stored once
//! - Race-safe, no-clobber promotion of fully written uploads
//! - Streaming MD5 / SHA-1 / SHA-256 digests computed while an upload is written
//!
//! # Layout
//!
//! Like git, the first 2 characters of the hash name a bucket directory inside
//! the storage root, and the remainder of the hash names the file:
//!
//! ```text
//! <root>/2c/f24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
//! <root>/temp/upload-XXXXXX   (in-flight uploads)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use raziel_object_store::BlobStore;
//!
//! # async fn example() -> Result<(), raziel_object_store::BlobStoreError> {
//! let store = BlobStore::open_or_create("/tmp/blobs").await?;
//!
//! let mut upload = store.begin_upload().await?;
//! upload.write(b"hello world").await?;
//! let staged = upload.finish().await?;
//! let hash = staged.hash();
//!
//! store.commit(staged).await?;
//! let blob = store.open(&hash).await?;
//! assert_eq!(blob.size(), 11);
//! # Ok(())
//! # }
//! ```

mod digest;
mod error;
mod hash;
mod storage;
mod store;
mod upload;

pub use digest::{UploadDigest, UploadDigests};
pub use error::{BlobStoreError, Result};
pub use hash::{ContentHash, HASH_SIZE, PREFIX_LEN};
pub use store::{BlobReader, BlobStore, TEMP_DIR_NAME};
pub use upload::{StagedBlob, StagedUpload};
