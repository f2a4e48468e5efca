//! Incremental digests computed while an upload streams in.

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::hash::ContentHash;

/// Running digest state for a single upload.
///
/// MD5 and SHA-1 are carried as descriptive metadata for clients that still
/// identify files by them. Only the SHA-256 value addresses the blob.
#[derive(Clone, Default)]
pub struct UploadDigest {
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
    size: u64,
}

impl UploadDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of the upload, in order.
    pub fn update(&mut self, chunk: &[u8]) {
        self.md5.update(chunk);
        self.sha1.update(chunk);
        self.sha256.update(chunk);
        self.size += chunk.len() as u64;
    }

    /// Bytes fed so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn finalize(self) -> UploadDigests {
        UploadDigests {
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: ContentHash::from_bytes(self.sha256.finalize().into()),
            size: self.size,
        }
    }
}

impl std::fmt::Debug for UploadDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadDigest")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Finalized digests of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDigests {
    pub md5: String,
    pub sha1: String,
    pub sha256: ContentHash,
    pub size: u64,
}
