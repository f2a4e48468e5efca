//! File descriptors: one immutable record per version of a path.

use chrono::{DateTime, Utc};
use object_store::{ContentHash, UploadDigests};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::ProtectionDigest;
use crate::path::FilePath;

/// The content a descriptor points at.
///
/// A link copies these fields verbatim from its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFields {
    pub hash: ContentHash,
    pub md5: String,
    pub sha1: String,
    pub size: u64,
    pub mime_type: String,
    pub display_name: Option<String>,
}

impl ContentFields {
    pub fn from_digests(
        digests: &UploadDigests,
        mime_type: String,
        display_name: Option<String>,
    ) -> Self {
        Self {
            hash: digests.sha256,
            md5: digests.md5.clone(),
            sha1: digests.sha1.clone(),
            size: digests.size,
            mime_type,
            display_name,
        }
    }
}

/// Metadata for one version of a path.
///
/// Only the download bookkeeping (`downloads`, `last_download`) ever changes
/// after a descriptor is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: Uuid,
    pub path: FilePath,
    pub namespace: String,
    /// Starts at 1 and increases by one per write to the path
    pub version: u64,
    pub tag: Option<String>,
    #[serde(flatten)]
    pub content: ContentFields,
    pub downloads: u64,
    pub last_download: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Never serialized, so it cannot leak through listings
    #[serde(skip)]
    pub protection: Option<ProtectionDigest>,
}

impl Descriptor {
    /// First version of a new path.
    pub fn initial(
        path: FilePath,
        content: ContentFields,
        tag: Option<String>,
        protection: Option<ProtectionDigest>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace: path.namespace().to_string(),
            path,
            version: 1,
            tag,
            content,
            downloads: 0,
            last_download: None,
            created_at: Utc::now(),
            protection,
        }
    }

    /// The version after this one. Protection is inherited.
    pub fn next(&self, content: ContentFields, tag: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: self.path.clone(),
            namespace: self.namespace.clone(),
            version: self.version + 1,
            tag,
            content,
            downloads: 0,
            last_download: None,
            created_at: Utc::now(),
            protection: self.protection.clone(),
        }
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }
}

/// Filters applied when resolving a descriptor for a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorQuery {
    pub version: Option<u64>,
    pub tag: Option<String>,
}

impl DescriptorQuery {
    /// The newest version regardless of tag.
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn version(version: u64) -> Self {
        Self {
            version: Some(version),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            version: None,
            tag: Some(tag.into()),
        }
    }

    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        self.version.map_or(true, |v| v == descriptor.version)
            && self
                .tag
                .as_deref()
                .map_or(true, |t| descriptor.tag.as_deref() == Some(t))
    }
}

/// Result of a write that produced a new descriptor.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub descriptor: Descriptor,
    /// Secret generated for a newly protected path. Shown to the writer once.
    pub secret: Option<String>,
}
