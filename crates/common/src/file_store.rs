use object_store::{BlobReader, BlobStore, StagedBlob, StagedUpload};
use serde::{Deserialize, Serialize};

use crate::access::Protection;
use crate::descriptor::{ContentFields, Descriptor, DescriptorQuery, NewVersion};
use crate::error::Result;
use crate::metadata::MetadataProvider;
use crate::mime_type::resolve_mime_type;
use crate::path::{clean_label, FilePath};
use crate::tree::TreeNode;
use crate::versions::DescriptorStore;

/// What to do with a finished upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    pub path: String,
    pub tag: Option<String>,
    pub display_name: Option<String>,
    pub mime_type: Option<String>,
    pub protect: bool,
    pub secret: Option<String>,
}

impl UploadRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkRequest {
    pub link_path: String,
    pub target_path: String,
    pub target_version: Option<u64>,
    pub protect: bool,
    pub secret: Option<String>,
}

/// A resolved descriptor and a reader over its content.
#[derive(Debug)]
pub struct Download {
    pub descriptor: Descriptor,
    pub reader: BlobReader,
}

/// Versioned, content-addressed file store.
///
/// Bytes live once in the [`BlobStore`] no matter how many paths or versions
/// refer to them. Everything else is metadata kept by the provider.
#[derive(Debug, Clone)]
pub struct FileStore<P: MetadataProvider> {
    blobs: BlobStore,
    versions: DescriptorStore<P>,
}

impl<P: MetadataProvider> FileStore<P> {
    pub fn new(blobs: BlobStore, provider: P) -> Self {
        Self {
            blobs,
            versions: DescriptorStore::new(provider),
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn versions(&self) -> &DescriptorStore<P> {
        &self.versions
    }

    /// Start a streamed upload.
    pub async fn begin_upload(&self) -> Result<StagedUpload> {
        Ok(self.blobs.begin_upload().await?)
    }

    /// Store a finished upload as the next version of `request.path`.
    ///
    /// The writer is authorized before the blob is placed. Whatever happens,
    /// the staged file does not outlive this call.
    pub async fn commit_upload(
        &self,
        staged: StagedBlob,
        request: UploadRequest,
    ) -> Result<NewVersion> {
        let path = FilePath::parse(&request.path)?;
        let protection = Protection::new(request.protect, request.secret.as_deref());
        self.versions.check_write(&path, protection).await?;

        let tag = request.tag.as_deref().and_then(clean_label);
        let display_name = request.display_name.as_deref().and_then(clean_label);
        let mime_type = resolve_mime_type(
            request.mime_type.as_deref(),
            display_name.as_deref(),
            &path,
        )?;
        let content = ContentFields::from_digests(staged.digests(), mime_type, display_name);

        self.blobs.commit(staged).await?;
        self.versions.append(&path, content, tag, protection).await
    }

    /// Resolve a descriptor and open its content, counting the download.
    pub async fn read_latest(&self, path: &str, query: &DescriptorQuery) -> Result<Download> {
        let descriptor = self.stat(path, query).await?;
        let reader = self.blobs.open(&descriptor.content.hash).await?;
        self.versions.record_download(descriptor.id).await;
        Ok(Download { descriptor, reader })
    }

    /// Resolve a descriptor without opening its content.
    pub async fn stat(&self, path: &str, query: &DescriptorQuery) -> Result<Descriptor> {
        let path = FilePath::parse(path)?;
        self.versions.find_latest(&path, query).await
    }

    pub async fn read_history(&self, path: &str, limit: u32, offset: u32) -> Result<Vec<Descriptor>> {
        let path = FilePath::parse(path)?;
        self.versions.history(&path, limit, offset).await
    }

    pub async fn list_children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeNode>> {
        self.versions
            .tree()
            .list_children(namespace, limit, offset)
            .await
    }

    pub async fn create_link(&self, request: LinkRequest) -> Result<NewVersion> {
        let link_path = FilePath::parse(&request.link_path)?;
        let target_path = FilePath::parse(&request.target_path)?;
        let protection = Protection::new(request.protect, request.secret.as_deref());
        self.versions
            .create_link(&link_path, &target_path, request.target_version, protection)
            .await
    }
}
