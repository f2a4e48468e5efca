//! Shared test utilities for file store integration tests
#![allow(dead_code)]

use ::common::prelude::*;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

/// Set up a test environment with an empty store backed by memory metadata
pub async fn setup_test_env() -> (FileStore<MemoryMetadataProvider>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let blobs = BlobStore::open_or_create(temp_dir.path().join("blobs"))
        .await
        .unwrap();
    let store = FileStore::new(blobs, MemoryMetadataProvider::new());
    (store, temp_dir)
}

/// Stage `data` as a finished upload
pub async fn stage<P: MetadataProvider>(store: &FileStore<P>, data: &[u8]) -> StagedBlob {
    let mut upload = store.begin_upload().await.unwrap();
    upload.write(data).await.unwrap();
    upload.finish().await.unwrap()
}

/// Upload `data` to `path` with no extra attributes
pub async fn put<P: MetadataProvider>(store: &FileStore<P>, path: &str, data: &[u8]) -> Descriptor {
    put_with(store, data, UploadRequest::new(path))
        .await
        .unwrap()
        .descriptor
}

pub async fn put_with<P: MetadataProvider>(
    store: &FileStore<P>,
    data: &[u8],
    request: UploadRequest,
) -> ::common::error::Result<NewVersion> {
    let staged = stage(store, data).await;
    store.commit_upload(staged, request).await
}

/// Read the newest matching content of `path` to the end
pub async fn read<P: MetadataProvider>(
    store: &FileStore<P>,
    path: &str,
    query: &DescriptorQuery,
) -> (Descriptor, Vec<u8>) {
    let mut download = store.read_latest(path, query).await.unwrap();
    let mut data = Vec::new();
    download.reader.read_to_end(&mut data).await.unwrap();
    (download.descriptor, data)
}

/// Number of files left in the blob store's temp directory
pub fn temp_files<P: MetadataProvider>(store: &FileStore<P>) -> usize {
    std::fs::read_dir(store.blobs().temp_dir()).unwrap().count()
}
