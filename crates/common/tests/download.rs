//! Integration tests for reads, stat and download bookkeeping

mod common;

use ::common::prelude::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_read_counts_downloads() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/file", b"content").await;

    let (first, _) = common::read(&store, "/file", &DescriptorQuery::latest()).await;
    assert_eq!(first.downloads, 0);
    common::read(&store, "/file", &DescriptorQuery::latest()).await;

    let stat = store.stat("/file", &DescriptorQuery::latest()).await.unwrap();
    assert_eq!(stat.downloads, 2);
    assert!(stat.last_download.is_some());
}

#[tokio::test]
async fn test_stat_does_not_count() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/file", b"content").await;

    store.stat("/file", &DescriptorQuery::latest()).await.unwrap();
    let stat = store.stat("/file", &DescriptorQuery::latest()).await.unwrap();
    assert_eq!(stat.downloads, 0);
    assert!(stat.last_download.is_none());
}

#[tokio::test]
async fn test_read_by_tag() {
    let (store, _temp) = common::setup_test_env().await;
    let tagged = UploadRequest {
        tag: Some("stable".into()),
        ..UploadRequest::new("/app")
    };
    common::put_with(&store, b"old stable", tagged).await.unwrap();
    common::put(&store, "/app", b"nightly").await;

    let (d, data) = common::read(&store, "/app", &DescriptorQuery::tag("stable")).await;
    assert_eq!(d.version, 1);
    assert_eq!(data, b"old stable");

    let (d, data) = common::read(&store, "/app", &DescriptorQuery::latest()).await;
    assert_eq!(d.version, 2);
    assert_eq!(data, b"nightly");
}

#[tokio::test]
async fn test_read_errors() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/file", b"content").await;

    let missing = store.read_latest("/nope", &DescriptorQuery::latest()).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    let no_version = store.read_latest("/file", &DescriptorQuery::version(7)).await;
    assert!(matches!(no_version, Err(StoreError::NotFound(_))));

    let no_tag = store.read_latest("/file", &DescriptorQuery::tag("x")).await;
    assert!(matches!(no_tag, Err(StoreError::NotFound(_))));

    let zero = store.read_latest("/file", &DescriptorQuery::version(0)).await;
    assert!(matches!(zero, Err(StoreError::InvalidInput(_))));

    let root = store.read_latest("/", &DescriptorQuery::latest()).await;
    assert!(matches!(root, Err(StoreError::InvalidInput(_))));
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let (store, _temp) = common::setup_test_env().await;
    let d = common::put(&store, "/file", b"content").await;

    std::fs::remove_file(store.blobs().location(&d.content.hash)).unwrap();
    let result = store.read_latest("/file", &DescriptorQuery::latest()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_history_pages() {
    let (store, _temp) = common::setup_test_env().await;
    for i in 0..5u8 {
        common::put(&store, "/h", &[i]).await;
    }

    let page = store.read_history("/h", 2, 0).await.unwrap();
    assert_eq!(page.iter().map(|d| d.version).collect::<Vec<_>>(), vec![5, 4]);

    let page = store.read_history("/h", 2, 4).await.unwrap();
    assert_eq!(page.iter().map(|d| d.version).collect::<Vec<_>>(), vec![1]);

    assert!(store.read_history("/none", 10, 0).await.unwrap().is_empty());
}

/// Memory provider whose download bookkeeping always fails
#[derive(Debug, Clone, Default)]
struct BrokenCounter {
    inner: MemoryMetadataProvider,
}

#[derive(Debug, thiserror::Error)]
#[error("counter unavailable")]
struct CounterError;

fn lift(
    err: MetadataError<::common::metadata::MemoryMetadataProviderError>,
) -> MetadataError<CounterError> {
    match err {
        MetadataError::Provider(_) => MetadataError::Provider(CounterError),
        MetadataError::VersionTaken(path, version) => MetadataError::VersionTaken(path, version),
    }
}

#[async_trait]
impl MetadataProvider for BrokenCounter {
    type Error = CounterError;

    async fn latest(
        &self,
        path: &FilePath,
        query: &DescriptorQuery,
    ) -> std::result::Result<Option<Descriptor>, MetadataError<CounterError>> {
        self.inner.latest(path, query).await.map_err(lift)
    }

    async fn history(
        &self,
        path: &FilePath,
        limit: u32,
        offset: u32,
    ) -> std::result::Result<Vec<Descriptor>, MetadataError<CounterError>> {
        self.inner.history(path, limit, offset).await.map_err(lift)
    }

    async fn insert(
        &self,
        descriptor: &Descriptor,
    ) -> std::result::Result<(), MetadataError<CounterError>> {
        self.inner.insert(descriptor).await.map_err(lift)
    }

    async fn record_download(
        &self,
        _id: Uuid,
        _at: DateTime<Utc>,
    ) -> std::result::Result<(), MetadataError<CounterError>> {
        Err(MetadataError::Provider(CounterError))
    }

    async fn tree_node(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<Option<TreeNode>, MetadataError<CounterError>> {
        self.inner.tree_node(namespace, name).await.map_err(lift)
    }

    async fn insert_tree_node(
        &self,
        node: &TreeNode,
    ) -> std::result::Result<Option<TreeNode>, MetadataError<CounterError>> {
        self.inner.insert_tree_node(node).await.map_err(lift)
    }

    async fn children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> std::result::Result<Vec<TreeNode>, MetadataError<CounterError>> {
        self.inner.children(namespace, limit, offset).await.map_err(lift)
    }
}

#[tokio::test]
async fn test_bookkeeping_failure_does_not_fail_read() {
    let temp = TempDir::new().unwrap();
    let blobs = BlobStore::open_or_create(temp.path().join("blobs"))
        .await
        .unwrap();
    let store = FileStore::new(blobs, BrokenCounter::default());

    common::put(&store, "/file", b"still readable").await;
    let (descriptor, data) = common::read(&store, "/file", &DescriptorQuery::latest()).await;

    assert_eq!(data, b"still readable");
    assert_eq!(descriptor.downloads, 0);
}
