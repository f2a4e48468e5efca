//! Integration tests for a file store backed by sqlite

use common::prelude::*;
use service::{Config, ServiceState, StateSetupError};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

fn config(temp: &TempDir) -> Config {
    Config {
        sqlite_path: Some(temp.path().join("db.sqlite")),
        ..Config::new(temp.path().join("blobs"))
    }
}

async fn put(store: &FileStore<service::Database>, request: UploadRequest, data: &[u8]) -> NewVersion {
    let mut upload = store.begin_upload().await.unwrap();
    upload.write(data).await.unwrap();
    let staged = upload.finish().await.unwrap();
    store.commit_upload(staged, request).await.unwrap()
}

#[tokio::test]
async fn test_state_survives_restart() {
    let temp = TempDir::new().unwrap();

    let secret = {
        let state = ServiceState::from_config(&config(&temp)).await.unwrap();
        let request = UploadRequest {
            protect: true,
            ..UploadRequest::new("/reports/q1.csv")
        };
        let new = put(state.store(), request, b"a,b,c").await;
        put(
            state.store(),
            UploadRequest {
                secret: new.secret.clone(),
                ..UploadRequest::new("/reports/q1.csv")
            },
            b"a,b,c,d",
        )
        .await;
        new.secret.unwrap()
    };

    let state = ServiceState::from_config(&config(&temp)).await.unwrap();
    let store = state.store();

    let mut download = store
        .read_latest("/reports/q1.csv", &DescriptorQuery::latest())
        .await
        .unwrap();
    let mut data = Vec::new();
    download.reader.read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"a,b,c,d");
    assert_eq!(download.descriptor.version, 2);
    assert_eq!(download.descriptor.content.mime_type, "text/csv");
    assert!(download.descriptor.is_protected());

    // protection persisted with the path
    let denied = {
        let mut upload = store.begin_upload().await.unwrap();
        upload.write(b"x").await.unwrap();
        let staged = upload.finish().await.unwrap();
        store
            .commit_upload(staged, UploadRequest::new("/reports/q1.csv"))
            .await
    };
    assert!(matches!(denied, Err(StoreError::Unauthorized(_))));

    let allowed = put(
        store,
        UploadRequest {
            secret: Some(secret),
            ..UploadRequest::new("/reports/q1.csv")
        },
        b"x",
    )
    .await;
    assert_eq!(allowed.descriptor.version, 3);

    let root = store.list_children("/", 10, 0).await.unwrap();
    assert_eq!(root, vec![TreeNode::new("/", "reports", NodeKind::Interior)]);
}

#[tokio::test]
async fn test_concurrent_writes_with_sqlite() {
    let temp = TempDir::new().unwrap();
    let state = ServiceState::from_config(&config(&temp)).await.unwrap();
    let mut handles = Vec::new();

    for i in 0..6u8 {
        let store = state.store().clone();
        handles.push(tokio::spawn(async move {
            put(&store, UploadRequest::new("/shared/log"), &[i]).await.descriptor.version
        }));
    }

    let mut versions = Vec::new();
    for handle in handles {
        versions.push(handle.await.unwrap());
    }
    versions.sort_unstable();
    assert_eq!(versions, (1..=6).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_links_and_downloads_in_memory_db() {
    let temp = TempDir::new().unwrap();
    let state = ServiceState::from_config(&Config::new(temp.path().join("blobs")))
        .await
        .unwrap();
    let store = state.store();

    put(store, UploadRequest::new("/builds/42.tar"), b"tarball").await;
    store
        .create_link(LinkRequest {
            link_path: "/builds/latest.tar".into(),
            target_path: "/builds/42.tar".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    store
        .read_latest("/builds/latest.tar", &DescriptorQuery::latest())
        .await
        .unwrap();
    let stat = store
        .stat("/builds/latest.tar", &DescriptorQuery::latest())
        .await
        .unwrap();
    assert_eq!(stat.downloads, 1);
    assert_eq!(stat.content.size, 7);

    let target = store
        .stat("/builds/42.tar", &DescriptorQuery::latest())
        .await
        .unwrap();
    assert_eq!(target.downloads, 0);
    assert_eq!(target.content.hash, stat.content.hash);
}

#[tokio::test]
async fn test_missing_database_directory() {
    let temp = TempDir::new().unwrap();
    let config = Config {
        sqlite_path: Some(temp.path().join("nope").join("db.sqlite")),
        ..Config::new(temp.path().join("blobs"))
    };
    let result = ServiceState::from_config(&config).await;
    assert!(matches!(result, Err(StateSetupError::DatabasePathDoesNotExist)));
}
