//! Integration tests for links between paths

mod common;

use ::common::prelude::*;

fn link(link_path: &str, target_path: &str) -> LinkRequest {
    LinkRequest {
        link_path: link_path.into(),
        target_path: target_path.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_link_reads_target_content() {
    let (store, _temp) = common::setup_test_env().await;
    let target = common::put(&store, "/releases/1.4.3.zip", b"release bytes").await;

    let new = store
        .create_link(link("/releases/latest.zip", "/releases/1.4.3.zip"))
        .await
        .unwrap();
    assert_eq!(new.descriptor.version, 1);
    assert_eq!(new.descriptor.content, target.content);

    let (d, data) = common::read(&store, "/releases/latest.zip", &DescriptorQuery::latest()).await;
    assert_eq!(d.path.as_str(), "/releases/latest.zip");
    assert_eq!(data, b"release bytes");

    // no bytes were copied
    assert_eq!(store.blobs().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_relinking_appends_versions() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/v1", b"one").await;
    common::put(&store, "/v2", b"two").await;

    store.create_link(link("/current", "/v1")).await.unwrap();
    let second = store.create_link(link("/current", "/v2")).await.unwrap();
    assert_eq!(second.descriptor.version, 2);

    let (_, data) = common::read(&store, "/current", &DescriptorQuery::latest()).await;
    assert_eq!(data, b"two");
    let (_, data) = common::read(&store, "/current", &DescriptorQuery::version(1)).await;
    assert_eq!(data, b"one");
}

#[tokio::test]
async fn test_link_to_older_version() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/doc", b"draft").await;
    common::put(&store, "/doc", b"final").await;

    let request = LinkRequest {
        target_version: Some(1),
        ..link("/doc.draft", "/doc")
    };
    store.create_link(request).await.unwrap();

    let (_, data) = common::read(&store, "/doc.draft", &DescriptorQuery::latest()).await;
    assert_eq!(data, b"draft");
}

#[tokio::test]
async fn test_link_failures() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/target", b"x").await;

    let missing = store.create_link(link("/l", "/missing")).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    let bad_version = LinkRequest {
        target_version: Some(4),
        ..link("/l", "/target")
    };
    assert!(matches!(
        store.create_link(bad_version).await,
        Err(StoreError::NotFound(_))
    ));

    let root = store.create_link(link("/", "/target")).await;
    assert!(matches!(root, Err(StoreError::InvalidInput(_))));

    assert!(store.list_children("/", 10, 0).await.unwrap().len() == 1);
}

#[tokio::test]
async fn test_protected_link_path() {
    let (store, _temp) = common::setup_test_env().await;
    common::put(&store, "/target", b"x").await;

    let request = LinkRequest {
        protect: true,
        ..link("/alias", "/target")
    };
    let first = store.create_link(request).await.unwrap();
    let secret = first.secret.expect("secret for new protected link");

    let denied = store.create_link(link("/alias", "/target")).await;
    assert!(matches!(denied, Err(StoreError::Unauthorized(_))));

    let allowed = LinkRequest {
        secret: Some(secret),
        ..link("/alias", "/target")
    };
    let second = store.create_link(allowed).await.unwrap();
    assert_eq!(second.descriptor.version, 2);
}
