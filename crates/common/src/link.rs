//! Links: a new version of one path that reuses another path's content.
//!
//! No bytes are copied. The link's descriptor repeats the target's content
//! fields, so both resolve to the same blob.

use tracing::info;

use crate::access::Protection;
use crate::descriptor::{DescriptorQuery, NewVersion};
use crate::error::{Result, StoreError};
use crate::metadata::MetadataProvider;
use crate::path::FilePath;
use crate::versions::DescriptorStore;

impl<P: MetadataProvider> DescriptorStore<P> {
    /// Point `link_path` at the content of `target_path`.
    ///
    /// Without `target_version` the target's newest version is used. The
    /// link is authorized against its own path before the target is looked
    /// up, so a denied writer learns nothing about the target.
    pub async fn create_link(
        &self,
        link_path: &FilePath,
        target_path: &FilePath,
        target_version: Option<u64>,
        protection: Protection<'_>,
    ) -> Result<NewVersion> {
        self.check_write(link_path, protection).await?;

        let query = DescriptorQuery {
            version: target_version,
            tag: None,
        };
        let target = match self.find_latest(target_path, &query).await {
            Err(StoreError::NotFound(what)) => {
                return Err(StoreError::NotFound(format!("link target {what}")))
            }
            other => other?,
        };

        let new = self
            .append(link_path, target.content.clone(), target.tag.clone(), protection)
            .await?;

        info!(
            link = %link_path,
            target = %target.path,
            target_version = target.version,
            version = new.descriptor.version,
            "created link"
        );
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ContentFields;
    use crate::metadata::MemoryMetadataProvider;
    use object_store::ContentHash;

    fn content(data: &[u8]) -> ContentFields {
        ContentFields {
            hash: ContentHash::of(data),
            md5: "m".into(),
            sha1: "s".into(),
            size: data.len() as u64,
            mime_type: "application/zip".into(),
            display_name: Some("release.zip".into()),
        }
    }

    fn path(p: &str) -> FilePath {
        FilePath::parse(p).unwrap()
    }

    #[tokio::test]
    async fn test_link_copies_content() {
        let store = DescriptorStore::new(MemoryMetadataProvider::new());
        let target = path("/releases/1.0.zip");
        store
            .append(&target, content(b"v1"), Some("1.0".into()), Protection::none())
            .await
            .unwrap();

        let link = path("/releases/latest.zip");
        let new = store
            .create_link(&link, &target, None, Protection::none())
            .await
            .unwrap();

        assert_eq!(new.descriptor.path, link);
        assert_eq!(new.descriptor.version, 1);
        assert_eq!(new.descriptor.content, content(b"v1"));
        assert_eq!(new.descriptor.tag.as_deref(), Some("1.0"));
    }

    #[tokio::test]
    async fn test_link_to_specific_version() {
        let store = DescriptorStore::new(MemoryMetadataProvider::new());
        let target = path("/t");
        for data in [b"one", b"two"] {
            store
                .append(&target, content(data), None, Protection::none())
                .await
                .unwrap();
        }

        let new = store
            .create_link(&path("/l"), &target, Some(1), Protection::none())
            .await
            .unwrap();
        assert_eq!(new.descriptor.content.hash, ContentHash::of(b"one"));
    }

    #[tokio::test]
    async fn test_missing_target() {
        let store = DescriptorStore::new(MemoryMetadataProvider::new());
        let result = store
            .create_link(&path("/l"), &path("/nope"), None, Protection::none())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store
            .find_latest(&path("/l"), &DescriptorQuery::latest())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_protected_link_path_checked_first() {
        let store = DescriptorStore::new(MemoryMetadataProvider::new());
        let link = path("/guarded");
        store
            .append(&link, content(b"x"), None, Protection::new(false, Some("key")))
            .await
            .unwrap();

        let result = store
            .create_link(&link, &path("/nope"), None, Protection::none())
            .await;
        assert!(matches!(result, Err(StoreError::Unauthorized(_))));
    }
}
