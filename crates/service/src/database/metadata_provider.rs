use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use common::access::ProtectionDigest;
use common::descriptor::{ContentFields, Descriptor, DescriptorQuery};
use common::metadata::{MetadataError, MetadataProvider};
use common::path::FilePath;
use common::tree::{NodeKind, TreeNode};
use object_store::ContentHash;

use crate::database::Database;

const DESCRIPTOR_COLUMNS: &str = "id, path, namespace, version, tag, content_hash, md5, sha1, \
     size, mime_type, display_name, downloads, last_download, created_at, protection";

fn decode_err<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

fn descriptor_from_row(row: &SqliteRow) -> Result<Descriptor, sqlx::Error> {
    let path: String = row.try_get("path")?;
    let content_hash: String = row.try_get("content_hash")?;
    let protection: Option<String> = row.try_get("protection")?;

    Ok(Descriptor {
        id: row.try_get("id")?,
        path: FilePath::parse(&path).map_err(decode_err)?,
        namespace: row.try_get("namespace")?,
        version: row.try_get::<i64, _>("version")? as u64,
        tag: row.try_get("tag")?,
        content: ContentFields {
            hash: content_hash.parse::<ContentHash>().map_err(decode_err)?,
            md5: row.try_get("md5")?,
            sha1: row.try_get("sha1")?,
            size: row.try_get::<i64, _>("size")? as u64,
            mime_type: row.try_get("mime_type")?,
            display_name: row.try_get("display_name")?,
        },
        downloads: row.try_get::<i64, _>("downloads")? as u64,
        last_download: row.try_get("last_download")?,
        created_at: row.try_get("created_at")?,
        protection: protection
            .map(|p| p.parse::<ProtectionDigest>())
            .transpose()
            .map_err(decode_err)?,
    })
}

fn node_from_row(row: &SqliteRow) -> Result<TreeNode, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let kind = NodeKind::parse(&kind).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "kind".into(),
        source: format!("unknown node kind: {kind}").into(),
    })?;
    Ok(TreeNode {
        namespace: row.try_get("namespace")?,
        name: row.try_get("name")?,
        kind,
    })
}

#[async_trait]
impl MetadataProvider for Database {
    type Error = sqlx::Error;

    async fn latest(
        &self,
        path: &FilePath,
        query: &DescriptorQuery,
    ) -> Result<Option<Descriptor>, MetadataError<Self::Error>> {
        let sql = format!(
            r#"
            SELECT {DESCRIPTOR_COLUMNS}
            FROM descriptors
            WHERE path = ?1
              AND (?2 IS NULL OR version = ?2)
              AND (?3 IS NULL OR tag = ?3)
            ORDER BY version DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query(&sql)
            .bind(path.as_str())
            .bind(query.version.map(|v| v as i64))
            .bind(query.tag.as_deref())
            .fetch_optional(&**self)
            .await
            .map_err(MetadataError::Provider)?;

        row.as_ref()
            .map(descriptor_from_row)
            .transpose()
            .map_err(MetadataError::Provider)
    }

    async fn history(
        &self,
        path: &FilePath,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Descriptor>, MetadataError<Self::Error>> {
        let sql = format!(
            r#"
            SELECT {DESCRIPTOR_COLUMNS}
            FROM descriptors
            WHERE path = ?1
            ORDER BY version DESC
            LIMIT ?2 OFFSET ?3
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(path.as_str())
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&**self)
            .await
            .map_err(MetadataError::Provider)?;

        rows.iter()
            .map(descriptor_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(MetadataError::Provider)
    }

    async fn insert(&self, descriptor: &Descriptor) -> Result<(), MetadataError<Self::Error>> {
        sqlx::query(
            r#"
            INSERT INTO descriptors (
                id, path, namespace, version, tag, content_hash, md5, sha1,
                size, mime_type, display_name, downloads, last_download, created_at, protection
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(descriptor.id)
        .bind(descriptor.path.as_str())
        .bind(&descriptor.namespace)
        .bind(descriptor.version as i64)
        .bind(descriptor.tag.as_deref())
        .bind(descriptor.content.hash.to_hex())
        .bind(&descriptor.content.md5)
        .bind(&descriptor.content.sha1)
        .bind(descriptor.content.size as i64)
        .bind(&descriptor.content.mime_type)
        .bind(descriptor.content.display_name.as_deref())
        .bind(descriptor.downloads as i64)
        .bind(descriptor.last_download)
        .bind(descriptor.created_at)
        .bind(descriptor.protection.as_ref().map(|p| p.to_hex()))
        .execute(&**self)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                MetadataError::VersionTaken(descriptor.path.to_string(), descriptor.version)
            }
            _ => MetadataError::Provider(e),
        })?;

        Ok(())
    }

    async fn record_download(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), MetadataError<Self::Error>> {
        sqlx::query(
            r#"
            UPDATE descriptors
            SET downloads = downloads + 1, last_download = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&**self)
        .await
        .map_err(MetadataError::Provider)?;

        Ok(())
    }

    async fn tree_node(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<TreeNode>, MetadataError<Self::Error>> {
        let row = sqlx::query(
            r#"
            SELECT namespace, name, kind
            FROM tree_nodes
            WHERE namespace = ?1 AND name = ?2
            "#,
        )
        .bind(namespace)
        .bind(name)
        .fetch_optional(&**self)
        .await
        .map_err(MetadataError::Provider)?;

        row.as_ref()
            .map(node_from_row)
            .transpose()
            .map_err(MetadataError::Provider)
    }

    async fn insert_tree_node(
        &self,
        node: &TreeNode,
    ) -> Result<Option<TreeNode>, MetadataError<Self::Error>> {
        let result = sqlx::query(
            r#"
            INSERT INTO tree_nodes (namespace, name, kind)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (namespace, name) DO NOTHING
            "#,
        )
        .bind(&node.namespace)
        .bind(&node.name)
        .bind(node.kind.as_str())
        .execute(&**self)
        .await
        .map_err(MetadataError::Provider)?;

        if result.rows_affected() == 1 {
            return Ok(None);
        }
        self.tree_node(&node.namespace, &node.name).await
    }

    async fn children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeNode>, MetadataError<Self::Error>> {
        let rows = sqlx::query(
            r#"
            SELECT namespace, name, kind
            FROM tree_nodes
            WHERE namespace = ?1
            ORDER BY name
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(namespace)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&**self)
        .await
        .map_err(MetadataError::Provider)?;

        rows.iter()
            .map(node_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(MetadataError::Provider)
    }
}
