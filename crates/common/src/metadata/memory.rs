use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::provider::{MetadataError, MetadataProvider};
use crate::descriptor::{Descriptor, DescriptorQuery};
use crate::path::FilePath;
use crate::tree::{NodeKind, TreeNode};

/// In-memory metadata provider, used for tests and ephemeral stores
#[derive(Debug, Clone)]
pub struct MemoryMetadataProvider {
    inner: Arc<RwLock<MemoryMetadataProviderInner>>,
}

#[derive(Debug, Default)]
struct MemoryMetadataProviderInner {
    /// path -> descriptors ordered by version
    descriptors: HashMap<FilePath, Vec<Descriptor>>,
    /// descriptor id -> path, for download bookkeeping
    ids: HashMap<Uuid, FilePath>,
    /// namespace -> name -> kind
    tree: HashMap<String, BTreeMap<String, NodeKind>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryMetadataProviderError {
    #[error("memory provider error: {0}")]
    Internal(String),
}

type MemoryResult<T> = Result<T, MetadataError<MemoryMetadataProviderError>>;

impl MemoryMetadataProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryMetadataProviderInner::default())),
        }
    }

    fn read(&self) -> MemoryResult<RwLockReadGuard<'_, MemoryMetadataProviderInner>> {
        self.inner.read().map_err(|e| {
            MetadataError::Provider(MemoryMetadataProviderError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })
    }

    fn write(&self) -> MemoryResult<RwLockWriteGuard<'_, MemoryMetadataProviderInner>> {
        self.inner.write().map_err(|e| {
            MetadataError::Provider(MemoryMetadataProviderError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })
    }
}

impl Default for MemoryMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for MemoryMetadataProvider {
    type Error = MemoryMetadataProviderError;

    async fn latest(
        &self,
        path: &FilePath,
        query: &DescriptorQuery,
    ) -> MemoryResult<Option<Descriptor>> {
        let inner = self.read()?;
        Ok(inner
            .descriptors
            .get(path)
            .and_then(|versions| versions.iter().rev().find(|d| query.matches(d)))
            .cloned())
    }

    async fn history(
        &self,
        path: &FilePath,
        limit: u32,
        offset: u32,
    ) -> MemoryResult<Vec<Descriptor>> {
        let inner = self.read()?;
        Ok(inner
            .descriptors
            .get(path)
            .map(|versions| {
                versions
                    .iter()
                    .rev()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, descriptor: &Descriptor) -> MemoryResult<()> {
        let mut inner = self.write()?;
        let versions = inner
            .descriptors
            .entry(descriptor.path.clone())
            .or_default();

        if versions.iter().any(|d| d.version == descriptor.version) {
            return Err(MetadataError::VersionTaken(
                descriptor.path.to_string(),
                descriptor.version,
            ));
        }
        let at = versions.partition_point(|d| d.version < descriptor.version);
        versions.insert(at, descriptor.clone());
        inner.ids.insert(descriptor.id, descriptor.path.clone());
        Ok(())
    }

    async fn record_download(&self, id: Uuid, at: DateTime<Utc>) -> MemoryResult<()> {
        let mut inner = self.write()?;
        let Some(path) = inner.ids.get(&id).cloned() else {
            return Ok(());
        };
        if let Some(descriptor) = inner
            .descriptors
            .get_mut(&path)
            .and_then(|versions| versions.iter_mut().find(|d| d.id == id))
        {
            descriptor.downloads += 1;
            descriptor.last_download = Some(at);
        }
        Ok(())
    }

    async fn tree_node(&self, namespace: &str, name: &str) -> MemoryResult<Option<TreeNode>> {
        let inner = self.read()?;
        Ok(inner
            .tree
            .get(namespace)
            .and_then(|children| children.get(name))
            .map(|kind| TreeNode::new(namespace, name, *kind)))
    }

    async fn insert_tree_node(&self, node: &TreeNode) -> MemoryResult<Option<TreeNode>> {
        let mut inner = self.write()?;
        let children = inner.tree.entry(node.namespace.clone()).or_default();
        if let Some(kind) = children.get(&node.name) {
            return Ok(Some(TreeNode::new(
                node.namespace.clone(),
                node.name.clone(),
                *kind,
            )));
        }
        children.insert(node.name.clone(), node.kind);
        Ok(None)
    }

    async fn children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> MemoryResult<Vec<TreeNode>> {
        let inner = self.read()?;
        Ok(inner
            .tree
            .get(namespace)
            .map(|children| {
                children
                    .iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .map(|(name, kind)| TreeNode::new(namespace, name.clone(), *kind))
                    .collect()
            })
            .unwrap_or_default())
    }
}
