//! Directory-like index over every stored path.
//!
//! Each path `/a/b/c` is made of nodes `(/, a)`, `(/a, b)` and `(/a/b, c)`.
//! Every node but the last is interior; the last is a leaf. A name can never
//! be both within a namespace.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::metadata::MetadataProvider;
use crate::path::{normalize_namespace, FilePath};

/// Largest page size served by [`TreeIndex::list_children`]
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Interior,
    Leaf,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Interior => "interior",
            NodeKind::Leaf => "leaf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interior" => Some(NodeKind::Interior),
            "leaf" => Some(NodeKind::Leaf),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// The full path this node names.
    pub fn path(&self) -> String {
        if self.namespace == "/" {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Split a path into the nodes that make it up, root first.
pub fn decompose(path: &FilePath) -> Vec<TreeNode> {
    let segments: Vec<&str> = path.segments().collect();
    let last = segments.len().saturating_sub(1);
    let mut namespace = String::from("/");
    let mut nodes = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let kind = if i == last {
            NodeKind::Leaf
        } else {
            NodeKind::Interior
        };
        nodes.push(TreeNode::new(namespace.clone(), *segment, kind));

        if namespace.len() > 1 {
            namespace.push('/');
        }
        namespace.push_str(segment);
    }
    nodes
}

#[derive(Debug, Clone)]
pub struct TreeIndex<P: MetadataProvider> {
    provider: P,
}

impl<P: MetadataProvider> TreeIndex<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Make sure every node of `path` exists with the right kind.
    ///
    /// Existing nodes are checked before anything is inserted, so a clash
    /// with an existing file or directory leaves the tree untouched.
    pub async fn register_path(&self, path: &FilePath) -> Result<()> {
        let missing = self.missing_nodes(path).await?;

        for node in missing {
            // someone else may have inserted it since we looked
            if let Some(existing) = self.provider.insert_tree_node(&node).await? {
                check_kind(&existing, node.kind)?;
            } else {
                debug!(namespace = %node.namespace, name = %node.name, kind = %node.kind, "tree node added");
            }
        }
        Ok(())
    }

    /// Fail with `Conflict` if `path` clashes with an existing file or
    /// directory. Nothing is written.
    pub async fn check_path(&self, path: &FilePath) -> Result<()> {
        self.missing_nodes(path).await.map(|_| ())
    }

    async fn missing_nodes(&self, path: &FilePath) -> Result<Vec<TreeNode>> {
        let mut missing = Vec::new();
        for node in decompose(path) {
            match self.provider.tree_node(&node.namespace, &node.name).await? {
                Some(existing) => check_kind(&existing, node.kind)?,
                None => missing.push(node),
            }
        }
        Ok(missing)
    }

    /// Direct children of a namespace.
    pub async fn list_children(
        &self,
        namespace: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TreeNode>> {
        let namespace = normalize_namespace(namespace)?;
        let limit = limit.min(MAX_PAGE_SIZE);
        Ok(self.provider.children(&namespace, limit, offset).await?)
    }
}

fn check_kind(existing: &TreeNode, expected: NodeKind) -> Result<()> {
    if existing.kind == expected {
        return Ok(());
    }
    let what = match existing.kind {
        NodeKind::Leaf => "a file",
        NodeKind::Interior => "a directory",
    };
    Err(StoreError::Conflict(format!(
        "{} is already {}",
        existing.path(),
        what
    )))
}
