//! Version chains of descriptors.
//!
//! Every write to a path appends a descriptor numbered one past the newest
//! existing one. Writers of the same path are serialized by a per-path lock;
//! the provider's uniqueness on `(path, version)` catches anything that gets
//! past it, such as another process sharing the database.
//!
//! Protection is fixed when a path is created. Later writers must present
//! the path's secret. Protection cannot be turned on for an existing
//! unprotected path.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::access::{authorize, generate_secret, Protection, ProtectionDigest};
use crate::descriptor::{ContentFields, Descriptor, DescriptorQuery, NewVersion};
use crate::error::{Result, StoreError};
use crate::locks::PathLocks;
use crate::metadata::MetadataProvider;
use crate::path::FilePath;
use crate::tree::TreeIndex;

/// Largest page size served by [`DescriptorStore::history`]
pub const MAX_HISTORY_PAGE: u32 = 1000;

#[derive(Debug, Clone)]
pub struct DescriptorStore<P: MetadataProvider> {
    provider: P,
    tree: TreeIndex<P>,
    locks: PathLocks,
}

impl<P: MetadataProvider> DescriptorStore<P> {
    pub fn new(provider: P) -> Self {
        Self {
            tree: TreeIndex::new(provider.clone()),
            provider,
            locks: PathLocks::new(),
        }
    }

    pub fn tree(&self) -> &TreeIndex<P> {
        &self.tree
    }

    /// Check whether a writer may write to `path`, without writing.
    ///
    /// A new path must not clash with an existing file or directory. Returns
    /// the path's current descriptor, if any.
    pub async fn check_write(
        &self,
        path: &FilePath,
        protection: Protection<'_>,
    ) -> Result<Option<Descriptor>> {
        let prior = self.provider.latest(path, &DescriptorQuery::latest()).await?;
        match &prior {
            Some(prior) => authorize_next(prior, protection)?,
            None => self.tree.check_path(path).await?,
        }
        Ok(prior)
    }

    /// Write `content` as the next version of `path`, creating the path if
    /// it does not exist yet.
    pub async fn append(
        &self,
        path: &FilePath,
        content: ContentFields,
        tag: Option<String>,
        protection: Protection<'_>,
    ) -> Result<NewVersion> {
        let _guard = self.locks.lock(path.as_str()).await;

        match self.provider.latest(path, &DescriptorQuery::latest()).await? {
            None => {
                self.create_initial_version(path, content, tag, protection)
                    .await
            }
            Some(prior) => {
                authorize_next(&prior, protection)?;
                let descriptor = self
                    .create_next_version(&prior, content, tag, protection.secret)
                    .await?;
                Ok(NewVersion {
                    descriptor,
                    secret: None,
                })
            }
        }
    }

    /// Create version 1 of a path.
    ///
    /// A supplied secret protects the path. Asking for protection without
    /// one generates a secret, returned once in [`NewVersion::secret`].
    pub async fn create_initial_version(
        &self,
        path: &FilePath,
        content: ContentFields,
        tag: Option<String>,
        protection: Protection<'_>,
    ) -> Result<NewVersion> {
        let (digest, generated) = match (protection.secret, protection.protect) {
            (Some(secret), _) => (Some(ProtectionDigest::of(secret)), None),
            (None, true) => {
                let secret = generate_secret()?;
                (Some(ProtectionDigest::of(&secret)), Some(secret))
            }
            (None, false) => (None, None),
        };

        // the leaf is only added once the descriptor exists, so a failed
        //  insert leaves no node behind
        self.tree.check_path(path).await?;
        let descriptor = Descriptor::initial(path.clone(), content, tag, digest);
        self.provider.insert(&descriptor).await?;
        self.tree.register_path(path).await?;

        info!(
            path = %descriptor.path,
            hash = %descriptor.content.hash,
            protected = descriptor.is_protected(),
            "created new file descriptor"
        );
        Ok(NewVersion {
            descriptor,
            secret: generated,
        })
    }

    /// Append the version after `prior`, inheriting its protection.
    pub async fn create_next_version(
        &self,
        prior: &Descriptor,
        content: ContentFields,
        tag: Option<String>,
        secret: Option<&str>,
    ) -> Result<Descriptor> {
        authorize(prior.protection.as_ref(), secret)?;

        let descriptor = prior.next(content, tag);
        self.provider.insert(&descriptor).await?;

        info!(
            path = %descriptor.path,
            version = descriptor.version,
            hash = %descriptor.content.hash,
            "created new version"
        );
        Ok(descriptor)
    }

    /// The newest descriptor of `path` matching `query`.
    pub async fn find_latest(&self, path: &FilePath, query: &DescriptorQuery) -> Result<Descriptor> {
        if query.version == Some(0) {
            return Err(StoreError::InvalidInput("versions start at 1".into()));
        }
        self.provider
            .latest(path, query)
            .await?
            .ok_or_else(|| StoreError::NotFound(describe(path, query)))
    }

    /// Descriptors of `path`, newest first.
    pub async fn history(&self, path: &FilePath, limit: u32, offset: u32) -> Result<Vec<Descriptor>> {
        let limit = limit.min(MAX_HISTORY_PAGE);
        Ok(self.provider.history(path, limit, offset).await?)
    }

    /// Count a download. Failures are logged and never reach the reader.
    pub async fn record_download(&self, id: Uuid) {
        if let Err(e) = self.provider.record_download(id, Utc::now()).await {
            error!(id = %id, error = %e, "failed to update download statistics");
        }
    }
}

fn authorize_next(prior: &Descriptor, protection: Protection<'_>) -> Result<()> {
    if protection.protect && !prior.is_protected() {
        return Err(StoreError::Unauthorized(format!(
            "{} already exists, protection can only be set on creation",
            prior.path
        )));
    }
    authorize(prior.protection.as_ref(), protection.secret)
}

fn describe(path: &FilePath, query: &DescriptorQuery) -> String {
    match (query.version, query.tag.as_deref()) {
        (None, None) => path.to_string(),
        (Some(v), None) => format!("{path} version {v}"),
        (None, Some(t)) => format!("{path} tagged {t}"),
        (Some(v), Some(t)) => format!("{path} version {v} tagged {t}"),
    }
}
