//! The filesystem-backed blob store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::{self, File};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, info, warn};

use crate::error::{BlobStoreError, Result};
use crate::hash::{ContentHash, PREFIX_LEN};
use crate::storage::{ensure_directory, link_no_clobber, remove_staged, Placement};
use crate::upload::{StagedBlob, StagedUpload};

/// Name of the directory, inside the root, holding in-flight uploads
pub const TEMP_DIR_NAME: &str = "temp";

/// Handle to a blob store rooted at a directory.
///
/// The handle is cheap to clone and holds no open files; every operation
/// goes straight to the filesystem, which is the only source of truth for
/// which blobs exist.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    temp: PathBuf,
}

impl BlobStore {
    /// Open the store at `root`, creating the root and temp directories if
    /// they do not exist yet.
    pub async fn open_or_create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        ensure_directory(root).await?;
        let root = fs::canonicalize(root).await?;
        let temp = root.join(TEMP_DIR_NAME);
        ensure_directory(&temp).await?;

        debug!(root = %root.display(), "storage root");
        debug!(temp = %temp.display(), "storage temp");

        Ok(Self { root, temp })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp
    }

    /// Final on-disk location of the blob for `hash`.
    pub fn location(&self, hash: &ContentHash) -> PathBuf {
        let (prefix, rest) = hash.split();
        self.root.join(prefix).join(rest)
    }

    /// Start a new upload staged in the temp directory.
    pub async fn begin_upload(&self) -> Result<StagedUpload> {
        let named = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.temp)?;
        let (file, path) = named.into_parts();
        debug!(path = %path.display(), "begin upload");
        Ok(StagedUpload::new(File::from_std(file), path))
    }

    /// Place a fully written upload in the store under its content hash.
    pub async fn commit(&self, staged: StagedBlob) -> Result<PathBuf> {
        let hash = staged.hash();
        self.place(staged.path(), &hash).await
    }

    /// Move the file at `staged` into the store under `hash`.
    ///
    /// If a blob for `hash` already exists the staged file is discarded and
    /// the existing location returned. The staged file is removed in every
    /// case, including failures.
    pub async fn place(&self, staged: &Path, hash: &ContentHash) -> Result<PathBuf> {
        let dest = self.location(hash);
        let placed = self.try_place(staged, hash, &dest).await;

        if let Err(e) = remove_staged(staged).await {
            warn!(path = %staged.display(), error = %e, "failed to remove staged upload");
        }

        match placed? {
            Placement::Stored => info!(hash = %hash, "stored new blob"),
            Placement::Duplicate => debug!(hash = %hash, "duplicate blob"),
        }
        Ok(dest)
    }

    async fn try_place(
        &self,
        staged: &Path,
        hash: &ContentHash,
        dest: &Path,
    ) -> Result<Placement> {
        match fs::metadata(dest).await {
            Ok(meta) if meta.is_file() => return Ok(Placement::Duplicate),
            Ok(_) => return Err(BlobStoreError::NotAFile(dest.to_path_buf())),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let placement_error = |source: std::io::Error| BlobStoreError::Placement {
            hash: hash.to_string(),
            source,
        };

        match link_no_clobber(staged, dest).await {
            Ok(placement) => Ok(placement),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // bucket directories are created lazily, then the move is retried once
                if let Some(bucket) = dest.parent() {
                    ensure_directory(bucket).await?;
                }
                link_no_clobber(staged, dest).await.map_err(placement_error)
            }
            Err(e) => Err(placement_error(e)),
        }
    }

    /// Open the blob for `hash` for sequential reading.
    pub async fn open(&self, hash: &ContentHash) -> Result<BlobReader> {
        let path = self.location(hash);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlobStoreError::NotFound(hash.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(BlobStoreError::NotAFile(path));
        }

        Ok(BlobReader {
            file,
            size: meta.len(),
        })
    }

    /// Check whether a blob for `hash` exists.
    pub async fn contains(&self, hash: &ContentHash) -> Result<bool> {
        match fs::metadata(self.location(hash)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// List all blob hashes in the store.
    pub async fn list(&self) -> Result<Vec<ContentHash>> {
        let mut hashes = Vec::new();
        let mut buckets = fs::read_dir(&self.root).await?;

        while let Some(bucket) = buckets.next_entry().await? {
            let prefix = bucket.file_name().to_string_lossy().into_owned();
            if prefix.len() != PREFIX_LEN || !bucket.file_type().await?.is_dir() {
                continue;
            }

            let mut entries = fs::read_dir(bucket.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = format!("{}{}", prefix, entry.file_name().to_string_lossy());
                match name.parse::<ContentHash>() {
                    Ok(hash) => hashes.push(hash),
                    Err(_) => {
                        warn!(name = %name, "unexpected file in blob store, skipping");
                    }
                }
            }
        }

        hashes.sort();
        Ok(hashes)
    }
}

/// Sequential reader over a stored blob.
#[derive(Debug)]
pub struct BlobReader {
    file: File,
    size: u64,
}

impl BlobReader {
    /// Size of the blob in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl AsyncRead for BlobReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}
