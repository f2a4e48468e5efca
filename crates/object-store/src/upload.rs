//! Uploads staged in the temp directory while their digests are computed.

use std::path::Path;

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::digest::{UploadDigest, UploadDigests};
use crate::error::Result;
use crate::hash::ContentHash;

/// Read buffer size used when draining a reader into an upload
const CHUNK_SIZE: usize = 64 * 1024;

/// An upload in progress.
///
/// Every chunk is written to a uniquely named file in the store's temp
/// directory and fed to the digest accumulators in the same order. Only the
/// digest state is kept in memory.
///
/// Dropping the upload before [`finish`](Self::finish) removes the temp file,
/// so an aborted upload never leaves anything behind.
#[derive(Debug)]
pub struct StagedUpload {
    file: File,
    path: TempPath,
    digest: UploadDigest,
}

impl StagedUpload {
    pub(crate) fn new(file: File, path: TempPath) -> Self {
        Self {
            file,
            path,
            digest: UploadDigest::new(),
        }
    }

    /// Append the next chunk of the upload.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.digest.update(chunk);
        Ok(())
    }

    /// Drain `reader` into the upload, returning the number of bytes read.
    pub async fn write_from<R>(&mut self, reader: &mut R) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.write(&buf[..n]).await?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Bytes written so far.
    pub fn size(&self) -> u64 {
        self.digest.size()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the content to disk and finalize the digests.
    pub async fn finish(mut self) -> Result<StagedBlob> {
        self.file.flush().await?;
        self.file.sync_all().await?;

        let Self { file, path, digest } = self;
        drop(file);

        let digests = digest.finalize();
        debug!(
            path = %path.display(),
            hash = %digests.sha256,
            size = digests.size,
            "upload staged"
        );
        Ok(StagedBlob { path, digests })
    }
}

/// A fully written upload waiting to be placed in the store.
///
/// Dropping it without committing removes the temp file.
#[derive(Debug)]
pub struct StagedBlob {
    pub(crate) path: TempPath,
    pub(crate) digests: UploadDigests,
}

impl StagedBlob {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn digests(&self) -> &UploadDigests {
        &self.digests
    }

    pub fn hash(&self) -> ContentHash {
        self.digests.sha256
    }

    pub fn size(&self) -> u64 {
        self.digests.size
    }

    /// Remove the temp file without storing anything.
    pub fn discard(self) -> Result<()> {
        debug!(path = %self.path.display(), "discarding staged upload");
        self.path.close()?;
        Ok(())
    }
}
