//! Filesystem primitives behind the blob layout.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{BlobStoreError, Result};

/// Outcome of moving a staged file into its final location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// The staged file became the blob
    Stored,
    /// A blob with the same content was already in place
    Duplicate,
}

/// Make sure `dir` exists and is a directory.
///
/// Creating a directory that already exists is not an error; a path that
/// exists but is not a directory is.
pub(crate) async fn ensure_directory(dir: &Path) -> Result<()> {
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BlobStoreError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "mkdir");
            match fs::create_dir_all(dir).await {
                Ok(()) => {
                    info!(dir = %dir.display(), "created new storage directory");
                    Ok(())
                }
                // lost a race with another creator; whatever won must be a directory
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if fs::metadata(dir).await?.is_dir() {
                        Ok(())
                    } else {
                        Err(BlobStoreError::NotADirectory(dir.to_path_buf()))
                    }
                }
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Promote `src` to `dest` without ever overwriting `dest`.
///
/// A hard link either creates `dest` atomically with the full content of
/// `src` or fails with `AlreadyExists`, so two writers racing on the same
/// content cannot both believe they stored it and no reader can observe a
/// half written blob. The caller removes `src` afterwards.
pub(crate) async fn link_no_clobber(src: &Path, dest: &Path) -> std::io::Result<Placement> {
    debug!(src = %src.display(), dest = %dest.display(), "link");
    match fs::hard_link(src, dest).await {
        Ok(()) => Ok(Placement::Stored),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Placement::Duplicate),
        Err(e) => Err(e),
    }
}

/// Remove a staged file, ignoring files that are already gone.
pub(crate) async fn remove_staged(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_directory_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        ensure_directory(&dir).await.unwrap();
        ensure_directory(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_directory_rejects_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, b"not a directory").unwrap();

        let result = ensure_directory(&file).await;
        assert!(matches!(result, Err(BlobStoreError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn test_link_no_clobber_keeps_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        let dest = temp_dir.path().join("dest");
        std::fs::write(&first, b"one").unwrap();
        std::fs::write(&second, b"two").unwrap();

        assert_eq!(
            link_no_clobber(&first, &dest).await.unwrap(),
            Placement::Stored
        );
        assert_eq!(
            link_no_clobber(&second, &dest).await.unwrap(),
            Placement::Duplicate
        );
        assert_eq!(std::fs::read(&dest).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_remove_staged_missing_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        remove_staged(&temp_dir.path().join("gone")).await.unwrap();
    }
}
