//! Blob storage for uploaded bytes.

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found")]
    NotFound,

    #[error("invalid blob path")]
    InvalidPath,

    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores bytes under relative, `/`-separated paths.
#[automock]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError>;

    /// Removing a missing blob succeeds.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}

/// Blobs as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins `path` onto the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path);

        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if is_plain {
            Ok(self.root.join(relative))
        } else {
            Err(BlobError::InvalidPath)
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let target = self.resolve(path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write then rename so readers never see a partial file.
        let mut staging = target.clone().into_os_string();
        staging.push(".partial");

        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &target).await?;

        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        match fs::read(self.resolve(path)?).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(BlobError::NotFound),
            Err(error) => Err(error.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        match fs::remove_file(self.resolve(path)?).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("folio-blobs-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn stores_reads_and_deletes() -> TestResult {
        let root = scratch_root();
        let store = LocalBlobStore::new(&root);

        store.put("uploads/document/a.txt", b"hello").await?;

        assert_eq!(store.get("uploads/document/a.txt").await?, b"hello");

        store.delete("uploads/document/a.txt").await?;
        store.delete("uploads/document/a.txt").await?;

        let missing = store.get("uploads/document/a.txt").await;

        assert!(
            matches!(missing, Err(BlobError::NotFound)),
            "expected NotFound, got {missing:?}"
        );

        fs::remove_dir_all(root).await?;

        Ok(())
    }

    #[tokio::test]
    async fn refuses_paths_outside_the_root() {
        let store = LocalBlobStore::new(scratch_root());

        for path in ["../escape.txt", "/etc/passwd", "uploads/../../x", ""] {
            let result = store.put(path, b"x").await;

            assert!(
                matches!(result, Err(BlobError::InvalidPath)),
                "expected InvalidPath for {path:?}, got {result:?}"
            );
        }
    }
}
