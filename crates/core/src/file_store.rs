//! Local file capability used by upload and download-to-file

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Error, Result};

/// File contents together with the name it was stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Reads upload sources and persists downloads
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Read a file by handle, returning its bytes and original name
    async fn read(&self, handle: &str) -> Result<StoredFile>;

    /// Write bytes to a path, returning the number of bytes written
    async fn write(&self, path: &str, bytes: &[u8]) -> Result<u64>;

    /// Reject a path `write` would refuse, without touching the filesystem
    fn check_path(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}

/// Filesystem-backed store
///
/// Relative handles resolve under `root` and absolute handles are used as
/// given. A sandboxed store also rejects handles containing `..`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    sandboxed: bool,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sandboxed: false,
        }
    }

    /// A store whose relative handles may not leave `root`
    pub fn sandboxed(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sandboxed: true,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, handle: &str) -> Result<PathBuf> {
        if handle.is_empty() {
            return Err(Error::InvalidPath("empty path".to_string()));
        }
        let path = Path::new(handle);
        if self.sandboxed && path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(Error::InvalidPath(format!(
                "'{handle}' escapes the storage root"
            )));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, handle: &str) -> Result<StoredFile> {
        let path = self.resolve(handle)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidPath(format!("'{handle}' has no file name")))?;
        Ok(StoredFile {
            file_name,
            bytes: Bytes::from(bytes),
        })
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<u64> {
        let path = self.resolve(path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(bytes.len() as u64)
    }

    fn check_path(&self, path: &str) -> Result<()> {
        self.resolve(path).map(|_| ())
    }
}
