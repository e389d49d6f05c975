//! Filesystem-based attachment store
//!
//! Attachments are stored as individual files under a root directory taken
//! from configuration. The directory is created at startup.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::error::StorageError;

use super::AttachmentStore;

/// Filesystem-backed attachment storage
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    /// Create a store over an existing directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store and its root directory if it does not exist
    pub async fn new_with_init(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The root directory attachments are written under
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl AttachmentStore for FilesystemStore {
    async fn put(&self, file_name: &str, data: Bytes) -> Result<PathBuf, StorageError> {
        let path = self.root.join(file_name);
        fs::write(&path, &data).await?;

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            "Attachment written"
        );
        Ok(path)
    }

    async fn delete(&self, file_path: &str) -> Result<(), StorageError> {
        fs::remove_file(file_path).await?;
        Ok(())
    }
}
