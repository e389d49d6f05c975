//! Attachment storage for stockroom
//!
//! This module defines the `AttachmentStore` trait, its filesystem
//! implementation, and the ingestion pipeline that names and persists
//! uploaded files before a record may reference them.

pub mod filesystem;
pub mod ingest;

pub use filesystem::FilesystemStore;
pub use ingest::AttachmentIngestor;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use crate::error::StorageError;

/// Durable byte storage for attachments
///
/// Implementations guarantee that a single `put` is atomic from the caller's
/// perspective: after it returns, the bytes are addressable at the returned
/// path. There is no atomicity across a `put` and any other operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Write `data` under `file_name`, returning the full storage path
    async fn put(&self, file_name: &str, data: Bytes) -> Result<PathBuf, StorageError>;

    /// Remove a previously stored file
    async fn delete(&self, file_path: &str) -> Result<(), StorageError>;
}
