//! Attachment ingestion
//!
//! Receives raw upload bytes, derives a collision-resistant storage name,
//! writes through the attachment store, and returns the reference a record
//! will embed. Ingestion runs strictly before the record write, so a record
//! never points at a file that does not exist.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::error::StorageError;
use crate::models::AttachmentRef;

use super::AttachmentStore;

/// Names and persists uploaded attachments
pub struct AttachmentIngestor {
    store: Arc<dyn AttachmentStore>,
    // Tie-breaker for uploads landing on the same clock reading
    seq: AtomicU64,
}

impl AttachmentIngestor {
    /// Create an ingestor writing through the given store
    pub fn new(store: Arc<dyn AttachmentStore>) -> Self {
        Self {
            store,
            seq: AtomicU64::new(0),
        }
    }

    /// Persist an upload and return its storage reference
    ///
    /// Fails with `EmptyPayload` when no bytes were supplied, and with the
    /// store's IO error when the write fails; neither is swallowed.
    pub async fn ingest(
        &self,
        data: Bytes,
        original_name: &str,
        field_label: &str,
    ) -> Result<AttachmentRef, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let file_name = self.derive_name(original_name, field_label);
        let path = self.store.put(&file_name, data).await?;

        Ok(AttachmentRef {
            file_name,
            file_path: path.to_string_lossy().into_owned(),
        })
    }

    /// Best-effort removal of an attachment whose record was never written
    pub async fn discard(&self, attachment: &AttachmentRef) {
        if let Err(e) = self.store.delete(&attachment.file_path).await {
            tracing::warn!(
                file_path = %attachment.file_path,
                error = %e,
                "Failed to remove orphaned attachment"
            );
        }
    }

    /// `{field_label}-{unix_nanos}-{seq}{.ext}`
    ///
    /// The nanosecond timestamp plus a process-wide sequence number keeps
    /// names unique even for concurrent uploads in the same process. The
    /// extension is taken from the client's file name, lowercased; anything
    /// else about that name is discarded.
    fn derive_name(&self, original_name: &str, field_label: &str) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        format!("{}-{}-{}{}", field_label, nanos, seq, ext)
    }
}
