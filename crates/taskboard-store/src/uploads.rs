use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use taskboard_core::Attachment;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::StoreError;

/// Attachments larger than this are rejected before anything touches disk.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Stores uploaded attachment files under `<data-dir>/uploads`, keyed by
/// generated filenames. Has no notion of tasks; callers tie the returned
/// `Attachment` record to a task and call `remove` when that bond breaks.
pub struct UploadStore {
    uploads_dir: PathBuf,
}

impl UploadStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: data_dir.into().join("uploads"),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Validate and store one uploaded file. Only `image/*` and
    /// `application/pdf` are accepted, capped at 5 MiB. Rejected uploads
    /// leave nothing on disk.
    pub async fn store(
        &self,
        original_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<Attachment, StoreError> {
        if !is_allowed_type(mime_type) {
            return Err(StoreError::Rejected(
                "only images and PDFs are allowed".into(),
            ));
        }
        if data.len() as u64 > MAX_ATTACHMENT_BYTES {
            return Err(StoreError::Rejected("file exceeds the 5 MiB limit".into()));
        }

        let filename = storage_filename(original_name);
        let dest = self.uploads_dir.join(&filename);

        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| StoreError::Internal(format!("mkdir {}: {e}", self.uploads_dir.display())))?;
        tokio::fs::write(&dest, &data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", dest.display())))?;

        Ok(Attachment {
            id: Uuid::new_v4().to_string(),
            path: format!("/uploads/{filename}"),
            filename,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size: data.len() as u64,
            created_at: Utc::now(),
        })
    }

    /// Best-effort delete of a stored file. A missing file is a logged
    /// no-op; other I/O failures are logged and swallowed, never retried.
    pub async fn remove(&self, filename: &str) {
        let path = self.uploads_dir.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(filename, "deleted attachment file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(filename, "attachment file already absent")
            }
            Err(e) => warn!(filename, "failed to delete attachment file: {e}"),
        }
    }
}

fn is_allowed_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

/// Generated storage name: a fresh UUID plus the original extension, so
/// stored names never collide and never contain caller-supplied path parts.
fn storage_filename(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{}{ext}", Uuid::new_v4())
}
