mod repository;
mod uploads;

pub use repository::TaskRepository;
pub use uploads::{UploadStore, MAX_ATTACHMENT_BYTES};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Default data directory: `$XDG_DATA_HOME/taskboard`, falling back to
/// `~/.local/share/taskboard`.
pub fn default_data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("taskboard")
}
