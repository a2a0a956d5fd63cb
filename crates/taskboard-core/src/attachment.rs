use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A binary file owned by exactly one task. `filename` is the generated
/// storage name; the human-supplied name survives only as `original_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: String,
    pub created_at: DateTime<Utc>,
}
