use serde::{Deserialize, Serialize};
use taskboard_core::{CreateTask, Task, UpdateTask};

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("websocket error: {0}")]
    Socket(#[from] axum::Error),

    #[error("broadcast channel closed")]
    ChannelClosed,

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Identifies a task in delete events and delete requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
}

/// An update pushed by a peer: the task id plus the fields to merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPatch {
    pub id: String,
    #[serde(flatten)]
    pub fields: UpdateTask,
}

/// A move pushed by a peer. The status stays a free-form string here so the
/// engine can reject out-of-set values the same way the HTTP path does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMoveRequest {
    pub id: String,
    pub status: String,
}

/// The mutation intents a peer may push unsolicited, plus the explicit
/// snapshot request. Wire shape: `{"event": "...", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientMessage {
    #[serde(rename = "task:create")]
    TaskCreate(CreateTask),
    #[serde(rename = "task:update")]
    TaskUpdate(TaskPatch),
    #[serde(rename = "task:delete")]
    TaskDelete(TaskRef),
    #[serde(rename = "task:move")]
    TaskMove(TaskMoveRequest),
    #[serde(rename = "sync:request")]
    SyncRequest,
}

/// Events delivered server-to-peer. Every successful mutation fans out as
/// exactly one of these to all connected peers; `sync:tasks` alone is
/// peer-scoped (on connect and on request).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    #[serde(rename = "task:create")]
    TaskCreate(Task),
    #[serde(rename = "task:update")]
    TaskUpdate(Task),
    #[serde(rename = "task:move")]
    TaskMove(Task),
    #[serde(rename = "task:delete")]
    TaskDelete(TaskRef),
    #[serde(rename = "sync:tasks")]
    SyncTasks(Vec<Task>),
}

impl ServerEvent {
    /// Name the event for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::TaskCreate(_) => "task:create",
            ServerEvent::TaskUpdate(_) => "task:update",
            ServerEvent::TaskMove(_) => "task:move",
            ServerEvent::TaskDelete(_) => "task:delete",
            ServerEvent::SyncTasks(_) => "sync:tasks",
        }
    }
}
