use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use taskboard_core::{Attachment, CreateTask, MoveTask, Status, Task, UpdateTask};
use taskboard_store::{StoreError, TaskRepository, UploadStore};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::ws::{Broadcaster, ServerEvent, TaskRef};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(msg) => EngineError::InvalidInput(msg),
            StoreError::Internal(msg) => EngineError::Internal(msg),
        }
    }
}

/// The shared mutation layer both transports call, so validation and
/// broadcast exist exactly once regardless of whether a change arrives over
/// HTTP or a pushed socket message.
///
/// Every mutating method holds the repository lock across the full
/// read-modify-persist sequence and publishes exactly one event to the hub
/// on success, still inside the lock so event order matches mutation order.
/// Publishing never blocks on slow peers.
pub struct BoardEngine {
    repo: Mutex<TaskRepository>,
    uploads: Arc<UploadStore>,
    hub: Broadcaster,
}

impl BoardEngine {
    /// Build the engine over a data directory: uploads under
    /// `<data-dir>/uploads`, snapshot at `<data-dir>/tasks.json`.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let data_dir = data_dir.into();
        let uploads = Arc::new(UploadStore::new(&data_dir));
        let repo = TaskRepository::open(&data_dir, uploads.clone()).await?;
        Ok(Self {
            repo: Mutex::new(repo),
            uploads,
            hub: Broadcaster::new(),
        })
    }

    pub fn hub(&self) -> &Broadcaster {
        &self.hub
    }

    pub fn uploads_dir(&self) -> &Path {
        self.uploads.uploads_dir()
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.repo.lock().await.list().to_vec()
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, EngineError> {
        self.repo
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))
    }

    pub async fn create_task(&self, input: CreateTask) -> Result<Task, EngineError> {
        if input.title.trim().is_empty() {
            return Err(EngineError::InvalidInput("title must not be empty".into()));
        }
        let mut repo = self.repo.lock().await;
        let task = repo.create(input).await;
        self.hub.broadcast(ServerEvent::TaskCreate(task.clone()));
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, update: UpdateTask) -> Result<Task, EngineError> {
        let mut repo = self.repo.lock().await;
        let task = repo
            .update(id, update)
            .await
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))?;
        self.hub.broadcast(ServerEvent::TaskUpdate(task.clone()));
        Ok(task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), EngineError> {
        let mut repo = self.repo.lock().await;
        if !repo.delete(id).await {
            return Err(EngineError::NotFound(format!("task {id}")));
        }
        self.hub
            .broadcast(ServerEvent::TaskDelete(TaskRef { id: id.to_string() }));
        Ok(())
    }

    /// The dedicated move operation: the status arrives as a free-form
    /// string and is checked against the closed set before any mutation.
    pub async fn move_task(&self, id: &str, input: MoveTask) -> Result<Task, EngineError> {
        let status = Status::from_str(&input.status)
            .ok_or_else(|| EngineError::InvalidInput("invalid status value".into()))?;
        let mut repo = self.repo.lock().await;
        let task = repo
            .update(
                id,
                UpdateTask {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .ok_or_else(|| EngineError::NotFound(format!("task {id}")))?;
        self.hub.broadcast(ServerEvent::TaskMove(task.clone()));
        Ok(task)
    }

    /// Store the upload first; a rejected file never reaches the
    /// repository. An unknown task rolls the stored file back off disk.
    pub async fn add_attachment(
        &self,
        task_id: &str,
        original_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<(Attachment, Task), EngineError> {
        let attachment = self.uploads.store(original_name, mime_type, data).await?;
        let mut repo = self.repo.lock().await;
        match repo.add_attachment(task_id, attachment.clone()).await {
            Some(task) => {
                self.hub.broadcast(ServerEvent::TaskUpdate(task.clone()));
                Ok((attachment, task))
            }
            None => {
                drop(repo);
                self.uploads.remove(&attachment.filename).await;
                Err(EngineError::NotFound(format!("task {task_id}")))
            }
        }
    }

    pub async fn remove_attachment(
        &self,
        task_id: &str,
        attachment_id: &str,
    ) -> Result<Task, EngineError> {
        let mut repo = self.repo.lock().await;
        let task = repo
            .remove_attachment(task_id, attachment_id)
            .await
            .ok_or_else(|| {
                EngineError::NotFound(format!("task {task_id} or attachment {attachment_id}"))
            })?;
        self.hub.broadcast(ServerEvent::TaskUpdate(task.clone()));
        Ok(task)
    }

    /// Full current state, for `sync:tasks` delivery.
    pub async fn snapshot(&self) -> Vec<Task> {
        self.list_tasks().await
    }
}
