use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use taskboard_core::{Attachment, Category, CreateTask, Priority, Status, Task, UpdateTask};
use tracing::{info, warn};
use uuid::Uuid;

use crate::uploads::UploadStore;
use crate::StoreError;

/// Sole authoritative holder of the task collection. All reads and writes
/// go through it; callers must serialize mutating access (the server wraps
/// the repository in a `tokio::sync::Mutex`).
///
/// Every successful mutation rewrites the full snapshot. A failed snapshot
/// write is logged and does not roll back the in-memory change — the
/// running process is the source of truth, persistence is best-effort.
pub struct TaskRepository {
    tasks: Vec<Task>,
    snapshot_path: PathBuf,
    uploads: Arc<UploadStore>,
}

impl TaskRepository {
    /// Load the snapshot from `<data-dir>/tasks.json`, seeding example
    /// tasks when it is missing and recovering to the seed when it is
    /// unreadable.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        uploads: Arc<UploadStore>,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| StoreError::Internal(format!("mkdir {}: {e}", data_dir.display())))?;

        let snapshot_path = data_dir.join("tasks.json");
        let (tasks, fresh) = match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Task>>(&bytes) {
                Ok(tasks) => {
                    info!(count = tasks.len(), "loaded tasks from snapshot");
                    (tasks, false)
                }
                Err(e) => {
                    warn!("snapshot corrupt, recovered to default tasks: {e}");
                    (seed_tasks(), true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no snapshot found, seeding example tasks");
                (seed_tasks(), true)
            }
            Err(e) => {
                warn!("snapshot unreadable, recovered to default tasks: {e}");
                (seed_tasks(), true)
            }
        };

        let repo = Self {
            tasks,
            snapshot_path,
            uploads,
        };
        if fresh {
            repo.persist().await;
        }
        Ok(repo)
    }

    /// All tasks in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub async fn create(&mut self, input: CreateTask) -> Task {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            category: input.category,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        self.persist().await;
        task
    }

    /// Merge only the supplied fields; `id` and `created_at` never change.
    pub async fn update(&mut self, id: &str, update: UpdateTask) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(category) = update.category {
            task.category = category;
        }
        task.updated_at = Utc::now();
        let task = task.clone();
        self.persist().await;
        Some(task)
    }

    /// Remove a task, deleting every attachment's backing file first.
    /// File deletion is best-effort and never aborts the removal.
    pub async fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let task = self.tasks.remove(index);
        for attachment in &task.attachments {
            self.uploads.remove(&attachment.filename).await;
        }
        self.persist().await;
        true
    }

    pub async fn add_attachment(&mut self, task_id: &str, attachment: Attachment) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.attachments.push(attachment);
        task.updated_at = Utc::now();
        let task = task.clone();
        self.persist().await;
        Some(task)
    }

    /// Remove one attachment entry and its backing file. `None` when either
    /// the task or the attachment is unknown.
    pub async fn remove_attachment(
        &mut self,
        task_id: &str,
        attachment_id: &str,
    ) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        let index = task
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)?;
        let attachment = task.attachments.remove(index);
        task.updated_at = Utc::now();
        let task = task.clone();
        self.uploads.remove(&attachment.filename).await;
        self.persist().await;
        Some(task)
    }

    async fn persist(&self) {
        let json = match serde_json::to_vec_pretty(&self.tasks) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize snapshot: {e}");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.snapshot_path, json).await {
            warn!(
                "failed to write snapshot {}: {e}",
                self.snapshot_path.display()
            );
        }
    }
}

/// The example board a fresh install starts with.
fn seed_tasks() -> Vec<Task> {
    let samples = [
        (
            "Implement Login Feature",
            "Create login form with email and password",
            Status::ToDo,
            Priority::High,
            Category::Feature,
        ),
        (
            "Fix Navigation Menu",
            "Menu disappears on mobile view",
            Status::InProgress,
            Priority::Medium,
            Category::Bug,
        ),
        (
            "Add Dark Mode",
            "Implement dark mode toggle",
            Status::Done,
            Priority::Low,
            Category::Enhancement,
        ),
    ];
    samples
        .into_iter()
        .map(|(title, description, status, priority, category)| {
            let now = Utc::now();
            Task {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                description: description.to_string(),
                status,
                priority,
                category,
                attachments: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}
