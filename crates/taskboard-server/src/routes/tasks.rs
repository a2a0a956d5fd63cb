use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use taskboard_core::{CreateTask, MoveTask, UpdateTask};

use super::AppState;
use crate::engine::EngineError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/move", put(move_task))
        .route("/api/tasks/{id}/attachments", post(add_attachment))
        .route(
            "/api/tasks/{id}/attachments/{attachment_id}",
            delete(remove_attachment),
        )
}

async fn list_tasks(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.list_tasks().await))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.get_task(&id).await.map(|t| Json(json!(t))).map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .create_task(input)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .update_task(&id, input)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .delete_task(&id)
        .await
        .map(|()| Json(json!({ "message": "Task deleted successfully" })))
        .map_err(to_error)
}

async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MoveTask>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .move_task(&id, input)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

/// Single-file upload under the multipart field `attachment`.
async fn add_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| to_error(EngineError::InvalidInput(format!("bad upload: {e}"))))?
    {
        if field.name() != Some("attachment") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| to_error(EngineError::InvalidInput(format!("bad upload: {e}"))))?;

        let (attachment, task) = state
            .add_attachment(&id, &original_name, &mime_type, data)
            .await
            .map_err(to_error)?;
        return Ok((
            StatusCode::CREATED,
            Json(json!({ "attachment": attachment, "task": task })),
        ));
    }

    Err(to_error(EngineError::InvalidInput(
        "no file uploaded".into(),
    )))
}

async fn remove_attachment(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .remove_attachment(&id, &attachment_id)
        .await
        .map(|task| {
            Json(json!({
                "message": "Attachment removed successfully",
                "task": task,
            }))
        })
        .map_err(to_error)
}

fn to_error(e: EngineError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}
