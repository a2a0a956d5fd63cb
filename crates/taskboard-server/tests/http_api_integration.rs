//! Integration tests for the HTTP mutation path against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 over a temp
//! data directory, then exercises the full request/response cycle.

mod common;

use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use taskboard_core::{Priority, Status, Task};

use common::spawn_test_server;

fn png_part(bytes: &'static [u8]) -> Part {
    Part::bytes(bytes)
        .file_name("pic.png")
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let server = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn board_starts_with_seed_tasks() {
    let server = spawn_test_server().await;
    let tasks: Vec<Task> = reqwest::get(format!("{}/api/tasks", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().any(|t| t.title == "Implement Login Feature"));
}

#[tokio::test]
async fn task_crud_roundtrip() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    // Create
    let resp = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "My Task", "priority": "high" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let task: Task = resp.json().await.unwrap();
    assert_eq!(task.title, "My Task");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.status, Status::ToDo);
    assert_eq!(task.created_at, task.updated_at);

    // Get
    let fetched: Task = client
        .get(format!("{}/api/tasks/{}", server.base_url, task.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.id, task.id);

    // Update merges only supplied fields
    let updated: Task = client
        .put(format!("{}/api/tasks/{}", server.base_url, task.id))
        .json(&json!({ "description": "now with details" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.title, "My Task");
    assert_eq!(updated.description, "now with details");
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at > task.updated_at);

    // Delete
    let resp = client
        .delete(format!("{}/api/tasks/{}", server.base_url, task.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Task deleted successfully");

    let resp = client
        .get(format!("{}/api/tasks/{}", server.base_url, task.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn create_with_blank_title_is_rejected() {
    let server = spawn_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn unknown_task_returns_not_found() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{}/api/tasks/unknown-id", server.base_url))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{}/api/tasks/unknown-id", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn move_validates_the_status_set() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "A", "status": "to-do" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Valid move
    let moved: Task = client
        .put(format!("{}/api/tasks/{}/move", server.base_url, task.id))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved.status, Status::Done);
    assert!(moved.updated_at > task.created_at);

    // Out-of-set status is a client error and mutates nothing
    let resp = client
        .put(format!("{}/api/tasks/{}/move", server.base_url, task.id))
        .json(&json!({ "status": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let current: Task = client
        .get(format!("{}/api/tasks/{}", server.base_url, task.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current.status, Status::Done);
    assert_eq!(current.updated_at, moved.updated_at);
}

#[tokio::test]
async fn attachment_upload_serve_and_remove() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "With file" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let form = Form::new().part("attachment", png_part(b"png-bytes"));
    let resp = client
        .post(format!(
            "{}/api/tasks/{}/attachments",
            server.base_url, task.id
        ))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let attachment_id = body["attachment"]["id"].as_str().unwrap().to_string();
    let path = body["attachment"]["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/"));
    assert_eq!(body["attachment"]["originalName"], "pic.png");
    assert_eq!(body["task"]["attachments"].as_array().unwrap().len(), 1);

    // The stored file resolves at its public path
    let resp = reqwest::get(format!("{}{path}", server.base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"png-bytes");

    // Remove it again
    let resp = client
        .delete(format!(
            "{}/api/tasks/{}/attachments/{attachment_id}",
            server.base_url, task.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Attachment removed successfully");
    assert!(body["task"]["attachments"].as_array().unwrap().is_empty());

    // The public path no longer resolves
    let resp = reqwest::get(format!("{}{path}", server.base_url)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn text_plain_upload_is_rejected_without_task_change() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "No text files" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let part = Part::bytes(b"hello".as_slice())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let resp = client
        .post(format!(
            "{}/api/tasks/{}/attachments",
            server.base_url, task.id
        ))
        .multipart(Form::new().part("attachment", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let current: Task = client
        .get(format!("{}/api/tasks/{}", server.base_url, task.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(current.attachments.is_empty());
    assert_eq!(current.updated_at, task.updated_at);
}

#[tokio::test]
async fn upload_without_attachment_field_is_a_client_error() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .json(&json!({ "title": "T" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let form = Form::new().text("something-else", "value");
    let resp = client
        .post(format!(
            "{}/api/tasks/{}/attachments",
            server.base_url, task.id
        ))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_to_unknown_task_returns_not_found() {
    let server = spawn_test_server().await;
    let form = Form::new().part("attachment", png_part(b"img"));
    let resp = reqwest::Client::new()
        .post(format!("{}/api/tasks/unknown-id/attachments", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
