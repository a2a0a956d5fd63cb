pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::engine::BoardEngine;
use crate::ws;

pub type AppState = Arc<BoardEngine>;

pub fn build_router(engine: AppState) -> Router {
    // Room for multipart framing on top of the 5 MiB attachment cap.
    let body_limit = taskboard_store::MAX_ATTACHMENT_BYTES as usize + 1024 * 1024;

    Router::new()
        .merge(health::routes())
        .merge(tasks::routes())
        .merge(ws::handler::routes())
        .nest_service("/uploads", ServeDir::new(engine.uploads_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}
