use std::sync::Arc;

use taskboard_server::engine::BoardEngine;
use tokio::net::TcpListener;

/// A running test server over a temp data directory, torn down with the
/// test.
pub struct TestServer {
    pub base_url: String,
    _tmp: tempfile::TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url.replacen("http", "ws", 1))
    }
}

/// Spawn an in-process server on 127.0.0.1:0 with a fresh (seeded) board.
pub async fn spawn_test_server() -> TestServer {
    let tmp = tempfile::tempdir().unwrap();
    let engine = Arc::new(BoardEngine::open(tmp.path()).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = taskboard_server::build_router(engine);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        _tmp: tmp,
        _handle: handle,
    }
}
