use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
    routing::get,
    Router,
};
use tracing::debug;

use crate::routes::AppState;
use crate::ws::connection::Connection;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(handle_upgrade))
}

async fn handle_upgrade(ws: WebSocketUpgrade, State(engine): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let receiver = engine.hub().subscribe();
        let connection = Connection::new(socket, receiver, engine);
        if let Err(e) = connection.run().await {
            debug!("websocket connection ended: {e}");
        }
    })
}
