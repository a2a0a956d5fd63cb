use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::BoardEngine;
use crate::ws::broadcaster::BroadcastReceiver;
use crate::ws::types::{ClientMessage, ServerEvent, WsError};

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// One peer's connection: forwards hub events to the socket, dispatches
/// pushed mutation intents to the engine, and answers snapshot requests.
pub struct Connection {
    peer_id: String,
    socket: WebSocket,
    receiver: BroadcastReceiver,
    engine: Arc<BoardEngine>,
}

impl Connection {
    pub fn new(socket: WebSocket, receiver: BroadcastReceiver, engine: Arc<BoardEngine>) -> Self {
        let peer_id = Uuid::new_v4().to_string();
        info!(peer_id, "peer connected");
        Self {
            peer_id,
            socket,
            receiver,
            engine,
        }
    }

    /// Run the connection until the peer leaves. A new peer is synced with
    /// the full current state before anything else.
    pub async fn run(mut self) -> Result<(), WsError> {
        self.send_snapshot().await?;

        let mut ping = interval(PING_INTERVAL);
        loop {
            tokio::select! {
                incoming = self.socket.recv() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if self.handle_incoming(msg).await? {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            debug!(peer_id = self.peer_id, "socket error: {e}");
                            return Err(WsError::Socket(e));
                        }
                        None => {
                            debug!(peer_id = self.peer_id, "stream ended");
                            break;
                        }
                    }
                }

                event = self.receiver.recv() => {
                    match event {
                        Ok(event) => self.send_event(&event).await?,
                        Err(WsError::ChannelClosed) => {
                            debug!(peer_id = self.peer_id, "broadcast channel closed");
                            break;
                        }
                        Err(e) => warn!(peer_id = self.peer_id, "broadcast receive error: {e}"),
                    }
                }

                _ = ping.tick() => {
                    self.socket
                        .send(Message::Ping(Bytes::new()))
                        .await
                        .map_err(WsError::Socket)?;
                }
            }
        }

        debug!(peer_id = self.peer_id, "closing");
        let _ = self.socket.send(Message::Close(None)).await;
        info!(peer_id = self.peer_id, "peer disconnected");
        Ok(())
    }

    /// Returns `true` when the peer asked to close.
    async fn handle_incoming(&mut self, message: Message) -> Result<bool, WsError> {
        match message {
            Message::Text(text) => {
                self.dispatch(text.as_str()).await?;
                Ok(false)
            }
            Message::Binary(_) => {
                warn!(peer_id = self.peer_id, "unexpected binary frame dropped");
                Ok(false)
            }
            Message::Ping(data) => {
                self.socket
                    .send(Message::Pong(data))
                    .await
                    .map_err(WsError::Socket)?;
                Ok(false)
            }
            Message::Pong(_) => Ok(false),
            Message::Close(_) => {
                debug!(peer_id = self.peer_id, "peer initiated close");
                Ok(true)
            }
        }
    }

    /// Pushed mutations are fire-and-forget for the sender: malformed or
    /// failing messages are logged and dropped, never answered and never
    /// fatal to the connection. The sender observes its own successful
    /// mutations through the broadcast like everyone else.
    async fn dispatch(&mut self, text: &str) -> Result<(), WsError> {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(peer_id = self.peer_id, "dropping malformed message: {e}");
                return Ok(());
            }
        };

        match message {
            ClientMessage::TaskCreate(input) => {
                if let Err(e) = self.engine.create_task(input).await {
                    warn!(peer_id = self.peer_id, "task:create dropped: {e}");
                }
            }
            ClientMessage::TaskUpdate(patch) => {
                if let Err(e) = self.engine.update_task(&patch.id, patch.fields).await {
                    warn!(peer_id = self.peer_id, "task:update dropped: {e}");
                }
            }
            ClientMessage::TaskDelete(r) => {
                if let Err(e) = self.engine.delete_task(&r.id).await {
                    warn!(peer_id = self.peer_id, "task:delete dropped: {e}");
                }
            }
            ClientMessage::TaskMove(request) => {
                let input = taskboard_core::MoveTask {
                    status: request.status,
                };
                if let Err(e) = self.engine.move_task(&request.id, input).await {
                    warn!(peer_id = self.peer_id, "task:move dropped: {e}");
                }
            }
            ClientMessage::SyncRequest => {
                // Peer-scoped: only the requester gets the snapshot.
                self.send_snapshot().await?;
            }
        }
        Ok(())
    }

    async fn send_snapshot(&mut self) -> Result<(), WsError> {
        let tasks = self.engine.snapshot().await;
        self.send_event(&ServerEvent::SyncTasks(tasks)).await
    }

    async fn send_event(&mut self, event: &ServerEvent) -> Result<(), WsError> {
        let payload = serde_json::to_string(event)?;
        self.socket
            .send(Message::Text(payload.into()))
            .await
            .map_err(WsError::Socket)
    }
}
