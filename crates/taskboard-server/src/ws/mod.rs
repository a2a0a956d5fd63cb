//! WebSocket gateway: the push-message mutation path and the broadcast hub
//! that reconciles every connected peer after a mutation.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod types;

pub use broadcaster::{BroadcastReceiver, Broadcaster};
pub use types::{ClientMessage, ServerEvent, TaskRef, WsError};
