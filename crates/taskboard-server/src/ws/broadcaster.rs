use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::ws::types::{ServerEvent, WsError};

const BROADCAST_CAPACITY: usize = 256;

/// Fan-out channel over the set of currently connected peers. Delivery is
/// fire-and-forget and at-most-once: a peer that lags past the channel
/// capacity is dropped rather than allowed to block anyone else, and
/// nothing is replayed to peers that connect later.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<ServerEvent>,
    peer_count: Arc<AtomicUsize>,
}

impl Broadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            sender,
            peer_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a new peer for event delivery.
    pub fn subscribe(&self) -> BroadcastReceiver {
        self.peer_count.fetch_add(1, Ordering::SeqCst);
        debug!(peer_count = self.peer_count(), "peer subscribed");
        BroadcastReceiver {
            inner: self.sender.subscribe(),
            peer_count: Arc::clone(&self.peer_count),
        }
    }

    /// Deliver an event to every connected peer. An empty peer set is not
    /// an error.
    pub fn broadcast(&self, event: ServerEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "event broadcast"),
            Err(_) => debug!(event = name, "no peers connected, event dropped"),
        }
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peer_count.load(Ordering::SeqCst)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// One peer's subscription; dropping it removes the peer from the count.
pub struct BroadcastReceiver {
    inner: broadcast::Receiver<ServerEvent>,
    peer_count: Arc<AtomicUsize>,
}

impl BroadcastReceiver {
    /// Receive the next event. A lagged receiver is treated as closed: the
    /// peer missed events and must resync via snapshot rather than limp on.
    pub async fn recv(&mut self) -> Result<ServerEvent, WsError> {
        self.inner.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => WsError::ChannelClosed,
            broadcast::error::RecvError::Lagged(skipped) => {
                warn!(skipped, "peer lagged behind broadcast, disconnecting");
                WsError::ChannelClosed
            }
        })
    }
}

impl Drop for BroadcastReceiver {
    fn drop(&mut self) {
        self.peer_count.fetch_sub(1, Ordering::SeqCst);
        debug!(
            peer_count = self.peer_count.load(Ordering::SeqCst),
            "peer unsubscribed"
        );
    }
}
