//! Broadcast gateway: delivery of server messages to connected clients.
//!
//! Two lanes, mirroring what the room commands need: a process-wide lobby
//! channel every connection subscribes to, and a per-identity outbox for
//! room-scoped and private messages. Delivery is fire-and-forget; a closed
//! or lagging receiver never propagates an error into the state machine.

use crate::protocol::ServerMessage;
use crate::types::Identity;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, RwLock};

pub struct BroadcastGateway {
    lobby: broadcast::Sender<ServerMessage>,
    outboxes: RwLock<HashMap<Identity, mpsc::UnboundedSender<ServerMessage>>>,
}

impl BroadcastGateway {
    pub fn new() -> Self {
        let (lobby, _rx) = broadcast::channel(100);
        Self {
            lobby,
            outboxes: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to the lobby lane (every connection does this once).
    pub fn subscribe_lobby(&self) -> broadcast::Receiver<ServerMessage> {
        self.lobby.subscribe()
    }

    /// Open the identity's outbox. A previous outbox for the same identity
    /// is replaced; its receiver sees the channel close and shuts down.
    pub async fn register(&self, identity: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outboxes.write().await.insert(identity.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, identity: &str) {
        self.outboxes.write().await.remove(identity);
    }

    pub async fn send_to_identity(&self, identity: &str, msg: ServerMessage) {
        if let Some(tx) = self.outboxes.read().await.get(identity) {
            let _ = tx.send(msg);
        }
    }

    pub async fn send_to_room(&self, identities: &[Identity], msg: ServerMessage) {
        let outboxes = self.outboxes.read().await;
        for identity in identities {
            if let Some(tx) = outboxes.get(identity) {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Lobby-wide fan-out (room list refreshes).
    pub fn send_to_all(&self, msg: ServerMessage) {
        let _ = self.lobby.send(msg);
    }
}

impl Default for BroadcastGateway {
    fn default() -> Self {
        Self::new()
    }
}
