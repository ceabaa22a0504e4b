mod game;
mod lobby;
mod turn;
mod vote;

use crate::accounts::AccountStore;
use crate::error::GameError;
use crate::gateway::BroadcastGateway;
use crate::identity::IdentityDirectory;
use crate::protocol::ServerMessage;
use crate::registry::{RoomHandle, RoomRegistry};
use crate::types::*;

/// Shared application state. Injected into the network layer; every room
/// command resolves its room here, locks it, applies the pure transition
/// from `room.rs`, and emits the resulting broadcasts.
pub struct AppState {
    pub config: GameConfig,
    pub registry: RoomRegistry,
    pub identities: IdentityDirectory,
    pub gateway: BroadcastGateway,
    pub accounts: AccountStore,
}

impl AppState {
    pub fn new(config: GameConfig, accounts: AccountStore) -> Self {
        Self {
            registry: RoomRegistry::new(config.clone()),
            identities: IdentityDirectory::new(),
            gateway: BroadcastGateway::new(),
            accounts,
            config,
        }
    }

    pub(crate) fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// The room this identity currently occupies.
    pub(crate) async fn room_for(
        &self,
        identity: &str,
    ) -> Result<(RoomCode, RoomHandle), GameError> {
        let code = self
            .identities
            .room_of(identity)
            .await
            .ok_or_else(|| GameError::precondition("Du bist in keinem Raum"))?;
        let handle = self.registry.get(&code).await?;
        Ok((code, handle))
    }

    pub(crate) fn room_identities(room: &Room) -> Vec<Identity> {
        room.seats.iter().map(|s| s.identity.clone()).collect()
    }

    pub async fn lobby_snapshot(&self) -> ServerMessage {
        ServerMessage::LobbyUpdated {
            rooms: self.registry.list_open_rooms().await,
        }
    }

    /// Refresh the room list for everyone, including clients not in a room.
    /// Must not be called while holding a room lock: the snapshot locks
    /// every room in turn.
    pub async fn broadcast_lobby(&self) {
        let snapshot = self.lobby_snapshot().await;
        self.gateway.send_to_all(snapshot);
    }

    /// Lock-safe variant for call sites that still hold a room lock: the
    /// refresh runs once the current command has released it.
    pub(crate) fn spawn_lobby_refresh(self: &std::sync::Arc<Self>) {
        let state = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            state.broadcast_lobby().await;
        });
    }
}
