//! Room membership commands: create, join, leave, disconnect, listing.

use super::AppState;
use crate::error::GameError;
use crate::protocol::{RoleInfo, RoomView, ServerMessage};
use crate::room::Settled;
use crate::types::*;
use std::sync::Arc;

impl AppState {
    pub async fn create_room(
        self: &Arc<Self>,
        identity: &str,
        conn: &str,
        name: Option<String>,
        visibility: Visibility,
        secret: Option<String>,
    ) -> Result<ServerMessage, GameError> {
        if self.identities.is_in_any_room(identity).await {
            return Err(GameError::precondition("Du bist bereits in einem Raum"));
        }

        let (code, handle) = self.registry.create_room(visibility, secret).await;
        let mut room = handle.lock().await;

        let display_name = name.unwrap_or_else(|| identity.to_string());
        let room_secret = room.secret.clone();
        if let Err(e) = room.join(
            identity,
            &display_name,
            conn.to_string(),
            room_secret.as_deref(),
        ) {
            // Never leave an empty shell behind in the registry.
            drop(room);
            self.registry.delete_if_empty(&code).await;
            return Err(e);
        }
        self.identities.mark_in_room(identity, &code).await;

        let view = RoomView::from(&*room);
        let ids = Self::room_identities(&room);
        drop(room);

        self.gateway
            .send_to_room(&ids, ServerMessage::RoomUpdated { view })
            .await;
        self.broadcast_lobby().await;
        tracing::info!(code = %code, host = %identity, "room opened");

        Ok(ServerMessage::RoomCreated { code })
    }

    pub async fn join_room(
        self: &Arc<Self>,
        identity: &str,
        conn: &str,
        code: &str,
        name: Option<String>,
        secret: Option<String>,
    ) -> Result<ServerMessage, GameError> {
        if let Some(current) = self.identities.room_of(identity).await {
            if current != code {
                return Err(GameError::precondition(
                    "Du bist bereits in einem anderen Raum",
                ));
            }
        }

        let handle = self.registry.get(code).await?;
        let mut room = handle.lock().await;

        let display_name = name.unwrap_or_else(|| identity.to_string());
        let outcome = room.join(
            identity,
            &display_name,
            conn.to_string(),
            secret.as_deref(),
        )?;
        self.identities.mark_in_room(identity, code).await;

        let view = RoomView::from(&*room);
        let ids = Self::room_identities(&room);
        let role = RoleInfo::for_seat(&room, identity);
        drop(room);

        self.gateway
            .send_to_room(
                &ids,
                ServerMessage::RoomUpdated { view: view.clone() },
            )
            .await;
        // Rejoiners get their secret role back on a private lane.
        if let Some(role) = role {
            self.gateway
                .send_to_identity(identity, ServerMessage::RoleUpdated { role })
                .await;
        }
        self.broadcast_lobby().await;
        tracing::debug!(code = %code, identity = %identity, ?outcome, "joined room");

        Ok(ServerMessage::RoomJoined {
            code: code.to_string(),
            view,
        })
    }

    pub async fn leave_room(
        self: &Arc<Self>,
        identity: &str,
    ) -> Result<ServerMessage, GameError> {
        let (code, handle) = self.room_for(identity).await?;
        let mut room = handle.lock().await;

        let Some(removed) = room.remove_seat(identity) else {
            // Directory said "in room" but no seat exists; heal the mapping.
            drop(room);
            self.identities.clear_room(identity).await;
            return Err(GameError::precondition("Du bist in keinem Raum"));
        };
        self.identities.clear_room(identity).await;

        if removed.now_empty {
            drop(room);
            self.registry.delete_if_empty(&code).await;
            self.broadcast_lobby().await;
            return Ok(self.lobby_snapshot().await);
        }

        // The departure may have been the last thing a round or tally was
        // waiting on.
        let settled = room.settle_after_departure();
        let view = RoomView::from(&*room);
        let ids = Self::room_identities(&room);
        self.gateway
            .send_to_room(&ids, ServerMessage::RoomUpdated { view })
            .await;
        if let Some(Settled::Vote(outcome)) = settled {
            self.handle_vote_outcome(&code, &mut room, outcome).await;
        }
        drop(room);

        self.broadcast_lobby().await;
        tracing::debug!(code = %code, identity = %identity, "left room");
        Ok(self.lobby_snapshot().await)
    }

    /// Transport drop: same path as an explicit leave, errors swallowed.
    /// The identity stays a participant of its room and may rejoin.
    pub async fn disconnect(self: &Arc<Self>, identity: &str) {
        if let Err(e) = self.leave_room(identity).await {
            tracing::debug!(identity = %identity, error = %e, "disconnect without a room");
        }
    }

    pub async fn list_rooms(self: &Arc<Self>) -> ServerMessage {
        self.lobby_snapshot().await
    }
}
