//! Ballot submission and tally effects.

use super::AppState;
use crate::error::GameError;
use crate::protocol::{RoleInfo, RoomView, ServerMessage};
use crate::room::VoteOutcome;
use crate::types::*;
use std::sync::Arc;

impl AppState {
    pub async fn submit_vote(
        self: &Arc<Self>,
        identity: &str,
        kind: VoteKind,
    ) -> Result<Option<ServerMessage>, GameError> {
        let (code, handle) = self.room_for(identity).await?;
        let mut room = handle.lock().await;

        let outcome = room.submit_vote(identity, kind)?;
        self.handle_vote_outcome(&code, &mut room, outcome).await;
        Ok(None)
    }

    /// Broadcast whatever a tally decided. Also reached from the leave path
    /// when a departure completed a pending tally.
    pub(crate) async fn handle_vote_outcome(
        self: &Arc<Self>,
        code: &str,
        room: &mut Room,
        outcome: VoteOutcome,
    ) {
        let ids = Self::room_identities(room);
        match outcome {
            VoteOutcome::Recorded { .. } | VoteOutcome::GuessPhaseOpened => {
                let view = RoomView::from(&*room);
                self.gateway
                    .send_to_room(&ids, ServerMessage::VoteUpdated { view })
                    .await;
            }
            VoteOutcome::RoundAdvanced { hint_upgraded, .. } => {
                let view = RoomView::from(&*room);
                self.gateway
                    .send_to_room(&ids, ServerMessage::RoundAdvanced { view })
                    .await;
                if hint_upgraded {
                    self.send_imposter_role(room).await;
                }
            }
            VoteOutcome::NoElimination => {
                let view = RoomView::from(&*room);
                self.gateway
                    .send_to_room(&ids, ServerMessage::RoundAdvanced { view })
                    .await;
            }
            VoteOutcome::Eliminated { ref target, .. } => {
                tracing::info!(code = %code, target = %target, "seat voted out");
                let view = RoomView::from(&*room);
                self.gateway
                    .send_to_room(&ids, ServerMessage::RoundAdvanced { view })
                    .await;
                // Elimination bumped the round; the hint tier may have grown.
                self.send_imposter_role(room).await;
            }
            VoteOutcome::Finished(finish) => {
                self.finish_effects(code, room, finish).await;
            }
        }
    }

    async fn send_imposter_role(self: &Arc<Self>, room: &Room) {
        let Some(imposter) = room.imposter.clone() else {
            return;
        };
        if let Some(role) = RoleInfo::for_seat(room, &imposter) {
            self.gateway
                .send_to_identity(&imposter, ServerMessage::RoleUpdated { role })
                .await;
        }
    }
}
