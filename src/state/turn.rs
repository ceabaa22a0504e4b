//! Clue submission.

use super::AppState;
use crate::error::GameError;
use crate::protocol::{RoomView, ServerMessage};
use crate::room::ClueOutcome;
use std::sync::Arc;

impl AppState {
    pub async fn submit_clue(
        self: &Arc<Self>,
        identity: &str,
        text: &str,
    ) -> Result<Option<ServerMessage>, GameError> {
        let (code, handle) = self.room_for(identity).await?;
        let mut room = handle.lock().await;

        let outcome = room.submit_clue(identity, text)?;
        match outcome {
            ClueOutcome::Accepted { .. } | ClueOutcome::RoundComplete => {
                let view = RoomView::from(&*room);
                let ids = Self::room_identities(&room);
                self.gateway
                    .send_to_room(&ids, ServerMessage::ClueSubmitted { view })
                    .await;
            }
            ClueOutcome::ImposterGuessed(finish) => {
                self.finish_effects(&code, &mut room, finish).await;
            }
        }
        Ok(None)
    }
}
