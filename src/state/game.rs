//! Match start, finish effects, and the generation-tagged timers.

use super::AppState;
use crate::error::GameError;
use crate::protocol::{RoleInfo, RoomView, ServerMessage};
use crate::types::*;
use crate::words;
use std::sync::Arc;
use std::time::Duration;

impl AppState {
    /// Host command: deal roles now, reveal them after the countdown.
    pub async fn start_game(
        self: &Arc<Self>,
        identity: &str,
    ) -> Result<Option<ServerMessage>, GameError> {
        let (code, handle) = self.room_for(identity).await?;
        let mut room = handle.lock().await;

        let entry = words::pick_random_entry();
        room.prepare_start(identity, entry)?;
        let generation = room.generation;

        let countdown = self.config.start_countdown_secs;
        let ids = Self::room_identities(&room);
        self.gateway
            .send_to_room(
                &ids,
                ServerMessage::GameStarting {
                    countdown_secs: countdown,
                },
            )
            .await;

        if countdown == 0 {
            self.activate_locked(&code, &mut room).await;
        } else {
            let state = Arc::clone(self);
            let code = code.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(countdown)).await;
                state.activate_room(&code, generation).await;
            });
        }
        Ok(None)
    }

    /// Countdown timer target. A reset, restart or destroyed room since the
    /// timer was armed makes this a no-op.
    async fn activate_room(self: &Arc<Self>, code: &str, generation: u64) {
        let Ok(handle) = self.registry.get(code).await else {
            return;
        };
        let mut room = handle.lock().await;
        if room.generation != generation || !room.pending_start {
            tracing::debug!(code = %code, "stale start timer ignored");
            return;
        }
        self.activate_locked(code, &mut room).await;
    }

    async fn activate_locked(self: &Arc<Self>, code: &str, room: &mut Room) {
        match room.activate_start() {
            Ok(()) => {
                let view = RoomView::from(&*room);
                // Role texts are secrets: one private message per seat.
                for seat in room.seats.clone() {
                    if let Some(role) = RoleInfo::for_seat(room, &seat.identity) {
                        self.gateway
                            .send_to_identity(
                                &seat.identity,
                                ServerMessage::GameStarted {
                                    role,
                                    view: view.clone(),
                                },
                            )
                            .await;
                    }
                }
                self.spawn_lobby_refresh();
                tracing::info!(code = %code, "match started");
            }
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "start aborted at activation");
                let view = RoomView::from(&*room);
                let ids = Self::room_identities(room);
                if let Some(host) = room.host() {
                    self.gateway
                        .send_to_identity(
                            &host.identity,
                            ServerMessage::Error {
                                code: e.code().to_string(),
                                msg: e.to_string(),
                            },
                        )
                        .await;
                }
                self.gateway
                    .send_to_room(&ids, ServerMessage::RoomUpdated { view })
                    .await;
            }
        }
    }

    /// A match just finished: tell the room, feed the account stats, and arm
    /// the auto-reset back to the lobby.
    pub(crate) async fn finish_effects(
        self: &Arc<Self>,
        code: &str,
        room: &mut Room,
        outcome: FinishOutcome,
    ) {
        let imposter_name = room
            .seat(&outcome.imposter)
            .map(|s| s.display_name.clone())
            .or_else(|| {
                room.participants
                    .get(&outcome.imposter)
                    .map(|p| p.display_name.clone())
            })
            .unwrap_or_else(|| outcome.imposter.clone());

        let ids = Self::room_identities(room);
        self.gateway
            .send_to_room(
                &ids,
                ServerMessage::GameFinished {
                    outcome: outcome.clone(),
                    imposter_name,
                },
            )
            .await;
        tracing::info!(
            code = %code,
            imposter_won = outcome.imposter_won,
            "match finished"
        );

        // Stats go to everyone the roles were dealt to, connected or not.
        let participants = room.turn_order.clone();
        self.accounts.record_outcome(&outcome, &participants).await;

        let delay = self.config.reset_delay_secs;
        if delay == 0 {
            self.reset_locked(code, room).await;
        } else {
            let generation = room.generation;
            let state = Arc::clone(self);
            let code = code.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(delay)).await;
                state.reset_room(&code, generation).await;
            });
        }
    }

    /// Auto-reset timer target; generation-checked like the countdown.
    pub(crate) async fn reset_room(self: &Arc<Self>, code: &str, generation: u64) {
        let Ok(handle) = self.registry.get(code).await else {
            return;
        };
        let mut room = handle.lock().await;
        if room.generation != generation || room.phase != Phase::Finished {
            tracing::debug!(code = %code, "stale reset timer ignored");
            return;
        }
        self.reset_locked(code, &mut room).await;
    }

    async fn reset_locked(self: &Arc<Self>, code: &str, room: &mut Room) {
        room.reset_to_lobby();
        let view = RoomView::from(&*room);
        let ids = Self::room_identities(room);
        self.gateway
            .send_to_room(&ids, ServerMessage::ReturnedToLobby { view })
            .await;
        self.spawn_lobby_refresh();
        tracing::info!(code = %code, "room returned to lobby");
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::Phase;

    async fn seat_four(
        state: &Arc<AppState>,
    ) -> (
        RoomCode,
        Vec<(String, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>)>,
    ) {
        let mut clients = Vec::new();
        let mut code = String::new();
        for (i, name) in ["anna", "ben", "cora", "dan"].iter().enumerate() {
            let (conn, rx) = connect(state, name).await;
            if i == 0 {
                let reply = state
                    .create_room(name, &conn, None, Visibility::Public, None)
                    .await
                    .unwrap();
                code = match reply {
                    ServerMessage::RoomCreated { code } => code,
                    other => panic!("expected RoomCreated, got {other:?}"),
                };
            } else {
                state
                    .join_room(name, &conn, &code, None, None)
                    .await
                    .unwrap();
            }
            clients.push((name.to_string(), rx));
        }
        (code, clients)
    }

    #[tokio::test]
    async fn test_start_deals_exactly_one_imposter() {
        let (state, _dir) = instant_state();
        let (_code, mut clients) = seat_four(&state).await;

        state.start_game("anna").await.unwrap();

        let mut imposters = 0;
        let mut words = Vec::new();
        for (name, rx) in &mut clients {
            let msgs = drain(rx);
            let role = msgs
                .iter()
                .find_map(|m| match m {
                    ServerMessage::GameStarted { role, .. } => Some(role.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("{name} got no GameStarted: {msgs:?}"));
            if role.is_imposter {
                imposters += 1;
                assert!(role.word.starts_with("Imposter (Tipp:"));
            } else {
                words.push(role.word);
            }
        }
        assert_eq!(imposters, 1);
        // All civilians share the identical plain word.
        assert!(words.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_start_rejected_for_non_host() {
        let (state, _dir) = instant_state();
        let (_code, _clients) = seat_four(&state).await;

        let err = state.start_game("ben").await.unwrap_err();
        assert_eq!(err.code(), "PRECONDITION");
    }

    #[tokio::test]
    async fn test_start_requires_four_seats() {
        let (state, _dir) = instant_state();
        let (conn_a, _rx) = connect(&state, "anna").await;
        state
            .create_room("anna", &conn_a, None, Visibility::Public, None)
            .await
            .unwrap();

        let err = state.start_game("anna").await.unwrap_err();
        assert!(err.to_string().contains("Mindestens 4"));
    }

    #[tokio::test]
    async fn test_started_room_leaves_the_lobby_listing() {
        let (state, _dir) = instant_state();
        let (code, _clients) = seat_four(&state).await;

        state.start_game("anna").await.unwrap();

        match state.lobby_snapshot().await {
            ServerMessage::LobbyUpdated { rooms } => {
                assert!(rooms.iter().all(|r| r.code != code));
            }
            other => panic!("expected LobbyUpdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_reset_timer_is_a_noop() {
        let (state, _dir) = instant_state();
        let (code, _clients) = seat_four(&state).await;
        state.start_game("anna").await.unwrap();

        let handle = state.registry.get(&code).await.unwrap();
        let stale_generation = {
            let room = handle.lock().await;
            assert_eq!(room.phase, Phase::Playing);
            room.generation
        };

        // A reset armed against a different generation never fires.
        state.reset_room(&code, stale_generation + 1).await;
        assert_eq!(handle.lock().await.phase, Phase::Playing);

        // Even with the right generation, a non-finished room stays put.
        state.reset_room(&code, stale_generation).await;
        assert_eq!(handle.lock().await.phase, Phase::Playing);
    }

    #[tokio::test]
    async fn test_timer_against_destroyed_room_is_a_noop() {
        let (state, _dir) = instant_state();
        let (code, clients) = seat_four(&state).await;
        for (name, _) in &clients {
            state.leave_room(name).await.unwrap();
        }
        assert_eq!(state.registry.room_count().await, 0);

        // Fires into nothing, must not panic or resurrect the room.
        state.reset_room(&code, 0).await;
        assert_eq!(state.registry.room_count().await, 0);
    }
}
