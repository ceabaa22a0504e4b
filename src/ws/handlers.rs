//! WebSocket message dispatch.
//!
//! Commands are routed to the matching room command on `AppState`; every
//! error is reported back to the originating connection only, as a
//! structured `Error` message.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle a client message and return the direct reply, if any. Broadcasts
/// to the room and the lobby happen inside the state commands.
pub async fn handle_message(
    msg: ClientMessage,
    identity: &str,
    conn: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::CreateRoom {
            name,
            visibility,
            secret,
        } => state
            .create_room(identity, conn, name, visibility, secret)
            .await
            .map(Some),

        ClientMessage::JoinRoom { code, name, secret } => state
            .join_room(identity, conn, &code, name, secret)
            .await
            .map(Some),

        ClientMessage::LeaveRoom => state.leave_room(identity).await.map(Some),

        ClientMessage::ListRooms => Ok(Some(state.list_rooms().await)),

        ClientMessage::StartGame => state.start_game(identity).await,

        ClientMessage::SubmitClue { text } => state.submit_clue(identity, &text).await,

        ClientMessage::SubmitVote { vote } => state.submit_vote(identity, vote).await,
    };

    match result {
        Ok(reply) => reply,
        Err(e) => Some(ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountStore;
    use crate::types::{GameConfig, Visibility};

    fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let config = GameConfig {
            start_countdown_secs: 0,
            reset_delay_secs: 0,
            ..GameConfig::default()
        };
        let accounts = AccountStore::open(dir.path()).unwrap();
        Arc::new(AppState::new(config, accounts))
    }

    #[tokio::test]
    async fn test_create_room_replies_with_code() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.identities.bind("anna", "conn-1".to_string()).await;

        let reply = handle_message(
            ClientMessage::CreateRoom {
                name: None,
                visibility: Visibility::Public,
                secret: None,
            },
            "anna",
            "conn-1",
            &state,
        )
        .await;

        match reply {
            Some(ServerMessage::RoomCreated { code }) => assert_eq!(code.len(), 5),
            other => panic!("expected RoomCreated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_errors_become_structured_messages() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.identities.bind("anna", "conn-1".to_string()).await;

        let reply = handle_message(
            ClientMessage::SubmitClue {
                text: "hm".to_string(),
            },
            "anna",
            "conn-1",
            &state,
        )
        .await;

        match reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "PRECONDITION"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        state.identities.bind("anna", "conn-1".to_string()).await;

        let reply = handle_message(
            ClientMessage::JoinRoom {
                code: "XXXXX".to_string(),
                name: None,
                secret: None,
            },
            "anna",
            "conn-1",
            &state,
        )
        .await;

        match reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_FOUND"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_rooms_always_replies() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let reply = handle_message(ClientMessage::ListRooms, "anna", "conn-1", &state).await;
        assert!(matches!(
            reply,
            Some(ServerMessage::LobbyUpdated { rooms }) if rooms.is_empty()
        ));
    }
}
