pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Session token from `POST /api/login` or `/api/register`.
    pub token: Option<String>,
}

/// WebSocket upgrade handler. Connections without a valid session are
/// rejected before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let identity = match &params.token {
        Some(token) => state.accounts.identity_for(token).await,
        None => None,
    };
    let Some(identity) = identity else {
        return (StatusCode::UNAUTHORIZED, "Login erforderlich").into_response();
    };

    tracing::info!(identity = %identity, "WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
        .into_response()
}

/// Handle one WebSocket connection for one identity.
async fn handle_socket(socket: WebSocket, identity: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let conn = ulid::Ulid::new().to_string();

    // One active session per identity: tell the previous connection it has
    // been displaced, then take over its outbox.
    if state
        .identities
        .bind(&identity, conn.clone())
        .await
        .is_some()
    {
        state
            .gateway
            .send_to_identity(&identity, ServerMessage::SessionReplaced)
            .await;
    }
    let mut outbox = state.gateway.register(&identity).await;
    let mut lobby = state.gateway.subscribe_lobby();

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        identity: identity.clone(),
        server_now: AppState::now(),
    };
    for msg in [welcome, state.lobby_snapshot().await] {
        if let Ok(json) = serde_json::to_string(&msg) {
            if sender.send(Message::Text(json.into())).await.is_err() {
                tracing::error!("Failed to send welcome message");
                return;
            }
        }
    }

    loop {
        tokio::select! {
            // Room-scoped and private messages for this identity
            out = outbox.recv() => {
                match out {
                    Some(msg) => {
                        let replaced = matches!(msg, ServerMessage::SessionReplaced);
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        if replaced {
                            break;
                        }
                    }
                    // Outbox replaced by a newer connection.
                    None => break,
                }
            }

            // Lobby fan-out (room list refreshes)
            lobby_msg = lobby.recv() => {
                if let Ok(msg) = lobby_msg {
                    if let Ok(json) = serde_json::to_string(&msg) {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }

            // Client commands
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(identity = %identity, "received: {}", text);
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &identity, &conn, &state)
                                        .await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(identity = %identity, "WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Teardown only if this connection still owns the identity. A stale
    // socket outlived by a reconnect must not tear the new session down.
    if state.identities.resolve(&conn).await.as_deref() == Some(identity.as_str()) {
        state.disconnect(&identity).await;
        state.gateway.unregister(&identity).await;
        state.identities.unbind_conn(&conn).await;
        tracing::info!(identity = %identity, "WebSocket connection closed");
    } else {
        tracing::debug!(identity = %identity, "stale connection closed after reconnect");
    }
}
