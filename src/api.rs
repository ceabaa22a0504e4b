//! HTTP endpoints for account registration, login, and profiles.
//!
//! The session token returned here authenticates the WebSocket upgrade
//! (`/ws?token=...`). The match core never touches these routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::GameError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
}

fn error_response(status: StatusCode, e: &GameError) -> Response {
    (
        status,
        Json(serde_json::json!({ "code": e.code(), "msg": e.to_string() })),
    )
        .into_response()
}

fn default_status(e: &GameError) -> StatusCode {
    match e {
        GameError::Validation(_) => StatusCode::BAD_REQUEST,
        GameError::Precondition(_) => StatusCode::CONFLICT,
        GameError::NotFound(_) => StatusCode::NOT_FOUND,
        GameError::RuleViolation(_) => StatusCode::FORBIDDEN,
    }
}

/// POST /api/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    match state.accounts.register(&req.name, &req.password).await {
        Ok(token) => Json(SessionResponse { token }).into_response(),
        Err(e) => error_response(default_status(&e), &e),
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    match state.accounts.login(&req.name, &req.password).await {
        Ok(token) => Json(SessionResponse { token }).into_response(),
        // Wrong credentials are a 401 here, not the generic mapping.
        Err(e @ GameError::Precondition(_)) => error_response(StatusCode::UNAUTHORIZED, &e),
        Err(e) => error_response(default_status(&e), &e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub token: String,
    pub avatar: Option<String>,
}

/// POST /api/avatar
pub async fn set_avatar(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AvatarRequest>,
) -> Response {
    match state.accounts.set_avatar(&req.token, req.avatar).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e @ GameError::Precondition(_)) => error_response(StatusCode::UNAUTHORIZED, &e),
        Err(e) => error_response(default_status(&e), &e),
    }
}

/// GET /api/profile/{name}
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.accounts.profile(&name).await {
        Some(profile) => Json(profile).into_response(),
        None => {
            let e = GameError::not_found("Unbekannter Account");
            error_response(StatusCode::NOT_FOUND, &e)
        }
    }
}
