//! Room registry: owns the set of live matches.
//!
//! Each room sits behind its own `Mutex`, so every mutation of one room is
//! serialized without blocking the others; the outer map lock is only held
//! long enough to resolve a code to a handle.

use crate::error::GameError;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion).
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

pub type RoomHandle = Arc<Mutex<Room>>;

pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: GameConfig,
}

impl RoomRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Create a room under a fresh code.
    pub async fn create_room(
        &self,
        visibility: Visibility,
        secret: Option<String>,
    ) -> (RoomCode, RoomHandle) {
        let mut rooms = self.rooms.write().await;

        // Collision retry; practically unreachable with ~28M codes.
        let code = loop {
            let candidate = generate_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room::new(code.clone(), visibility, secret, self.config.clone());
        let handle = Arc::new(Mutex::new(room));
        rooms.insert(code.clone(), handle.clone());
        tracing::info!(code = %code, "room created");
        (code, handle)
    }

    pub async fn get(&self, code: &str) -> Result<RoomHandle, GameError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| GameError::not_found("Raum nicht gefunden"))
    }

    /// Lobby listing: rooms still waiting for a match to start, private ones
    /// included (the secret is checked on join, not on listing).
    pub async fn list_open_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let room = handle.lock().await;
            if room.phase == Phase::Waiting {
                summaries.push(room.summary());
            }
        }
        summaries.sort_by(|a, b| a.code.cmp(&b.code));
        summaries
    }

    /// Drop the room if its seat list is empty. Returns whether it did.
    pub async fn delete_if_empty(&self, code: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(handle) = rooms.get(code) else {
            return false;
        };
        let empty = handle.lock().await.seats.is_empty();
        if empty {
            rooms.remove(code);
            tracing::info!(code = %code, "room destroyed");
        }
        empty
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
