//! Identity directory: stable identity to volatile transport binding.
//!
//! Enforces one active session per identity and remembers which room an
//! identity currently occupies. Reconnection races resolve here: binding a
//! newer transport handle displaces the older one, and the older socket's
//! teardown becomes a no-op because it no longer owns the identity.

use crate::types::{ConnId, Identity, RoomCode};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Binding {
    conn: ConnId,
    room: Option<RoomCode>,
}

#[derive(Default)]
pub struct IdentityDirectory {
    bindings: RwLock<HashMap<Identity, Binding>>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a transport handle to an identity. Returns the handle it
    /// displaced, which the caller must force-close before trusting the new
    /// one.
    pub async fn bind(&self, identity: &str, conn: ConnId) -> Option<ConnId> {
        let mut bindings = self.bindings.write().await;
        match bindings.get_mut(identity) {
            Some(binding) => {
                let old = std::mem::replace(&mut binding.conn, conn);
                Some(old)
            }
            None => {
                bindings.insert(
                    identity.to_string(),
                    Binding { conn, room: None },
                );
                None
            }
        }
    }

    /// The identity a transport handle currently speaks for, if it still
    /// owns one.
    pub async fn resolve(&self, conn: &str) -> Option<Identity> {
        self.bindings
            .read()
            .await
            .iter()
            .find(|(_, b)| b.conn == conn)
            .map(|(id, _)| id.clone())
    }

    /// Drop a binding, but only if the given handle still owns it. A stale
    /// handle from before a reconnect changes nothing.
    pub async fn unbind_conn(&self, conn: &str) {
        self.bindings.write().await.retain(|_, b| b.conn != conn);
    }

    pub async fn mark_in_room(&self, identity: &str, code: &str) {
        if let Some(binding) = self.bindings.write().await.get_mut(identity) {
            binding.room = Some(code.to_string());
        }
    }

    pub async fn clear_room(&self, identity: &str) {
        if let Some(binding) = self.bindings.write().await.get_mut(identity) {
            binding.room = None;
        }
    }

    pub async fn room_of(&self, identity: &str) -> Option<RoomCode> {
        self.bindings
            .read()
            .await
            .get(identity)
            .and_then(|b| b.room.clone())
    }

    pub async fn is_in_any_room(&self, identity: &str) -> bool {
        self.room_of(identity).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_displaces_older_handle() {
        let dir = IdentityDirectory::new();
        assert_eq!(dir.bind("anna", "conn-1".to_string()).await, None);
        assert_eq!(
            dir.bind("anna", "conn-2".to_string()).await,
            Some("conn-1".to_string())
        );
        assert_eq!(dir.resolve("conn-2").await.as_deref(), Some("anna"));
        assert_eq!(dir.resolve("conn-1").await, None);
    }

    #[tokio::test]
    async fn test_stale_unbind_is_a_noop() {
        let dir = IdentityDirectory::new();
        dir.bind("anna", "conn-1".to_string()).await;
        dir.mark_in_room("anna", "ABCDE").await;
        dir.bind("anna", "conn-2".to_string()).await;

        // The old socket closing must not tear down the new session.
        dir.unbind_conn("conn-1").await;
        assert_eq!(dir.resolve("conn-2").await.as_deref(), Some("anna"));
        assert_eq!(dir.room_of("anna").await.as_deref(), Some("ABCDE"));

        dir.unbind_conn("conn-2").await;
        assert_eq!(dir.resolve("conn-2").await, None);
    }

    #[tokio::test]
    async fn test_room_membership_tracking() {
        let dir = IdentityDirectory::new();
        dir.bind("anna", "conn-1".to_string()).await;
        assert!(!dir.is_in_any_room("anna").await);

        dir.mark_in_room("anna", "ABCDE").await;
        assert!(dir.is_in_any_room("anna").await);
        assert_eq!(dir.room_of("anna").await.as_deref(), Some("ABCDE"));

        // Rebinding keeps the room association: the seat survives a
        // transport swap.
        dir.bind("anna", "conn-2".to_string()).await;
        assert_eq!(dir.room_of("anna").await.as_deref(), Some("ABCDE"));

        dir.clear_room("anna").await;
        assert!(!dir.is_in_any_room("anna").await);
    }
}
