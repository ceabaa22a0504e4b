//! Account store: registration, login, and per-identity match statistics.
//!
//! Outside the match core. Persistence is best-effort JSON in the data
//! directory with a three-deep backup rotation on every save; a corrupted
//! primary file falls back to the newest backup that still parses. Session
//! tokens live in memory only and die with the process.

use crate::error::GameError;
use crate::types::{FinishOutcome, Identity};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Bump when the on-disk layout changes.
const STORE_SCHEMA_VERSION: u32 = 1;

const STORE_FILE: &str = "accounts.json";
const BACKUP_DEPTH: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: Identity,
    pass_hash: String,
    salt: String,
    pub wins: u32,
    pub losses: u32,
    pub imposter_wins: u32,
    pub avatar: Option<String>,
    pub created_at: String,
}

/// Public profile view; the credential fields stay private.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileView {
    pub name: Identity,
    pub wins: u32,
    pub losses: u32,
    pub imposter_wins: u32,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    schema_version: u32,
    saved_at: String,
    accounts: HashMap<Identity, Account>,
}

pub struct AccountStore {
    path: PathBuf,
    accounts: RwLock<HashMap<Identity, Account>>,
    /// Session token -> identity; not persisted.
    sessions: RwLock<HashMap<String, Identity>>,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

fn backup_path(path: &Path, n: u32) -> PathBuf {
    path.with_extension(format!("json.bak{n}"))
}

impl AccountStore {
    /// Open the store in `dir`, creating it if needed. Falls back through
    /// the backup chain when the primary file does not parse.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE);

        let mut accounts = HashMap::new();
        let mut candidates = vec![path.clone()];
        for n in 1..=BACKUP_DEPTH {
            candidates.push(backup_path(&path, n));
        }
        for candidate in &candidates {
            if !candidate.exists() {
                continue;
            }
            match std::fs::read_to_string(candidate)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<StoreFile>(&raw).map_err(|e| e.to_string()))
            {
                Ok(file) if file.schema_version <= STORE_SCHEMA_VERSION => {
                    if candidate != &path {
                        tracing::warn!(
                            from = %candidate.display(),
                            "account file unreadable, restored from backup"
                        );
                    }
                    accounts = file.accounts;
                    break;
                }
                Ok(file) => {
                    tracing::warn!(
                        version = file.schema_version,
                        "account file from a newer schema, skipping"
                    );
                }
                Err(e) => {
                    tracing::warn!(file = %candidate.display(), error = %e, "skipping account file");
                }
            }
        }

        tracing::info!(count = accounts.len(), "account store loaded");
        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub async fn register(
        &self,
        name: &str,
        password: &str,
    ) -> Result<String, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::validation("Name darf nicht leer sein"));
        }
        if name.chars().count() > 24 {
            return Err(GameError::validation("Name darf höchstens 24 Zeichen haben"));
        }
        if password.chars().count() < 4 {
            return Err(GameError::validation(
                "Passwort muss mindestens 4 Zeichen haben",
            ));
        }

        {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(name) {
                return Err(GameError::precondition("Name bereits vergeben"));
            }
            let salt = ulid::Ulid::new().to_string();
            let account = Account {
                name: name.to_string(),
                pass_hash: digest(&salt, password),
                salt,
                wins: 0,
                losses: 0,
                imposter_wins: 0,
                avatar: None,
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            accounts.insert(name.to_string(), account);
            self.persist(&accounts);
        }

        Ok(self.open_session(name).await)
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<String, GameError> {
        {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(name.trim())
                .ok_or_else(|| GameError::not_found("Unbekannter Account"))?;
            let presented = digest(&account.salt, password);
            if !constant_time_eq(presented.as_bytes(), account.pass_hash.as_bytes()) {
                return Err(GameError::precondition("Falsches Passwort"));
            }
        }
        Ok(self.open_session(name.trim()).await)
    }

    async fn open_session(&self, name: &str) -> String {
        let token = ulid::Ulid::new().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), name.to_string());
        token
    }

    /// Resolve a session token to its account name.
    pub async fn identity_for(&self, token: &str) -> Option<Identity> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Update the avatar of the account behind a session token.
    pub async fn set_avatar(
        &self,
        token: &str,
        avatar: Option<String>,
    ) -> Result<(), GameError> {
        let name = self
            .identity_for(token)
            .await
            .ok_or_else(|| GameError::precondition("Ungültige Sitzung"))?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&name)
            .ok_or_else(|| GameError::not_found("Unbekannter Account"))?;
        account.avatar = avatar;
        self.persist(&accounts);
        Ok(())
    }

    pub async fn profile(&self, name: &str) -> Option<ProfileView> {
        self.accounts.read().await.get(name).map(|a| ProfileView {
            name: a.name.clone(),
            wins: a.wins,
            losses: a.losses,
            imposter_wins: a.imposter_wins,
            avatar: a.avatar.clone(),
        })
    }

    /// Apply a finished match to every participant's statistics, exactly
    /// once per match.
    pub async fn record_outcome(&self, outcome: &FinishOutcome, participants: &[Identity]) {
        let mut accounts = self.accounts.write().await;
        for identity in participants {
            let Some(account) = accounts.get_mut(identity) else {
                continue;
            };
            let is_imposter = identity == &outcome.imposter;
            let won = is_imposter == outcome.imposter_won;
            if won {
                account.wins += 1;
                if is_imposter {
                    account.imposter_wins += 1;
                }
            } else {
                account.losses += 1;
            }
        }
        self.persist(&accounts);
    }

    /// Rotate backups and write the store. Best effort: failures are logged,
    /// never surfaced to the caller.
    fn persist(&self, accounts: &HashMap<Identity, Account>) {
        let file = StoreFile {
            schema_version: STORE_SCHEMA_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            accounts: accounts.clone(),
        };
        let raw = match serde_json::to_string_pretty(&file) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "account store serialization failed");
                return;
            }
        };

        // Shift the chain: .bak2 -> .bak3, .bak1 -> .bak2, current -> .bak1.
        for n in (1..BACKUP_DEPTH).rev() {
            let _ = std::fs::rename(backup_path(&self.path, n), backup_path(&self.path, n + 1));
        }
        let _ = std::fs::rename(&self.path, backup_path(&self.path, 1));

        let tmp = self.path.with_extension("json.tmp");
        let result = std::fs::write(&tmp, raw).and_then(|_| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            tracing::error!(error = %e, "account store write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(imposter: &str, imposter_won: bool) -> FinishOutcome {
        FinishOutcome {
            imposter_won,
            imposter: imposter.to_string(),
            word: "Pizza".to_string(),
            eliminated: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();

        let token = store.register("anna", "geheim123").await.unwrap();
        assert_eq!(store.identity_for(&token).await.as_deref(), Some("anna"));

        let token2 = store.login("anna", "geheim123").await.unwrap();
        assert_eq!(store.identity_for(&token2).await.as_deref(), Some("anna"));
        assert_ne!(token, token2);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        store.register("anna", "geheim123").await.unwrap();

        let err = store.login("anna", "falsch").await.unwrap_err();
        assert_eq!(err.code(), "PRECONDITION");
        let err = store.login("ben", "geheim123").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();

        assert_eq!(
            store.register("  ", "geheim123").await.unwrap_err().code(),
            "VALIDATION"
        );
        assert_eq!(
            store.register("anna", "abc").await.unwrap_err().code(),
            "VALIDATION"
        );

        store.register("anna", "geheim123").await.unwrap();
        assert_eq!(
            store
                .register("anna", "anderes123")
                .await
                .unwrap_err()
                .code(),
            "PRECONDITION"
        );
    }

    #[tokio::test]
    async fn test_record_outcome_updates_stats_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        for name in ["anna", "ben", "cora", "dan"] {
            store.register(name, "geheim123").await.unwrap();
        }
        let participants: Vec<Identity> =
            ["anna", "ben", "cora", "dan"].map(String::from).to_vec();

        // Civilians unmask the impostor.
        store
            .record_outcome(&outcome("anna", false), &participants)
            .await;
        let anna = store.profile("anna").await.unwrap();
        assert_eq!((anna.wins, anna.losses, anna.imposter_wins), (0, 1, 0));
        let ben = store.profile("ben").await.unwrap();
        assert_eq!((ben.wins, ben.losses, ben.imposter_wins), (1, 0, 0));

        // Impostor takes the rematch.
        store
            .record_outcome(&outcome("anna", true), &participants)
            .await;
        let anna = store.profile("anna").await.unwrap();
        assert_eq!((anna.wins, anna.losses, anna.imposter_wins), (1, 1, 1));
        let ben = store.profile("ben").await.unwrap();
        assert_eq!((ben.wins, ben.losses, ben.imposter_wins), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_unknown_participants_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        store.register("anna", "geheim123").await.unwrap();

        // A guest identity without an account must not break stats.
        store
            .record_outcome(
                &outcome("gast", true),
                &["anna".to_string(), "gast".to_string()],
            )
            .await;
        let anna = store.profile("anna").await.unwrap();
        assert_eq!(anna.losses, 1);
    }

    #[tokio::test]
    async fn test_set_avatar_requires_valid_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        let token = store.register("anna", "geheim123").await.unwrap();

        store
            .set_avatar(&token, Some("fuchs".to_string()))
            .await
            .unwrap();
        assert_eq!(
            store.profile("anna").await.unwrap().avatar.as_deref(),
            Some("fuchs")
        );

        let err = store
            .set_avatar("kein-token", Some("wolf".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PRECONDITION");
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = AccountStore::open(dir.path()).unwrap();
            store.register("anna", "geheim123").await.unwrap();
        }
        let store = AccountStore::open(dir.path()).unwrap();
        assert!(store.profile("anna").await.is_some());
        assert!(store.login("anna", "geheim123").await.is_ok());
    }

    #[tokio::test]
    async fn test_backup_rotation_three_deep() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        for name in ["anna", "ben", "cora", "dan", "eve"] {
            store.register(name, "geheim123").await.unwrap();
        }

        let base = dir.path().join(STORE_FILE);
        assert!(base.exists());
        for n in 1..=BACKUP_DEPTH {
            assert!(
                backup_path(&base, n).exists(),
                "missing backup .bak{n} after repeated saves"
            );
        }
        assert!(!backup_path(&base, BACKUP_DEPTH + 1).exists());
    }

    #[tokio::test]
    async fn test_corrupt_primary_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = AccountStore::open(dir.path()).unwrap();
            store.register("anna", "geheim123").await.unwrap();
            store.register("ben", "geheim123").await.unwrap();
        }

        let base = dir.path().join(STORE_FILE);
        std::fs::write(&base, "{ not json").unwrap();

        let store = AccountStore::open(dir.path()).unwrap();
        // .bak1 holds the state from just before the last save: anna only.
        assert!(store.profile("anna").await.is_some());
    }
}
