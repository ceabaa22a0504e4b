use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable player identity (account name).
pub type Identity = String;
/// Short public room code.
pub type RoomCode = String;
/// Volatile transport handle; changes on every reconnect.
pub type ConnId = String;

/// Seats a room can hold at the same time. Participants-ever may exceed this.
pub const MAX_SEATS: usize = 8;
/// Seats required before the host can start a match.
pub const MIN_SEATS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Waiting,
    Playing,
    VotingContinue,
    VotingImposter,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Runtime tunables. Defaults suit production; tests zero the delays.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub min_seats: usize,
    pub max_seats: usize,
    pub clue_max_chars: usize,
    /// Delay between the host pressing start and the first turn.
    pub start_countdown_secs: u64,
    /// Delay between a finished outcome and the automatic return to lobby.
    pub reset_delay_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_seats: MIN_SEATS,
            max_seats: MAX_SEATS,
            clue_max_chars: 60,
            start_countdown_secs: 3,
            reset_delay_secs: 10,
        }
    }
}

impl GameConfig {
    /// Load overrides from `WORTSPION_*` environment variables.
    pub fn from_env() -> Self {
        fn parse<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            min_seats: defaults.min_seats,
            max_seats: defaults.max_seats,
            clue_max_chars: parse("WORTSPION_CLUE_MAX_CHARS", defaults.clue_max_chars),
            start_countdown_secs: parse(
                "WORTSPION_START_COUNTDOWN_SECS",
                defaults.start_countdown_secs,
            ),
            reset_delay_secs: parse("WORTSPION_RESET_DELAY_SECS", defaults.reset_delay_secs),
        }
    }
}

/// One participant's live membership in a room.
#[derive(Debug, Clone)]
pub struct Seat {
    pub identity: Identity,
    pub display_name: String,
    pub conn: ConnId,
    pub is_host: bool,
    /// Role text shown to this seat: the plain word, or the impostor hint.
    pub word: Option<String>,
    pub is_imposter: bool,
    /// Voted out but still present; excluded from turns and vote denominators.
    pub is_spectator: bool,
}

impl Seat {
    /// Seated and not voted out.
    pub fn is_active(&self) -> bool {
        !self.is_spectator
    }
}

/// Per-identity rejoin snapshot, refreshed whenever a seat leaves mid-match.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRecord {
    pub display_name: String,
    pub word: Option<String>,
    pub is_imposter: bool,
    pub is_spectator: bool,
}

/// A single clue given during a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clue {
    pub identity: Identity,
    pub display_name: String,
    pub text: String,
}

/// An archived round: one clue per seat that was active, in turn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub number: u32,
    pub clues: Vec<Clue>,
}

/// A single ballot. Resubmitting replaces, never appends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoteKind {
    Continue,
    EndRound,
    Accuse { target: Identity },
}

/// An immutable entry from the word pool: the secret word plus two hint
/// tiers for the impostor (tier B unlocks from round 2).
#[derive(Debug, Clone, Copy)]
pub struct WordEntry {
    pub word: &'static str,
    pub hint: &'static str,
    pub hint_detail: &'static str,
}

/// Emitted exactly once per finished match; consumed by the account layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinishOutcome {
    pub imposter_won: bool,
    pub imposter: Identity,
    pub word: String,
    pub eliminated: Option<Identity>,
}

/// Lobby listing entry. Private rooms are listed but secret-gated on join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub code: RoomCode,
    pub seat_count: usize,
    pub host_name: String,
    pub visibility: Visibility,
    pub needs_secret: bool,
}

/// One live match. All mutation goes through the methods in `room.rs`,
/// serialized by the per-room lock held in the registry.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub visibility: Visibility,
    pub secret: Option<String>,
    pub config: GameConfig,
    pub phase: Phase,
    /// Bumped on every prepare-start and reset; scheduled timers capture it
    /// and no-op when it has moved on.
    pub generation: u64,
    pub seats: Vec<Seat>,
    /// Every identity that has ever held a seat here, for rejoin.
    pub participants: HashMap<Identity, ParticipantRecord>,
    pub round_no: u32,
    pub word: Option<String>,
    pub hint: Option<String>,
    pub hint_detail: Option<String>,
    pub imposter: Option<Identity>,
    /// Seat identities snapshotted at game start; the stable basis for turn
    /// rotation no matter how the live seat list mutates afterwards.
    pub turn_order: Vec<Identity>,
    /// Index into `turn_order` from which the next speaker is scanned.
    pub turn_cursor: usize,
    /// Where the match started; continue-votes rewind the cursor here.
    pub start_cursor: usize,
    pub clues: Vec<Clue>,
    pub history: Vec<RoundRecord>,
    pub ballots: HashMap<Identity, VoteKind>,
    /// Set by prepare_start, cleared by activate_start.
    pub pending_start: bool,
    pub finish: Option<FinishOutcome>,
}
