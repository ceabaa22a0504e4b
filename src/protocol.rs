use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        /// Optional display name; defaults to the account name.
        name: Option<String>,
        visibility: Visibility,
        secret: Option<String>,
    },
    JoinRoom {
        code: RoomCode,
        name: Option<String>,
        secret: Option<String>,
    },
    LeaveRoom,
    ListRooms,
    StartGame,
    SubmitClue {
        text: String,
    },
    SubmitVote {
        #[serde(flatten)]
        vote: VoteKind,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        identity: Identity,
        server_now: String,
    },
    LobbyUpdated {
        rooms: Vec<RoomSummary>,
    },
    RoomCreated {
        code: RoomCode,
    },
    RoomJoined {
        code: RoomCode,
        view: RoomView,
    },
    RoomUpdated {
        view: RoomView,
    },
    GameStarting {
        countdown_secs: u64,
    },
    /// Sent to each seat individually; `role` is that seat's secret.
    GameStarted {
        role: RoleInfo,
        view: RoomView,
    },
    /// Private hint upgrade or rejoin role recovery.
    RoleUpdated {
        role: RoleInfo,
    },
    ClueSubmitted {
        view: RoomView,
    },
    VoteUpdated {
        view: RoomView,
    },
    RoundAdvanced {
        view: RoomView,
    },
    GameFinished {
        outcome: FinishOutcome,
        imposter_name: String,
    },
    ReturnedToLobby {
        view: RoomView,
    },
    /// This identity opened a newer connection; the old one is being closed.
    SessionReplaced,
    Error {
        code: String,
        msg: String,
    },
}

/// A seat's private role view. Never part of a room-wide payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleInfo {
    pub word: String,
    pub is_imposter: bool,
    pub round_no: u32,
}

/// Public seat info; word and impostor flag are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatInfo {
    pub identity: Identity,
    pub display_name: String,
    pub is_host: bool,
    pub is_spectator: bool,
}

impl From<&Seat> for SeatInfo {
    fn from(s: &Seat) -> Self {
        Self {
            identity: s.identity.clone(),
            display_name: s.display_name.clone(),
            is_host: s.is_host,
            is_spectator: s.is_spectator,
        }
    }
}

/// The room as every subscriber may see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub code: RoomCode,
    pub phase: Phase,
    pub round_no: u32,
    pub seats: Vec<SeatInfo>,
    pub current_turn: Option<Identity>,
    pub clues: Vec<Clue>,
    pub history: Vec<RoundRecord>,
    pub votes_cast: usize,
    pub votes_needed: usize,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        let voting = matches!(
            room.phase,
            Phase::VotingContinue | Phase::VotingImposter
        );
        Self {
            code: room.code.clone(),
            phase: room.phase,
            round_no: room.round_no,
            seats: room.seats.iter().map(SeatInfo::from).collect(),
            current_turn: room.current_turn(),
            clues: room.clues.clone(),
            history: room.history.clone(),
            votes_cast: if voting { room.ballots.len() } else { 0 },
            votes_needed: if voting { room.active_count() } else { 0 },
        }
    }
}

impl RoleInfo {
    /// The private role view for one seat, if roles have been dealt.
    pub fn for_seat(room: &Room, identity: &str) -> Option<Self> {
        let seat = room.seat(identity)?;
        Some(Self {
            word: seat.word.clone()?,
            is_imposter: seat.is_imposter,
            round_no: room.round_no,
        })
    }
}
