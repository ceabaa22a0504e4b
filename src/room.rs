//! The match state machine.
//!
//! Everything in here is pure and synchronous: a method validates its input
//! against the current room state, then either returns an error (leaving the
//! room untouched) or applies the transition and reports what changed. The
//! caller owns the per-room lock, broadcasts the resulting views, and
//! schedules timers; none of that happens here.

use crate::error::GameError;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Result of a join request.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// A fresh seat was created.
    Joined,
    /// A previous participant came back; word/role/spectator state restored.
    Rejoined,
    /// The identity was already seated; only the transport handle changed.
    Reconnected { old_conn: ConnId },
}

/// Result of removing a seat.
#[derive(Debug, Clone)]
pub struct SeatRemoved {
    pub conn: ConnId,
    pub was_host: bool,
    pub new_host: Option<Identity>,
    pub now_empty: bool,
}

/// Result of an accepted clue.
#[derive(Debug, Clone, PartialEq)]
pub enum ClueOutcome {
    /// Clue recorded, turn moved on.
    Accepted { next_turn: Identity },
    /// Clue recorded and it was the last one: round archived, vote opened.
    RoundComplete,
    /// The impostor named the secret word and wins outright.
    ImposterGuessed(FinishOutcome),
}

/// Result of an accepted ballot.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// Ballot stored; waiting for the remaining active seats.
    Recorded { cast: usize, needed: usize },
    /// End-round majority: accusation voting begins.
    GuessPhaseOpened,
    /// Continue majority (or tie): next round, turn pointer rewound.
    RoundAdvanced { round_no: u32, hint_upgraded: bool },
    /// Accusation tie or no valid target: the round replays.
    NoElimination,
    /// An innocent seat was voted out and play resumes.
    Eliminated { target: Identity, round_no: u32 },
    /// The match is over.
    Finished(FinishOutcome),
}

/// A transition induced by a departure rather than by a player command.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// The departing seat was the last one missing from the round.
    RoundArchived,
    /// The departing seat was the last ballot missing from a tally.
    Vote(VoteOutcome),
}

impl Room {
    pub fn new(
        code: RoomCode,
        visibility: Visibility,
        secret: Option<String>,
        config: GameConfig,
    ) -> Self {
        Self {
            code,
            visibility,
            secret,
            config,
            phase: Phase::Waiting,
            generation: 0,
            seats: Vec::new(),
            participants: HashMap::new(),
            round_no: 0,
            word: None,
            hint: None,
            hint_detail: None,
            imposter: None,
            turn_order: Vec::new(),
            turn_cursor: 0,
            start_cursor: 0,
            clues: Vec::new(),
            history: Vec::new(),
            ballots: HashMap::new(),
            pending_start: false,
            finish: None,
        }
    }

    pub fn seat(&self, identity: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.identity == identity)
    }

    fn seat_mut(&mut self, identity: &str) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.identity == identity)
    }

    pub fn host(&self) -> Option<&Seat> {
        self.seats.iter().find(|s| s.is_host)
    }

    /// Seated and not voted out.
    pub fn active_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_seats().count()
    }

    fn snapshot_pos(&self, identity: &str) -> Option<usize> {
        self.turn_order.iter().position(|id| id == identity)
    }

    /// The seat whose turn it is: the first snapshot identity from the
    /// cursor (wrapping) that is seated, active, and still owes a clue this
    /// round. Scanning instead of indexing keeps the pointer valid no matter
    /// how the live seat list mutates.
    pub fn current_turn(&self) -> Option<Identity> {
        if self.phase != Phase::Playing || self.turn_order.is_empty() {
            return None;
        }
        let len = self.turn_order.len();
        for step in 0..len {
            let identity = &self.turn_order[(self.turn_cursor + step) % len];
            let seated_active = self
                .seat(identity)
                .map(|s| s.is_active())
                .unwrap_or(false);
            let has_spoken = self.clues.iter().any(|c| &c.identity == identity);
            if seated_active && !has_spoken {
                return Some(identity.clone());
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub fn join(
        &mut self,
        identity: &str,
        display_name: &str,
        conn: ConnId,
        secret: Option<&str>,
    ) -> Result<JoinOutcome, GameError> {
        if display_name.trim().is_empty() {
            return Err(GameError::validation("Name darf nicht leer sein"));
        }

        // Reconnect race: same identity, newer transport. Swap in place.
        if let Some(seat) = self.seat_mut(identity) {
            let old_conn = std::mem::replace(&mut seat.conn, conn);
            return Ok(JoinOutcome::Reconnected { old_conn });
        }

        if let Some(required) = &self.secret {
            if secret != Some(required.as_str()) {
                return Err(GameError::precondition("Falsches Passwort"));
            }
        }

        if self.seats.len() >= self.config.max_seats {
            return Err(GameError::precondition("Raum ist voll"));
        }

        let record = self.participants.get(identity).cloned();
        if self.phase != Phase::Waiting || self.pending_start {
            // No drive-by joins into a running (or starting) match. Rejoin
            // is reserved for identities that held a seat when the roles
            // were dealt.
            if self.snapshot_pos(identity).is_none() {
                return Err(GameError::precondition("Spiel bereits gestartet"));
            }
        }

        let rejoined = record.is_some();
        let restored = record.unwrap_or_default();
        let seat = Seat {
            identity: identity.to_string(),
            display_name: display_name.to_string(),
            conn,
            is_host: self.seats.is_empty(),
            word: restored.word,
            is_imposter: restored.is_imposter,
            is_spectator: restored.is_spectator,
        };

        // Reinsert at the slot implied by the start snapshot so rotation
        // stays consistent; identities outside the snapshot go to the end.
        let insert_at = match self.snapshot_pos(identity) {
            Some(pos) => self
                .seats
                .iter()
                .position(|s| {
                    self.snapshot_pos(&s.identity)
                        .map(|p| p > pos)
                        .unwrap_or(false)
                })
                .unwrap_or(self.seats.len()),
            None => self.seats.len(),
        };
        self.seats.insert(insert_at, seat);

        self.participants.insert(
            identity.to_string(),
            ParticipantRecord {
                display_name: display_name.to_string(),
                ..Default::default()
            },
        );

        Ok(if rejoined {
            JoinOutcome::Rejoined
        } else {
            JoinOutcome::Joined
        })
    }

    /// Remove a seat on leave or disconnect. The identity stays a
    /// participant so it can rejoin later; the caller destroys the room when
    /// `now_empty` is set.
    pub fn remove_seat(&mut self, identity: &str) -> Option<SeatRemoved> {
        let idx = self.seats.iter().position(|s| s.identity == identity)?;
        let seat = self.seats.remove(idx);

        self.participants.insert(
            seat.identity.clone(),
            ParticipantRecord {
                display_name: seat.display_name.clone(),
                word: seat.word.clone(),
                is_imposter: seat.is_imposter,
                is_spectator: seat.is_spectator,
            },
        );

        let mut new_host = None;
        if seat.is_host {
            if let Some(first) = self.seats.first_mut() {
                first.is_host = true;
                new_host = Some(first.identity.clone());
            }
        }

        Some(SeatRemoved {
            conn: seat.conn,
            was_host: seat.is_host,
            new_host,
            now_empty: self.seats.is_empty(),
        })
    }

    /// A departure can leave the remaining seats with nothing outstanding:
    /// the round may now be complete, or a tally may now be ready. Called
    /// after `remove_seat` on a non-empty room.
    pub fn settle_after_departure(&mut self) -> Option<Settled> {
        match self.phase {
            Phase::Playing => {
                if self.active_count() > 0 && self.current_turn().is_none() {
                    self.archive_round();
                    Some(Settled::RoundArchived)
                } else {
                    None
                }
            }
            Phase::VotingContinue | Phase::VotingImposter => {
                let seated: Vec<Identity> =
                    self.active_seats().map(|s| s.identity.clone()).collect();
                self.ballots.retain(|voter, _| seated.contains(voter));
                if self.active_count() > 0 && self.tally_ready() {
                    Some(Settled::Vote(self.run_tally()))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Start
    // ------------------------------------------------------------------

    /// Deal roles and snapshot the turn order. The phase stays `Waiting`
    /// until `activate_start` flips it, so a countdown between the two is
    /// purely a scheduling concern of the caller.
    pub fn prepare_start(
        &mut self,
        requester: &str,
        entry: WordEntry,
    ) -> Result<(), GameError> {
        if self.phase != Phase::Waiting || self.pending_start {
            return Err(GameError::precondition("Spiel läuft bereits"));
        }
        let is_host = self
            .seat(requester)
            .map(|s| s.is_host)
            .unwrap_or(false);
        if !is_host {
            return Err(GameError::precondition(
                "Nur der Host kann das Spiel starten",
            ));
        }
        if self.seats.len() < self.config.min_seats {
            return Err(GameError::precondition(format!(
                "Mindestens {} Spieler benötigt",
                self.config.min_seats
            )));
        }

        let mut rng = rand::rng();
        let imposter_idx = rng.random_range(0..self.seats.len());

        self.word = Some(entry.word.to_string());
        self.hint = Some(entry.hint.to_string());
        self.hint_detail = Some(entry.hint_detail.to_string());
        self.imposter = Some(self.seats[imposter_idx].identity.clone());

        for (idx, seat) in self.seats.iter_mut().enumerate() {
            seat.is_imposter = idx == imposter_idx;
            seat.is_spectator = false;
            seat.word = Some(if idx == imposter_idx {
                format!("Imposter (Tipp: {})", entry.hint)
            } else {
                entry.word.to_string()
            });
        }

        self.round_no = 1;
        self.clues.clear();
        self.history.clear();
        self.ballots.clear();
        self.finish = None;
        self.turn_order = self.seats.iter().map(|s| s.identity.clone()).collect();
        self.start_cursor = rng.random_range(0..self.turn_order.len());
        self.turn_cursor = self.start_cursor;
        self.pending_start = true;
        self.generation += 1;

        Ok(())
    }

    /// Second half of the two-step start. Re-checks the seat minimum in case
    /// the lobby shrank during the countdown; a failed activation rolls the
    /// room back to a plain waiting state.
    pub fn activate_start(&mut self) -> Result<(), GameError> {
        if !self.pending_start {
            return Err(GameError::precondition("Kein Start vorbereitet"));
        }
        if self.seats.len() < self.config.min_seats {
            self.reset_to_lobby();
            return Err(GameError::precondition(format!(
                "Mindestens {} Spieler benötigt",
                self.config.min_seats
            )));
        }
        self.pending_start = false;
        self.phase = Phase::Playing;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Clues
    // ------------------------------------------------------------------

    pub fn submit_clue(
        &mut self,
        identity: &str,
        text: &str,
    ) -> Result<ClueOutcome, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::precondition("Gerade keine Hinweisrunde"));
        }
        let seat = self
            .seat(identity)
            .ok_or_else(|| GameError::precondition("Du sitzt nicht in diesem Raum"))?;
        if seat.is_spectator {
            return Err(GameError::rule("Zuschauer dürfen keine Hinweise geben"));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::validation("Hinweis darf nicht leer sein"));
        }
        if text.chars().count() > self.config.clue_max_chars {
            return Err(GameError::validation(format!(
                "Hinweis darf höchstens {} Zeichen haben",
                self.config.clue_max_chars
            )));
        }

        if self.current_turn().as_deref() != Some(identity) {
            return Err(GameError::precondition("Du bist nicht an der Reihe"));
        }

        let names_word = self
            .word
            .as_deref()
            .map(|w| w.to_lowercase() == text.to_lowercase())
            .unwrap_or(false);
        if names_word {
            if seat.is_imposter {
                let outcome = self.finish_match(true, None);
                return Ok(ClueOutcome::ImposterGuessed(outcome));
            }
            return Err(GameError::rule(
                "Das geheime Wort darf nicht genannt werden",
            ));
        }

        let display_name = seat.display_name.clone();
        self.clues.push(Clue {
            identity: identity.to_string(),
            display_name,
            text: text.to_string(),
        });

        // One step past the speaker; the candidate scan skips the rest.
        if let Some(pos) = self.snapshot_pos(identity) {
            self.turn_cursor = (pos + 1) % self.turn_order.len();
        }

        match self.current_turn() {
            Some(next_turn) => Ok(ClueOutcome::Accepted { next_turn }),
            None => {
                self.archive_round();
                Ok(ClueOutcome::RoundComplete)
            }
        }
    }

    fn archive_round(&mut self) {
        self.history.push(RoundRecord {
            number: self.round_no,
            clues: std::mem::take(&mut self.clues),
        });
        self.phase = Phase::VotingContinue;
        self.ballots.clear();
    }

    // ------------------------------------------------------------------
    // Voting
    // ------------------------------------------------------------------

    pub fn submit_vote(
        &mut self,
        identity: &str,
        kind: VoteKind,
    ) -> Result<VoteOutcome, GameError> {
        if self.phase != Phase::VotingContinue && self.phase != Phase::VotingImposter {
            return Err(GameError::precondition("Gerade keine Abstimmung"));
        }
        let seat = self
            .seat(identity)
            .ok_or_else(|| GameError::precondition("Du sitzt nicht in diesem Raum"))?;
        if seat.is_spectator {
            return Err(GameError::rule("Zuschauer dürfen nicht abstimmen"));
        }

        match (&self.phase, &kind) {
            (Phase::VotingContinue, VoteKind::Continue | VoteKind::EndRound) => {}
            (Phase::VotingImposter, VoteKind::Accuse { target }) => {
                let valid_target = self
                    .seat(target)
                    .map(|s| s.is_active())
                    .unwrap_or(false);
                if !valid_target {
                    return Err(GameError::validation("Ungültiges Abstimmungsziel"));
                }
            }
            _ => {
                return Err(GameError::validation(
                    "Ungültige Stimme für diese Abstimmungsphase",
                ));
            }
        }

        // Replaces, never appends.
        self.ballots.insert(identity.to_string(), kind);

        if self.tally_ready() {
            Ok(self.run_tally())
        } else {
            Ok(VoteOutcome::Recorded {
                cast: self.ballots.len(),
                needed: self.active_count(),
            })
        }
    }

    fn tally_ready(&self) -> bool {
        self.active_count() > 0
            && self
                .active_seats()
                .all(|s| self.ballots.contains_key(&s.identity))
    }

    fn run_tally(&mut self) -> VoteOutcome {
        match self.phase {
            Phase::VotingContinue => self.tally_continue(),
            Phase::VotingImposter => self.tally_accusation(),
            _ => unreachable!("tally outside a voting phase"),
        }
    }

    fn tally_continue(&mut self) -> VoteOutcome {
        let end = self
            .ballots
            .values()
            .filter(|k| matches!(k, VoteKind::EndRound))
            .count();
        let cont = self
            .ballots
            .values()
            .filter(|k| matches!(k, VoteKind::Continue))
            .count();
        self.ballots.clear();

        // Strict majority; a tie keeps the round going.
        if end > cont {
            self.phase = Phase::VotingImposter;
            return VoteOutcome::GuessPhaseOpened;
        }

        self.round_no += 1;
        self.phase = Phase::Playing;
        self.clues.clear();
        self.turn_cursor = self.start_cursor;
        let hint_upgraded = self.upgrade_imposter_hint();
        VoteOutcome::RoundAdvanced {
            round_no: self.round_no,
            hint_upgraded,
        }
    }

    /// From round 2 the impostor sees both hint tiers.
    fn upgrade_imposter_hint(&mut self) -> bool {
        if self.round_no < 2 {
            return false;
        }
        let (Some(hint), Some(detail)) = (self.hint.clone(), self.hint_detail.clone()) else {
            return false;
        };
        let upgraded = format!("Imposter (Tipp: {hint} / {detail})");
        let imposter = match &self.imposter {
            Some(id) => id.clone(),
            None => return false,
        };
        if let Some(seat) = self.seat_mut(&imposter) {
            seat.word = Some(upgraded);
            true
        } else if let Some(record) = self.participants.get_mut(&imposter) {
            // Impostor currently disconnected; upgrade the rejoin snapshot.
            record.word = Some(upgraded);
            true
        } else {
            false
        }
    }

    fn tally_accusation(&mut self) -> VoteOutcome {
        let mut counts: HashMap<Identity, usize> = HashMap::new();
        for kind in self.ballots.values() {
            if let VoteKind::Accuse { target } = kind {
                *counts.entry(target.clone()).or_insert(0) += 1;
            }
        }
        self.ballots.clear();

        // Strict plurality: a shared maximum (or no votes at all) means no
        // valid target and nobody is eliminated.
        let max = counts.values().copied().max().unwrap_or(0);
        let leaders: Vec<&Identity> = counts
            .iter()
            .filter(|(_, c)| **c == max)
            .map(|(id, _)| id)
            .collect();
        let accused = match leaders.as_slice() {
            [single] if max > 0 => (*single).clone(),
            _ => {
                self.clues.clear();
                self.phase = Phase::Playing;
                self.turn_cursor = self.start_cursor;
                return VoteOutcome::NoElimination;
            }
        };

        let accused_active = self
            .seat(&accused)
            .map(|s| s.is_active())
            .unwrap_or(false);
        if !accused_active {
            // Target left between ballot and tally.
            self.clues.clear();
            self.phase = Phase::Playing;
            self.turn_cursor = self.start_cursor;
            return VoteOutcome::NoElimination;
        }

        if self.imposter.as_deref() == Some(accused.as_str()) {
            return VoteOutcome::Finished(self.finish_match(false, Some(accused)));
        }

        // Innocent out: spectator from here on, word cleared.
        if let Some(seat) = self.seat_mut(&accused) {
            seat.is_spectator = true;
            seat.word = None;
        }
        self.round_no += 1;

        if self.active_count() <= 2 {
            // Not enough accusers left to ever corner the impostor.
            return VoteOutcome::Finished(self.finish_match(true, Some(accused)));
        }

        self.clues.clear();
        self.phase = Phase::Playing;
        // First remaining active seat in snapshot order speaks next.
        self.turn_cursor = 0;
        self.upgrade_imposter_hint();
        VoteOutcome::Eliminated {
            target: accused,
            round_no: self.round_no,
        }
    }

    fn finish_match(&mut self, imposter_won: bool, eliminated: Option<Identity>) -> FinishOutcome {
        let outcome = FinishOutcome {
            imposter_won,
            imposter: self.imposter.clone().unwrap_or_default(),
            word: self.word.clone().unwrap_or_default(),
            eliminated,
        };
        self.phase = Phase::Finished;
        self.finish = Some(outcome.clone());
        outcome
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Back to the lobby with the same seats, ready for another match.
    pub fn reset_to_lobby(&mut self) {
        self.phase = Phase::Waiting;
        self.round_no = 0;
        self.word = None;
        self.hint = None;
        self.hint_detail = None;
        self.imposter = None;
        self.turn_order.clear();
        self.turn_cursor = 0;
        self.start_cursor = 0;
        self.clues.clear();
        self.history.clear();
        self.ballots.clear();
        self.pending_start = false;
        self.finish = None;
        self.generation += 1;

        for seat in &mut self.seats {
            seat.word = None;
            seat.is_imposter = false;
            seat.is_spectator = false;
        }
        for record in self.participants.values_mut() {
            record.word = None;
            record.is_imposter = false;
            record.is_spectator = false;
        }
    }

    /// Summary for the lobby listing.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            seat_count: self.seats.len(),
            host_name: self
                .host()
                .map(|s| s.display_name.clone())
                .unwrap_or_else(|| "Unbekannt".to_string()),
            visibility: self.visibility,
            needs_secret: self.secret.is_some(),
        }
    }
}
