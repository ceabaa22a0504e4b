//! Error taxonomy for room commands.
//!
//! Every variant is recoverable and carries user-facing message text. Errors
//! are produced before any mutation, reported only to the originating caller,
//! and never fan out to other participants.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    /// Bad input shape: empty name, blank clue, malformed vote.
    #[error("{0}")]
    Validation(String),

    /// Right input, wrong moment: wrong phase, not your turn, not host,
    /// room full, already seated elsewhere, wrong access secret.
    #[error("{0}")]
    Precondition(String),

    /// Unknown room code or account.
    #[error("{0}")]
    NotFound(String),

    /// A game rule was broken: speaking the secret word as a civilian,
    /// voting as a spectator.
    #[error("{0}")]
    RuleViolation(String),
}

impl GameError {
    /// Stable wire code for `ServerMessage::Error`.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION",
            GameError::Precondition(_) => "PRECONDITION",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::RuleViolation(_) => "RULE_VIOLATION",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        GameError::Validation(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        GameError::Precondition(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        GameError::NotFound(msg.into())
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        GameError::RuleViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(GameError::validation("x").code(), "VALIDATION");
        assert_eq!(GameError::precondition("x").code(), "PRECONDITION");
        assert_eq!(GameError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(GameError::rule("x").code(), "RULE_VIOLATION");
    }

    #[test]
    fn test_display_is_the_user_message() {
        let err = GameError::precondition("Nur der Host kann das Spiel starten");
        assert_eq!(err.to_string(), "Nur der Host kann das Spiel starten");
    }
}
