use thiserror::Error;

use crate::types::{PlayerId, SessionId, SessionStatus};

/// A game rule violation.
///
/// Every variant is a user-facing condition: the boundary layer recovers
/// it and shows the message to the player. None of these are fatal to
/// the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("no session found with code '{code}'")]
    SessionNotFound { code: String },

    #[error("session is not active")]
    SessionNotActive,

    #[error("this session has already ended")]
    SessionEnded,

    #[error("time's up! the game has ended")]
    TimeExpired,

    #[error("invalid batch id {device_id} (session has {device_count} batches)")]
    InvalidDevice {
        device_id: usize,
        device_count: usize,
    },

    #[error("sample size must be between {min} and {max} (got {n})")]
    SampleSizeOutOfBounds { n: u32, min: u32, max: u32 },

    #[error("no turns remaining")]
    NoTurnsRemaining,

    #[error("insufficient inspection budget (have {have}, need {need})")]
    InsufficientBudget { have: u32, need: u32 },

    #[error("a policy was already sold on batch {device_id}; one policy per batch")]
    PolicyAlreadySold { device_id: usize },

    #[error("invalid confidence level '{given}'")]
    InvalidConfidence { given: String },

    #[error("interval bounds must satisfy 0 <= L < U <= 1 (got L={lower}, U={upper})")]
    InvalidInterval { lower: f64, upper: f64 },

    #[error("batch {device_id} must be inspected at least once before selling a policy on it")]
    PriorTestRequired { device_id: usize },

    #[error("not enough score (need {need}, have {have})")]
    InsufficientScore { need: i64, have: i64 },

    #[error("player name must not be empty")]
    BlankName,

    #[error("the name '{name}' is already taken in this session")]
    NameTaken { name: String },

    #[error("this game is already in progress; new players can only join during the lobby")]
    JoinedMidGame,

    #[error("cannot move session from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("probabilities can only be revealed after the session has ended")]
    RevealBeforeEnd,

    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence failures surfaced through the [`crate::store::GameStore`] seam.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("commit failed: {0}")]
    Commit(String),
}
