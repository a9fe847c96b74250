//! Session entity and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Difficulty, SessionConfig};
use crate::errors::GameError;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session lifecycle. Transitions are monotonic: lobby -> active -> ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Players may join; no actions yet.
    Lobby,
    /// Game in progress.
    Active,
    /// Terminal; probabilities may be revealed.
    Ended,
}

impl SessionStatus {
    /// Whether moving to `next` is a legal forward step.
    pub fn can_transition(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Lobby, SessionStatus::Active)
                | (SessionStatus::Active, SessionStatus::Ended)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Lobby => "lobby",
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// One instructor-created game instance.
///
/// The hidden probability sequence is fixed at creation: its length
/// always equals `config.device_count` and nothing mutates it
/// afterwards. Access goes through [`Session::device_p`] while the game
/// runs and [`Session::revealed_ps`] once it has ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Short public code students type to join.
    pub join_code: String,
    pub status: SessionStatus,
    /// Seed the hidden probabilities were generated from.
    pub seed: u64,
    pub difficulty: Difficulty,
    device_ps: Vec<f64>,
    pub config: SessionConfig,
    pub created_at: DateTime<Utc>,
    /// Stamped when the session moves to active; anchors the timer.
    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        join_code: String,
        seed: u64,
        difficulty: Difficulty,
        device_ps: Vec<f64>,
        config: SessionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        debug_assert_eq!(device_ps.len(), config.device_count);
        Self {
            id: SessionId::new(),
            join_code,
            status: SessionStatus::Lobby,
            seed,
            difficulty,
            device_ps,
            config,
            created_at: now,
            started_at: None,
        }
    }

    pub fn device_count(&self) -> usize {
        self.device_ps.len()
    }

    /// Hidden defect rate for a batch, `None` when the id is out of range.
    pub(crate) fn device_p(&self, device_id: usize) -> Option<f64> {
        self.device_ps.get(device_id).copied()
    }

    /// The hidden sequence, available only once the session has ended.
    pub fn revealed_ps(&self) -> Result<&[f64], GameError> {
        if self.status != SessionStatus::Ended {
            return Err(GameError::RevealBeforeEnd);
        }
        Ok(&self.device_ps)
    }
}
