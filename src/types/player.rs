//! Player entity and allowance accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::types::SessionId;

/// Opaque player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One participant in a session, unique per (session, name) pair.
///
/// The allowance invariants `turns_used <= max_turns + extra_turns` and
/// `budget_used <= test_budget + extra_budget` are enforced by the
/// executors at action time; nothing ever violates them retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub session_id: SessionId,
    pub name: String,
    /// Secret token letting the same student reclaim the name.
    pub rejoin_token: String,
    /// Signed running score; misses can push it negative.
    pub score: i64,
    pub turns_used: u32,
    pub budget_used: u32,
    /// Turns bought mid-game on top of the session allowance.
    pub extra_turns: u32,
    /// Budget bought mid-game on top of the session allowance.
    pub extra_budget: u32,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(
        session_id: SessionId,
        name: String,
        rejoin_token: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlayerId::new(),
            session_id,
            name,
            rejoin_token,
            score: 0,
            turns_used: 0,
            budget_used: 0,
            extra_turns: 0,
            extra_budget: 0,
            created_at: now,
        }
    }

    /// Turns left under the session allowance plus purchases.
    pub fn turns_remaining(&self, config: &SessionConfig) -> u32 {
        (config.max_turns + self.extra_turns).saturating_sub(self.turns_used)
    }

    /// Inspection samples left under the session allowance plus purchases.
    pub fn budget_remaining(&self, config: &SessionConfig) -> u32 {
        (config.test_budget + self.extra_budget).saturating_sub(self.budget_used)
    }
}
