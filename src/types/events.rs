//! Append-only action log.
//!
//! Every state-mutating action leaves exactly one event behind. Events
//! are never mutated or deleted; their store-assigned sequence numbers
//! define history, audit, and export order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, SessionId};

/// What a purchase bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseItem {
    Turn,
    Budget,
}

/// Event discriminant, matching the payload's serialized tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Test,
    Sell,
    Purchase,
    System,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventKind::Test => "TEST",
            EventKind::Sell => "SELL",
            EventKind::Purchase => "PURCHASE",
            EventKind::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

/// Typed action payload.
///
/// Kept structured in memory so constraint scans (one policy per batch)
/// compare fields, not substrings of serialized JSON; serializes with a
/// `type` tag for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum EventPayload {
    Test {
        device_id: usize,
        n: u32,
        x: u32,
    },
    Sell {
        device_id: usize,
        confidence: String,
        lower: f64,
        upper: f64,
        width: f64,
        premium: i64,
        penalty: i64,
        delta: i64,
        hit: bool,
    },
    Purchase {
        item: PurchaseItem,
        cost: i64,
        amount: u32,
    },
    System {
        message: String,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Test { .. } => EventKind::Test,
            EventPayload::Sell { .. } => EventKind::Sell,
            EventPayload::Purchase { .. } => EventKind::Purchase,
            EventPayload::System { .. } => EventKind::System,
        }
    }
}

/// A committed log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned, strictly increasing per store.
    pub seq: u64,
    pub session_id: SessionId,
    /// `None` for system events not attributable to a player.
    pub player_id: Option<PlayerId>,
    pub ts: DateTime<Utc>,
    pub payload: EventPayload,
    /// Signed score change this action applied.
    pub delta_score: i64,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// The batch this event sold a policy on, if it is a SELL.
    pub fn sold_device(&self) -> Option<usize> {
        match self.payload {
            EventPayload::Sell { device_id, .. } => Some(device_id),
            _ => None,
        }
    }
}

/// An entry waiting for the store to assign its sequence number.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub session_id: SessionId,
    pub player_id: Option<PlayerId>,
    pub ts: DateTime<Utc>,
    pub payload: EventPayload,
    pub delta_score: i64,
}
