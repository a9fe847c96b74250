//! Read-only projections over the entities.
//!
//! Everything here is derived; no projection carries state of its own.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::timer;
use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{Event, EventKind, PlayerId, SessionId, SessionStatus};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub score: i64,
    pub turns_used: u32,
    pub budget_used: u32,
}

/// Players ranked by score descending; ties keep insertion order.
pub fn leaderboard<S: GameStore>(store: &S, session_id: SessionId) -> Vec<LeaderboardEntry> {
    let mut players = store.players_in(session_id);
    players.sort_by_key(|p| std::cmp::Reverse(p.score));
    players
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            player_id: p.id,
            name: p.name,
            score: p.score,
            turns_used: p.turns_used,
            budget_used: p.budget_used,
        })
        .collect()
}

/// One player's view of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceView {
    pub device_id: usize,
    pub n_total: u64,
    pub x_total: u64,
    pub tested: bool,
    pub sold: bool,
}

/// Per-batch test totals and sold status for a player, one row per
/// batch in id order.
pub fn player_devices<S: GameStore>(
    store: &S,
    session_id: SessionId,
    player_id: PlayerId,
) -> Result<Vec<DeviceView>, GameError> {
    let session = store.session(session_id)?;
    let stats: BTreeMap<usize, (u64, u64)> = store
        .device_stats_for(player_id)
        .into_iter()
        .map(|s| (s.device_id, (s.n_total, s.x_total)))
        .collect();
    let sold: BTreeSet<usize> = store
        .events_for_player(player_id)
        .iter()
        .filter_map(Event::sold_device)
        .collect();

    Ok((0..session.device_count())
        .map(|device_id| {
            let (n_total, x_total) = stats.get(&device_id).copied().unwrap_or((0, 0));
            DeviceView {
                device_id,
                n_total,
                x_total,
                tested: n_total > 0,
                sold: sold.contains(&device_id),
            }
        })
        .collect())
}

/// A player's most recent events, newest first, capped at `limit`.
pub fn player_events<S: GameStore>(store: &S, player_id: PlayerId, limit: usize) -> Vec<Event> {
    let mut events = store.events_for_player(player_id);
    events.reverse();
    events.truncate(limit);
    events
}

/// One flattened log row for the boundary's export formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub seq: u64,
    pub session_id: SessionId,
    pub player_id: Option<PlayerId>,
    pub ts: DateTime<Utc>,
    pub kind: EventKind,
    /// The payload serialized as a JSON object string.
    pub payload: String,
    pub delta_score: i64,
}

/// A session's full event log as chronological rows.
pub fn export_rows<S: GameStore>(
    store: &S,
    session_id: SessionId,
) -> Result<Vec<ExportRow>, GameError> {
    store
        .events_for_session(session_id)
        .into_iter()
        .map(|e| {
            let payload = serde_json::to_string(&e.payload)
                .map_err(|err| crate::errors::StoreError::Commit(err.to_string()))?;
            Ok(ExportRow {
                seq: e.seq,
                session_id: e.session_id,
                player_id: e.player_id,
                ts: e.ts,
                kind: e.kind(),
                payload,
                delta_score: e.delta_score,
            })
        })
        .collect()
}

/// Status-poll projection: where the session stands right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub join_code: String,
    pub status: SessionStatus,
    pub device_count: usize,
    /// `None` when untimed.
    pub remaining_seconds: Option<i64>,
    pub player_count: usize,
}

/// Poll a session's status, applying lazy expiry on the way.
///
/// An active session whose clock ran out flips to ended here, exactly
/// as it would at the head of a player action.
pub fn session_summary<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    now: DateTime<Utc>,
) -> Result<SessionSummary, GameError> {
    let mut session = store.session(session_id)?;
    match timer::check_time_expired(store, &mut session, now) {
        Ok(()) | Err(GameError::TimeExpired) => {}
        Err(other) => return Err(other),
    }

    Ok(SessionSummary {
        session_id,
        join_code: session.join_code.clone(),
        status: session.status,
        device_count: session.device_count(),
        remaining_seconds: timer::remaining_seconds(&session, now),
        player_count: store.players_in(session_id).len(),
    })
}
