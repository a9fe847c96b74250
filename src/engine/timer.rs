//! Lazy wall-clock expiry.
//!
//! There is no timer thread. Every state-mutating executor calls
//! [`check_time_expired`] before any other validation, so nothing
//! succeeds after the deadline even under concurrent requests that have
//! not yet observed the status flip.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{EventPayload, NewEvent, Session, SessionStatus};

/// Seconds left on the session clock, floored at 0.
///
/// `None` when the session is untimed (no limit configured) or has not
/// started yet.
pub fn remaining_seconds(session: &Session, now: DateTime<Utc>) -> Option<i64> {
    let started = session.started_at?;
    if session.config.time_limit_minutes == 0 {
        return None;
    }
    let limit = i64::from(session.config.time_limit_minutes) * 60;
    let elapsed = (now - started).num_seconds();
    Some((limit - elapsed).max(0))
}

/// End an active session whose clock has run out.
///
/// The flip happens exactly once: status moves to ended, a SYSTEM event
/// records it, the store commits, and the expiry error is returned so
/// the triggering action is rejected. Already-ended or untimed sessions
/// pass through untouched.
pub fn check_time_expired<S: GameStore>(
    store: &mut S,
    session: &mut Session,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    if session.status != SessionStatus::Active {
        return Ok(());
    }
    if remaining_seconds(session, now) != Some(0) {
        return Ok(());
    }

    session.status = SessionStatus::Ended;
    store.put_session(session.clone());
    store.append_event(NewEvent {
        session_id: session.id,
        player_id: None,
        ts: now,
        payload: EventPayload::System {
            message: "Time expired, session ended automatically".to_string(),
        },
        delta_score: 0,
    });
    store.commit()?;

    info!(session_id = %session.id, "session time expired");
    Err(GameError::TimeExpired)
}
