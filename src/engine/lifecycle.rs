//! Session lifecycle: create, join, start, end, reveal.

use chrono::{DateTime, Utc};
use rand::{CryptoRng, Rng};
use tracing::info;

use crate::config::{Difficulty, SessionConfig};
use crate::engine::devices::{generate_device_ps, generate_join_code, generate_rejoin_token};
use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{
    EventPayload, NewEvent, Player, Session, SessionId, SessionStatus,
};

/// Result of a join: the player, and whether this was a reconnection.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub session: Session,
    pub player: Player,
    pub rejoined: bool,
}

/// Create a session in the lobby with freshly generated hidden rates.
///
/// The seed comes from the caller's crypto RNG; the join code is
/// re-drawn until unique across the store.
pub fn create_session<S, R>(
    store: &mut S,
    rng: &mut R,
    difficulty: Difficulty,
    config: SessionConfig,
    now: DateTime<Utc>,
) -> Result<Session, GameError>
where
    S: GameStore,
    R: Rng + CryptoRng,
{
    let seed = u64::from(rng.gen::<u32>());

    let mut join_code = generate_join_code(rng);
    while store.session_by_join_code(&join_code).is_some() {
        join_code = generate_join_code(rng);
    }

    let device_ps = generate_device_ps(config.device_count, seed, difficulty);
    let session = Session::new(join_code, seed, difficulty, device_ps, config, now);

    store.put_session(session.clone());
    store.commit()?;

    info!(session_id = %session.id, join_code = %session.join_code, %difficulty, "session created");
    Ok(session)
}

/// Join a session by code, or reconnect with a rejoin token.
///
/// New players are admitted only while the session is in the lobby; an
/// existing name can only be reclaimed with its matching token.
pub fn join_session<S, R>(
    store: &mut S,
    rng: &mut R,
    join_code: &str,
    name: &str,
    rejoin_token: Option<&str>,
    now: DateTime<Utc>,
) -> Result<JoinOutcome, GameError>
where
    S: GameStore,
    R: Rng + CryptoRng,
{
    let join_code = join_code.trim().to_uppercase();
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::BlankName);
    }

    let session = store
        .session_by_join_code(&join_code)
        .ok_or(GameError::SessionNotFound { code: join_code })?;
    if session.status == SessionStatus::Ended {
        return Err(GameError::SessionEnded);
    }

    if let Some(existing) = store.player_by_name(session.id, name) {
        if rejoin_token != Some(existing.rejoin_token.as_str()) {
            return Err(GameError::NameTaken {
                name: name.to_string(),
            });
        }
        return Ok(JoinOutcome {
            session,
            player: existing,
            rejoined: true,
        });
    }

    // Admitting new players mid-game would invite multi-accounting.
    if session.status == SessionStatus::Active {
        return Err(GameError::JoinedMidGame);
    }

    let player = Player::new(
        session.id,
        name.to_string(),
        generate_rejoin_token(rng),
        now,
    );
    store.put_player(player.clone());
    store.commit()?;

    info!(session_id = %session.id, player_id = %player.id, name, "player joined");
    Ok(JoinOutcome {
        session,
        player,
        rejoined: false,
    })
}

/// Move a lobby session to active and start its clock.
pub fn start_session<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    now: DateTime<Utc>,
) -> Result<Session, GameError> {
    transition(store, session_id, SessionStatus::Active, "Session started", now)
}

/// End an active session.
pub fn end_session<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    now: DateTime<Utc>,
) -> Result<Session, GameError> {
    transition(store, session_id, SessionStatus::Ended, "Session ended", now)
}

fn transition<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    to: SessionStatus,
    message: &str,
    now: DateTime<Utc>,
) -> Result<Session, GameError> {
    let mut session = store.session(session_id)?;
    if !session.status.can_transition(to) {
        return Err(GameError::InvalidTransition {
            from: session.status,
            to,
        });
    }

    session.status = to;
    if to == SessionStatus::Active {
        session.started_at = Some(now);
    }

    store.put_session(session.clone());
    store.append_event(NewEvent {
        session_id,
        player_id: None,
        ts: now,
        payload: EventPayload::System {
            message: message.to_string(),
        },
        delta_score: 0,
    });
    store.commit()?;

    info!(%session_id, status = %session.status, "session transitioned");
    Ok(session)
}

/// The hidden probabilities, for the instructor's debrief. Only
/// available once the session has ended.
pub fn reveal<S: GameStore>(store: &S, session_id: SessionId) -> Result<Vec<f64>, GameError> {
    let session = store.session(session_id)?;
    Ok(session.revealed_ps()?.to_vec())
}
