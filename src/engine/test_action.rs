//! TEST action: pay budget and a turn, sample a batch, record totals.

use chrono::{DateTime, Utc};
use rand::{CryptoRng, Rng};
use tracing::debug;

use crate::engine::devices::draw_defects;
use crate::engine::{has_sold_device, timer};
use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{DeviceStat, EventPayload, NewEvent, PlayerId, SessionId, SessionStatus};

/// Outcome of a TEST action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub device_id: usize,
    /// Samples drawn.
    pub n: u32,
    /// Defects observed, 0 <= x <= n.
    pub x: u32,
    /// Player's budget consumption after this test.
    pub budget_used: u32,
    /// Player's turn consumption after this test.
    pub turns_used: u32,
}

/// Execute a TEST: draw x ~ Binomial(n, p) for the batch's hidden rate.
///
/// Validation order, each failing fast with its own error: expiry,
/// session active, batch id in range, sample size within bounds, a turn
/// remaining, budget covering n, no policy already sold on the batch.
/// No store write happens until every check has passed; the whole
/// action then lands in one commit.
pub fn execute_test<S, R>(
    store: &mut S,
    rng: &mut R,
    session_id: SessionId,
    player_id: PlayerId,
    device_id: usize,
    n: u32,
    now: DateTime<Utc>,
) -> Result<TestResult, GameError>
where
    S: GameStore,
    R: Rng + CryptoRng,
{
    let mut session = store.session(session_id)?;
    let mut player = store.player(player_id)?;

    timer::check_time_expired(store, &mut session, now)?;
    if session.status != SessionStatus::Active {
        return Err(GameError::SessionNotActive);
    }
    let Some(p) = session.device_p(device_id) else {
        return Err(GameError::InvalidDevice {
            device_id,
            device_count: session.device_count(),
        });
    };
    let config = &session.config;
    if n < config.min_n || n > config.max_n {
        return Err(GameError::SampleSizeOutOfBounds {
            n,
            min: config.min_n,
            max: config.max_n,
        });
    }
    if player.turns_remaining(config) == 0 {
        return Err(GameError::NoTurnsRemaining);
    }
    let budget_left = player.budget_remaining(config);
    if budget_left < n {
        return Err(GameError::InsufficientBudget {
            have: budget_left,
            need: n,
        });
    }
    if has_sold_device(store, player_id, device_id) {
        return Err(GameError::PolicyAlreadySold { device_id });
    }

    let x = draw_defects(rng, n, p);

    let mut stat = store
        .device_stat(player_id, device_id)
        .unwrap_or_else(|| DeviceStat::new(player_id, device_id));
    stat.record(n, x);
    player.turns_used += 1;
    player.budget_used += n;

    let result = TestResult {
        device_id,
        n,
        x,
        budget_used: player.budget_used,
        turns_used: player.turns_used,
    };

    store.put_device_stat(stat);
    store.put_player(player);
    store.append_event(NewEvent {
        session_id,
        player_id: Some(player_id),
        ts: now,
        payload: EventPayload::Test { device_id, n, x },
        delta_score: 0,
    });
    store.commit()?;

    debug!(%session_id, %player_id, device_id, n, x, "test executed");
    Ok(result)
}
