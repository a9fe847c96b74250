//! SELL_POLICY action: price a confidence interval, score it against
//! the hidden rate.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::{has_sold_device, timer};
use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{EventPayload, NewEvent, PlayerId, SessionId, SessionStatus};

/// Outcome of a SELL_POLICY action.
///
/// Carries the true rate so the boundary can store or reveal it later;
/// it is never shown to the player while the session runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SellResult {
    pub device_id: usize,
    pub confidence: String,
    pub lower: f64,
    pub upper: f64,
    /// Premium earned for the interval, floored at 0.
    pub premium: i64,
    /// Penalty charged on a miss, 0 on a hit.
    pub penalty: i64,
    /// Net score change, premium - penalty.
    pub delta: i64,
    /// Whether the interval covered the true rate.
    pub hit: bool,
    /// The batch's hidden defect rate.
    pub true_p: f64,
}

/// Premium for an interval of `width` at a given confidence bonus.
///
/// floor(scale * (1 - width)^2 * bonus), floored at 0. Narrow intervals
/// pay quadratically more.
fn premium(scale: i64, width: f64, bonus: f64) -> i64 {
    let raw = (scale as f64 * (1.0 - width).powi(2) * bonus).floor() as i64;
    raw.max(0)
}

/// Execute a SELL_POLICY: the player claims `lower <= p <= upper` at a
/// named confidence level.
///
/// Validation order: expiry, session active, batch id in range, a turn
/// remaining, confidence key known, bounds satisfy 0 <= L < U <= 1,
/// prior test on the batch when configured, no policy already sold on
/// the batch. The score delta lands immediately; score may go negative.
pub fn execute_sell<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    player_id: PlayerId,
    device_id: usize,
    confidence: &str,
    lower: f64,
    upper: f64,
    now: DateTime<Utc>,
) -> Result<SellResult, GameError> {
    let mut session = store.session(session_id)?;
    let mut player = store.player(player_id)?;

    timer::check_time_expired(store, &mut session, now)?;
    if session.status != SessionStatus::Active {
        return Err(GameError::SessionNotActive);
    }
    let Some(true_p) = session.device_p(device_id) else {
        return Err(GameError::InvalidDevice {
            device_id,
            device_count: session.device_count(),
        });
    };
    let config = &session.config;
    if player.turns_remaining(config) == 0 {
        return Err(GameError::NoTurnsRemaining);
    }
    // The level must be priced by both tables.
    let (Some(&bonus), Some(&miss_penalty)) = (
        config.confidence_bonus.get(confidence),
        config.miss_penalty.get(confidence),
    ) else {
        return Err(GameError::InvalidConfidence {
            given: confidence.to_string(),
        });
    };
    if !(0.0 <= lower && lower < upper && upper <= 1.0) {
        return Err(GameError::InvalidInterval { lower, upper });
    }
    if config.require_prior_test {
        let tested = store
            .device_stat(player_id, device_id)
            .map(|s| s.tested())
            .unwrap_or(false);
        if !tested {
            return Err(GameError::PriorTestRequired { device_id });
        }
    }
    if has_sold_device(store, player_id, device_id) {
        return Err(GameError::PolicyAlreadySold { device_id });
    }

    let width = upper - lower;
    let premium = premium(config.premium_scale, width, bonus);
    let hit = lower <= true_p && true_p <= upper;
    let penalty = if hit { 0 } else { miss_penalty };
    let delta = premium - penalty;

    player.turns_used += 1;
    player.score += delta;

    let result = SellResult {
        device_id,
        confidence: confidence.to_string(),
        lower,
        upper,
        premium,
        penalty,
        delta,
        hit,
        true_p,
    };

    store.put_player(player);
    store.append_event(NewEvent {
        session_id,
        player_id: Some(player_id),
        ts: now,
        payload: EventPayload::Sell {
            device_id,
            confidence: confidence.to_string(),
            lower,
            upper,
            width: (width * 10_000.0).round() / 10_000.0,
            premium,
            penalty,
            delta,
            hit,
        },
        delta_score: delta,
    });
    store.commit()?;

    debug!(%session_id, %player_id, device_id, confidence, premium, penalty, delta, hit, "policy sold");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::engine::execute_test;
    use crate::engine::testkit::{active_session_with_ps, rng};
    use crate::store::MemoryStore;
    use crate::types::{Player, Session};

    /// Batches at p = 0.5 / 0.05 / 0.95, prior-test gate off unless a
    /// test opts back in.
    fn fixture(tweak: impl FnOnce(&mut SessionConfig)) -> (MemoryStore, Session, Player) {
        let mut config = SessionConfig::default();
        config.require_prior_test = false;
        tweak(&mut config);
        active_session_with_ps(vec![0.5, 0.05, 0.95], config)
    }

    // =========================================================================
    // Premium Arithmetic
    // =========================================================================

    #[test]
    fn test_premium_formula() {
        // floor(120 * (1 - 0.4)^2 * 1.0) = floor(43.2) = 43
        assert_eq!(premium(120, 0.4, 1.0), 43);
        // Full-width interval earns nothing.
        assert_eq!(premium(120, 1.0, 1.0), 0);
        // Bonus scales multiplicatively: floor(43.2 * 1.5) = 64.
        assert_eq!(premium(120, 0.4, 1.5), 64);
        assert_eq!(premium(0, 0.1, 1.0), 0);
    }

    #[test]
    fn test_hit_pays_premium_exactly() {
        let (mut store, session, player) = fixture(|c| c.premium_scale = 120);
        let result = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap();

        assert!(result.hit);
        assert_eq!(result.premium, 43);
        assert_eq!(result.penalty, 0);
        assert_eq!(result.delta, 43);
        assert_eq!(store.player(player.id).unwrap().score, 43);
        assert_eq!(store.player(player.id).unwrap().turns_used, 1);
    }

    #[test]
    fn test_miss_charges_penalty_and_can_go_negative() {
        let (mut store, session, player) = fixture(|_| {});
        // True p = 0.5; interval [0.8, 0.9] misses.
        let result = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.99",
            0.8,
            0.9,
            Utc::now(),
        )
        .unwrap();

        assert!(!result.hit);
        assert_eq!(result.penalty, 600);
        assert_eq!(result.delta, result.premium - 600);
        assert!(result.delta < 0);
        assert_eq!(store.player(player.id).unwrap().score, result.delta);
    }

    #[test]
    fn test_boundary_inclusive_hit() {
        let (mut store, session, player) = fixture(|_| {});
        // p = 0.5 sits exactly on the upper bound.
        let result = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.1,
            0.5,
            Utc::now(),
        )
        .unwrap();
        assert!(result.hit);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_rejects_unknown_confidence() {
        let (mut store, session, player) = fixture(|_| {});
        let err = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.50",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidConfidence {
                given: "0.50".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_bad_intervals() {
        let (mut store, session, player) = fixture(|_| {});
        for (lower, upper) in [
            (-0.1, 0.5),
            (0.5, 1.1),
            (0.7, 0.3),
            (0.4, 0.4),
            (f64::NAN, 0.5),
            (0.1, f64::NAN),
        ] {
            let err = execute_sell(
                &mut store,
                session.id,
                player.id,
                0,
                "0.90",
                lower,
                upper,
                Utc::now(),
            )
            .unwrap_err();
            assert!(
                matches!(err, GameError::InvalidInterval { .. }),
                "accepted L={lower} U={upper}"
            );
        }
    }

    #[test]
    fn test_prior_test_gate() {
        let (mut store, session, player) = fixture(|c| c.require_prior_test = true);
        let err = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, GameError::PriorTestRequired { device_id: 0 });

        // One test on the batch opens the gate.
        execute_test(
            &mut store,
            &mut rng(),
            session.id,
            player.id,
            0,
            10,
            Utc::now(),
        )
        .unwrap();
        execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap();
    }

    #[test]
    fn test_second_sell_on_same_batch_always_fails() {
        let (mut store, session, player) = fixture(|_| {});
        // First sell misses; the batch is still spent.
        execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.8,
            0.9,
            Utc::now(),
        )
        .unwrap();
        let err = execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, GameError::PolicyAlreadySold { device_id: 0 });

        // Other batches stay sellable.
        execute_sell(
            &mut store,
            session.id,
            player.id,
            1,
            "0.90",
            0.0,
            0.2,
            Utc::now(),
        )
        .unwrap();
    }

    #[test]
    fn test_sold_batch_blocks_further_testing() {
        let (mut store, session, player) = fixture(|_| {});
        execute_sell(
            &mut store,
            session.id,
            player.id,
            0,
            "0.90",
            0.3,
            0.7,
            Utc::now(),
        )
        .unwrap();
        let err = execute_test(
            &mut store,
            &mut rng(),
            session.id,
            player.id,
            0,
            10,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, GameError::PolicyAlreadySold { device_id: 0 });
    }

    #[test]
    fn test_sell_consumes_turn_but_no_budget() {
        let (mut store, session, player) = fixture(|_| {});
        execute_sell(
            &mut store,
            session.id,
            player.id,
            2,
            "0.95",
            0.9,
            1.0,
            Utc::now(),
        )
        .unwrap();
        let after = store.player(player.id).unwrap();
        assert_eq!(after.turns_used, 1);
        assert_eq!(after.budget_used, 0);
    }
}
