//! Mid-game purchases: trade score for extra turns or budget.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::engine::timer;
use crate::errors::GameError;
use crate::store::GameStore;
use crate::types::{EventPayload, NewEvent, PlayerId, PurchaseItem, SessionId, SessionStatus};

/// Outcome of a purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResult {
    pub item: PurchaseItem,
    /// Score spent.
    pub cost: i64,
    /// Turns or samples gained.
    pub amount: u32,
    /// Player's score after the purchase.
    pub score: i64,
}

/// Spend score for one extra turn.
pub fn buy_turn<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    player_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<PurchaseResult, GameError> {
    execute_purchase(store, session_id, player_id, PurchaseItem::Turn, now)
}

/// Spend score for a fixed refill of inspection budget.
pub fn buy_budget<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    player_id: PlayerId,
    now: DateTime<Utc>,
) -> Result<PurchaseResult, GameError> {
    execute_purchase(store, session_id, player_id, PurchaseItem::Budget, now)
}

fn execute_purchase<S: GameStore>(
    store: &mut S,
    session_id: SessionId,
    player_id: PlayerId,
    item: PurchaseItem,
    now: DateTime<Utc>,
) -> Result<PurchaseResult, GameError> {
    let mut session = store.session(session_id)?;
    let mut player = store.player(player_id)?;

    timer::check_time_expired(store, &mut session, now)?;
    if session.status != SessionStatus::Active {
        return Err(GameError::SessionNotActive);
    }

    let shop = &session.config.shop;
    let (cost, amount) = match item {
        PurchaseItem::Turn => (shop.turn_cost, 1),
        PurchaseItem::Budget => (shop.budget_cost, shop.budget_amount),
    };
    if player.score < cost {
        return Err(GameError::InsufficientScore {
            need: cost,
            have: player.score,
        });
    }

    player.score -= cost;
    match item {
        PurchaseItem::Turn => player.extra_turns += amount,
        PurchaseItem::Budget => player.extra_budget += amount,
    }

    let result = PurchaseResult {
        item,
        cost,
        amount,
        score: player.score,
    };

    store.put_player(player);
    store.append_event(NewEvent {
        session_id,
        player_id: Some(player_id),
        ts: now,
        payload: EventPayload::Purchase { item, cost, amount },
        delta_score: -cost,
    });
    store.commit()?;

    debug!(%session_id, %player_id, ?item, cost, amount, "purchase executed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testkit::active_session;
    use crate::store::MemoryStore;
    use crate::types::{EventKind, Player, Session};

    fn funded(score: i64) -> (MemoryStore, Session, Player) {
        let (mut store, session, mut player) = active_session(|_| {});
        player.score = score;
        store.put_player(player.clone());
        (store, session, player)
    }

    #[test]
    fn test_buy_turn_exchanges_score_for_allowance() {
        let (mut store, session, player) = funded(100);
        let result = buy_turn(&mut store, session.id, player.id, Utc::now()).unwrap();

        assert_eq!(result.item, PurchaseItem::Turn);
        assert_eq!(result.cost, 60);
        assert_eq!(result.amount, 1);
        assert_eq!(result.score, 40);

        let after = store.player(player.id).unwrap();
        assert_eq!(after.extra_turns, 1);
        assert_eq!(after.score, 40);

        let events = store.events_for_player(player.id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::Purchase);
        assert_eq!(events[0].delta_score, -60);
    }

    #[test]
    fn test_buy_budget_adds_configured_refill() {
        let (mut store, session, player) = funded(100);
        let result = buy_budget(&mut store, session.id, player.id, Utc::now()).unwrap();

        assert_eq!(result.cost, 40);
        assert_eq!(result.amount, 50);
        assert_eq!(store.player(player.id).unwrap().extra_budget, 50);
    }

    #[test]
    fn test_purchase_requires_sufficient_score() {
        let (mut store, session, player) = funded(10);
        let err = buy_turn(&mut store, session.id, player.id, Utc::now()).unwrap_err();
        assert_eq!(err, GameError::InsufficientScore { need: 60, have: 10 });
        assert_eq!(store.player(player.id).unwrap().score, 10);
        assert!(store.events_for_player(player.id).is_empty());
    }

    #[test]
    fn test_purchase_rejected_outside_active() {
        let (mut store, session, player) = funded(100);
        let mut ended = store.session(session.id).unwrap();
        ended.status = SessionStatus::Ended;
        store.put_session(ended);

        let err = buy_budget(&mut store, session.id, player.id, Utc::now()).unwrap_err();
        assert_eq!(err, GameError::SessionNotActive);
    }
}
