//! The rules engine: validation, sampling, scoring, accounting.
//!
//! Components:
//! - **devices**: deterministic hidden-probability generation and code minting
//! - **lifecycle**: session create / join / start / end / reveal
//! - **test_action** / **sell_action** / **purchase**: the three player actions
//! - **timer**: lazy wall-clock expiry
//! - **views**: read-only projections (leaderboard, batch board, history, export)
//!
//! Executors take the store, the clock value, and (where sampling or
//! minting happens) an RNG as explicit arguments. There is no
//! background task: expiry is checked at the head of every
//! state-mutating or status-polling call. Isolation is whatever the
//! store provides; see the note in [`crate::store`].

mod devices;
mod lifecycle;
mod purchase;
mod sell_action;
mod test_action;
#[cfg(test)]
pub(crate) mod testkit;
mod timer;
mod views;

pub use devices::{generate_device_ps, generate_join_code, generate_rejoin_token};
pub use lifecycle::{
    create_session, end_session, join_session, reveal, start_session, JoinOutcome,
};
pub use purchase::{buy_budget, buy_turn, PurchaseResult};
pub use sell_action::{execute_sell, SellResult};
pub use test_action::{execute_test, TestResult};
pub use timer::{check_time_expired, remaining_seconds};
pub use views::{
    export_rows, leaderboard, player_devices, player_events, session_summary, DeviceView,
    ExportRow, LeaderboardEntry, SessionSummary,
};

use crate::store::GameStore;
use crate::types::PlayerId;

/// Whether this player already holds a policy on this batch.
///
/// Scans committed SELL events and compares the batch id field
/// structurally, so batch 1 never shadows batch 10.
pub(crate) fn has_sold_device<S: GameStore>(
    store: &S,
    player_id: PlayerId,
    device_id: usize,
) -> bool {
    store
        .events_for_player(player_id)
        .iter()
        .any(|e| e.sold_device() == Some(device_id))
}
