#![deny(unreachable_pub)]

//! Rules engine for a classroom quality-inspection underwriting game.
//!
//! An instructor creates a session with hidden per-batch defect rates.
//! Players spend turns and a shared inspection budget sampling batches
//! (Bernoulli trials), then sell confidence-interval "policies" priced
//! by interval width and confidence level and scored against the hidden
//! true rate.
//!
//! The crate is organized as:
//! - **types**: session, player, per-batch stats, and the append-only event log
//! - **engine**: probability generation, action executors, timer, projections
//! - **store**: the persistence seam ([`store::GameStore`]) plus an in-memory
//!   implementation for tests and demos
//!
//! The engine never touches ambient state: the clock, the RNG, and the
//! store are all passed in by the caller.

// Core modules
mod config;
mod errors;

// Domain modules
pub mod engine;
pub mod store;
pub mod types;

// Re-exports
pub use config::{Difficulty, DifficultyPreset, SessionConfig, ShopConfig};
pub use engine::{
    buy_budget, buy_turn, check_time_expired, create_session, end_session, execute_sell,
    execute_test, export_rows, generate_device_ps, generate_join_code, join_session, leaderboard,
    player_devices, player_events, remaining_seconds, reveal, session_summary, start_session,
    DeviceView, ExportRow, JoinOutcome, LeaderboardEntry, PurchaseResult, SellResult,
    SessionSummary, TestResult,
};
pub use errors::{GameError, StoreError};
pub use store::{GameStore, MemoryStore};
pub use types::{
    DeviceStat, Event, EventKind, EventPayload, NewEvent, Player, PlayerId, PurchaseItem, Session,
    SessionId, SessionStatus,
};
