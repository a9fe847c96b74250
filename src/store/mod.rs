//! Persistence seam for the rules engine.
//!
//! The engine consumes storage only as "read entity by id or filter,
//! write it back, append a row, commit". Anything exposing that
//! contract works: the in-memory store here, or an adapter over a
//! relational database.
//!
//! Each action is one transaction: load, validate, mutate, append,
//! commit. Executors perform no writes until every validation has
//! passed, so a rejected action leaves the store untouched. Validation
//! reads are NOT serialized against other writers: two simultaneous
//! actions by the same player can both pass a turn or budget check
//! before either commits. A backing store with serializable
//! transactions closes that gap; this trait does not promise it.

mod memory;

pub use memory::MemoryStore;

use crate::errors::StoreError;
use crate::types::{DeviceStat, Event, NewEvent, Player, PlayerId, Session, SessionId};

/// Storage contract the executors and projections run against.
///
/// Listing methods return entities in insertion order; event queries
/// return ascending sequence order.
pub trait GameStore {
    fn session(&self, id: SessionId) -> Result<Session, StoreError>;
    fn session_by_join_code(&self, join_code: &str) -> Option<Session>;
    fn sessions(&self) -> Vec<Session>;
    fn put_session(&mut self, session: Session);
    /// Remove a session and everything it owns: players, stats, events.
    fn delete_session(&mut self, id: SessionId);

    fn player(&self, id: PlayerId) -> Result<Player, StoreError>;
    fn player_by_name(&self, session_id: SessionId, name: &str) -> Option<Player>;
    fn players_in(&self, session_id: SessionId) -> Vec<Player>;
    fn put_player(&mut self, player: Player);

    fn device_stat(&self, player_id: PlayerId, device_id: usize) -> Option<DeviceStat>;
    fn device_stats_for(&self, player_id: PlayerId) -> Vec<DeviceStat>;
    fn put_device_stat(&mut self, stat: DeviceStat);

    /// Append a log row; the store assigns the next sequence number.
    fn append_event(&mut self, event: NewEvent) -> Event;
    fn events_for_session(&self, session_id: SessionId) -> Vec<Event>;
    fn events_for_player(&self, player_id: PlayerId) -> Vec<Event>;

    /// Make all writes since the last commit durable.
    fn commit(&mut self) -> Result<(), StoreError>;
}
