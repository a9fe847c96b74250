//! Shared fixtures for engine unit tests.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Difficulty, SessionConfig};
use crate::engine::devices::generate_device_ps;
use crate::store::{GameStore, MemoryStore};
use crate::types::{Player, Session, SessionStatus};

/// Seeded crypto-grade RNG; deterministic draws for assertions.
pub(crate) fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

/// A store holding one active session and one joined player.
///
/// `tweak` adjusts the config before the session is built; the hidden
/// probabilities are generated to match `device_count`.
pub(crate) fn active_session(
    tweak: impl FnOnce(&mut SessionConfig),
) -> (MemoryStore, Session, Player) {
    let mut config = SessionConfig::default();
    tweak(&mut config);
    let ps = generate_device_ps(config.device_count, 42, Difficulty::Medium);
    active_session_with_ps(ps, config)
}

/// Same, with the hidden probabilities pinned so hit/miss is knowable.
pub(crate) fn active_session_with_ps(
    ps: Vec<f64>,
    mut config: SessionConfig,
) -> (MemoryStore, Session, Player) {
    config.device_count = ps.len();
    let mut session = Session::new(
        "QK7PF3".to_string(),
        42,
        Difficulty::Medium,
        ps,
        config,
        Utc::now(),
    );
    session.status = SessionStatus::Active;
    session.started_at = Some(Utc::now());

    let player = Player::new(
        session.id,
        "Ada".to_string(),
        "feedfacefeedfacefeedfacefeedface".to_string(),
        Utc::now(),
    );

    let mut store = MemoryStore::new();
    store.put_session(session.clone());
    store.put_player(player.clone());
    (store, session, player)
}
