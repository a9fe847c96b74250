//! In-memory [`GameStore`] used by tests and the demo binary.

use crate::errors::StoreError;
use crate::store::GameStore;
use crate::types::{DeviceStat, Event, NewEvent, Player, PlayerId, Session, SessionId};

/// Vec-backed store. Writes apply immediately; `commit` is the
/// durability point for stores that need one and a no-op here.
///
/// Classroom scale (tens of players, hundreds of events) keeps linear
/// scans comfortably fast; no indexes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Vec<Session>,
    players: Vec<Player>,
    stats: Vec<DeviceStat>,
    events: Vec<Event>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn session(&self, id: SessionId) -> Result<Session, StoreError> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::SessionNotFound(id))
    }

    fn session_by_join_code(&self, join_code: &str) -> Option<Session> {
        self.sessions
            .iter()
            .find(|s| s.join_code == join_code)
            .cloned()
    }

    fn sessions(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    fn put_session(&mut self, session: Session) {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(slot) => *slot = session,
            None => self.sessions.push(session),
        }
    }

    fn delete_session(&mut self, id: SessionId) {
        let doomed: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.session_id == id)
            .map(|p| p.id)
            .collect();
        self.sessions.retain(|s| s.id != id);
        self.players.retain(|p| p.session_id != id);
        self.stats.retain(|st| !doomed.contains(&st.player_id));
        self.events.retain(|e| e.session_id != id);
    }

    fn player(&self, id: PlayerId) -> Result<Player, StoreError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::PlayerNotFound(id))
    }

    fn player_by_name(&self, session_id: SessionId, name: &str) -> Option<Player> {
        self.players
            .iter()
            .find(|p| p.session_id == session_id && p.name == name)
            .cloned()
    }

    fn players_in(&self, session_id: SessionId) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect()
    }

    fn put_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(slot) => *slot = player,
            None => self.players.push(player),
        }
    }

    fn device_stat(&self, player_id: PlayerId, device_id: usize) -> Option<DeviceStat> {
        self.stats
            .iter()
            .find(|s| s.player_id == player_id && s.device_id == device_id)
            .cloned()
    }

    fn device_stats_for(&self, player_id: PlayerId) -> Vec<DeviceStat> {
        self.stats
            .iter()
            .filter(|s| s.player_id == player_id)
            .cloned()
            .collect()
    }

    fn put_device_stat(&mut self, stat: DeviceStat) {
        match self
            .stats
            .iter_mut()
            .find(|s| s.player_id == stat.player_id && s.device_id == stat.device_id)
        {
            Some(slot) => *slot = stat,
            None => self.stats.push(stat),
        }
    }

    fn append_event(&mut self, event: NewEvent) -> Event {
        self.next_seq += 1;
        let committed = Event {
            seq: self.next_seq,
            session_id: event.session_id,
            player_id: event.player_id,
            ts: event.ts,
            payload: event.payload,
            delta_score: event.delta_score,
        };
        self.events.push(committed.clone());
        committed
    }

    fn events_for_session(&self, session_id: SessionId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect()
    }

    fn events_for_player(&self, player_id: PlayerId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.player_id == Some(player_id))
            .cloned()
            .collect()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, SessionConfig};
    use crate::types::EventPayload;
    use chrono::Utc;

    fn session() -> Session {
        let config = SessionConfig::default();
        let ps = vec![0.5; config.device_count];
        Session::new(
            "AAAAAA".to_string(),
            1,
            Difficulty::Medium,
            ps,
            config,
            Utc::now(),
        )
    }

    fn system_event(session_id: SessionId, player_id: Option<PlayerId>) -> NewEvent {
        NewEvent {
            session_id,
            player_id,
            ts: Utc::now(),
            payload: EventPayload::System {
                message: "test".to_string(),
            },
            delta_score: 0,
        }
    }

    #[test]
    fn test_sequence_numbers_strictly_increase() {
        let mut store = MemoryStore::new();
        let s = session();
        let sid = s.id;
        store.put_session(s);

        let seqs: Vec<u64> = (0..5)
            .map(|_| store.append_event(system_event(sid, None)).seq)
            .collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_put_player_upserts() {
        let mut store = MemoryStore::new();
        let s = session();
        let sid = s.id;
        store.put_session(s);

        let mut player = Player::new(sid, "Ada".to_string(), "tok".to_string(), Utc::now());
        store.put_player(player.clone());
        player.score = 99;
        store.put_player(player.clone());

        assert_eq!(store.players_in(sid).len(), 1);
        assert_eq!(store.player(player.id).unwrap().score, 99);
    }

    #[test]
    fn test_players_listed_in_insertion_order() {
        let mut store = MemoryStore::new();
        let s = session();
        let sid = s.id;
        store.put_session(s);

        for name in ["Carl", "Ada", "Blaise"] {
            store.put_player(Player::new(
                sid,
                name.to_string(),
                "tok".to_string(),
                Utc::now(),
            ));
        }
        let names: Vec<String> = store.players_in(sid).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Carl", "Ada", "Blaise"]);
    }

    #[test]
    fn test_delete_session_cascades() {
        let mut store = MemoryStore::new();
        let s = session();
        let other = session();
        let sid = s.id;
        let other_id = other.id;
        store.put_session(s);
        store.put_session(other);

        let player = Player::new(sid, "Ada".to_string(), "tok".to_string(), Utc::now());
        let pid = player.id;
        store.put_player(player);
        store.put_device_stat(DeviceStat::new(pid, 0));
        store.append_event(system_event(sid, Some(pid)));
        store.append_event(system_event(other_id, None));

        store.delete_session(sid);

        assert!(store.session(sid).is_err());
        assert!(store.players_in(sid).is_empty());
        assert!(store.device_stats_for(pid).is_empty());
        assert!(store.events_for_session(sid).is_empty());
        // Unrelated session survives.
        assert!(store.session(other_id).is_ok());
        assert_eq!(store.events_for_session(other_id).len(), 1);
    }
}
