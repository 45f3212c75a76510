// Per-session drafted state and the in-process session store.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::player::PlayerKey;

/// Opaque identifier of a user session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Players marked drafted in one session, in the order they were marked.
/// Only grows, except for an explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftSessionState {
    drafted: Vec<PlayerKey>,
    /// When the first pick of the current draft was marked.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl DraftSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drafted(&self) -> &[PlayerKey] {
        &self.drafted
    }

    pub fn len(&self) -> usize {
        self.drafted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafted.is_empty()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// 1-based draft position of `key`, if drafted.
    pub fn draft_position(&self, key: &PlayerKey) -> Option<usize> {
        self.drafted.iter().position(|k| k == key).map(|i| i + 1)
    }

    /// Positions of every drafted key, for bulk lookups.
    pub fn position_index(&self) -> HashMap<&PlayerKey, usize> {
        self.drafted
            .iter()
            .enumerate()
            .map(|(i, k)| (k, i + 1))
            .collect()
    }

    pub(crate) fn push(&mut self, key: PlayerKey) -> usize {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.drafted.push(key);
        self.drafted.len()
    }

    pub(crate) fn clear(&mut self) {
        self.drafted.clear();
        self.started_at = None;
    }

    /// Encode for a session transport (cookie value, session table).
    pub fn to_session_value(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            warn!("failed to encode draft session: {}", e);
            String::from("{}")
        })
    }

    /// Decode a session value. Anything undecodable starts a fresh session.
    /// A repeated key keeps its first pick.
    pub fn from_session_value(value: &str) -> Self {
        match serde_json::from_str::<Self>(value) {
            Ok(mut state) => {
                let mut seen = HashSet::with_capacity(state.drafted.len());
                state.drafted.retain(|key| {
                    let first = seen.insert(key.clone());
                    if !first {
                        warn!("dropping repeated pick of {} from session value", key);
                    }
                    first
                });
                state
            }
            Err(e) => {
                warn!("discarding undecodable draft session value: {}", e);
                Self::default()
            }
        }
    }
}

/// A session identifier together with its drafted state.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSession {
    pub id: SessionId,
    pub state: DraftSessionState,
}

/// In-process session table holding each session's encoded value, the way
/// a server-side session backend would. Writes are last-write-wins per
/// session.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, String>> {
        self.sessions.lock().expect("session store mutex poisoned")
    }

    /// Load a session, starting an empty one if the id is unknown.
    pub fn load(&self, id: &SessionId) -> DraftSession {
        let value = self.sessions().get(id).cloned();
        let state = match value {
            Some(value) => DraftSessionState::from_session_value(&value),
            None => {
                debug!("starting new draft session {}", id);
                DraftSessionState::new()
            }
        };
        DraftSession {
            id: id.clone(),
            state,
        }
    }

    pub fn store(&self, session: DraftSession) {
        let value = session.state.to_session_value();
        self.sessions().insert(session.id, value);
    }

    pub fn remove(&self, id: &SessionId) {
        self.sessions().remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_value_round_trips() {
        let mut state = DraftSessionState::new();
        state.push(PlayerKey::new("A", "QB"));
        state.push(PlayerKey::new("B", "RB"));
        let decoded = DraftSessionState::from_session_value(&state.to_session_value());
        assert_eq!(decoded, state);
        assert_eq!(decoded.draft_position(&PlayerKey::new("B", "RB")), Some(2));
    }

    #[test]
    fn garbage_session_value_is_fresh_session() {
        let state = DraftSessionState::from_session_value("not json [");
        assert!(state.is_empty());
        assert!(state.started_at().is_none());
    }

    #[test]
    fn legacy_value_without_start_time_decodes() {
        let state = DraftSessionState::from_session_value(
            r#"{"drafted":[{"player":"A","position":"QB"}]}"#,
        );
        assert_eq!(state.len(), 1);
        assert!(state.started_at().is_none());
    }

    #[test]
    fn repeated_keys_in_session_value_keep_first_pick() {
        let a = PlayerKey::new("A", "WR");
        let b = PlayerKey::new("B", "WR");
        let mut state = DraftSessionState::from_session_value(
            r#"{"drafted":[
                {"player":"A","position":"WR"},
                {"player":"B","position":"WR"},
                {"player":"A","position":"WR"}
            ]}"#,
        );
        assert_eq!(state.drafted(), &[a.clone(), b.clone()]);
        assert_eq!(state.draft_position(&a), Some(1));
        assert_eq!(state.position_index().get(&a), Some(&1));

        let outcome =
            crate::draft::tracker::mark_drafted(&mut state, PlayerKey::new("C", "WR"));
        assert_eq!(
            outcome,
            crate::draft::tracker::MarkOutcome::Drafted { pick: 3 }
        );
    }

    #[test]
    fn clear_resets_start_time() {
        let mut state = DraftSessionState::new();
        state.push(PlayerKey::new("A", "QB"));
        assert!(state.started_at().is_some());
        state.clear();
        assert!(state.is_empty());
        assert!(state.started_at().is_none());
    }

    #[test]
    fn store_isolates_sessions() {
        let store = SessionStore::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");

        let mut session = store.load(&a);
        session.state.push(PlayerKey::new("A", "QB"));
        store.store(session);

        assert_eq!(store.load(&a).state.len(), 1);
        assert!(store.load(&b).state.is_empty());
        assert_eq!(store.len(), 1);

        store.remove(&a);
        assert!(store.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let store = SessionStore::new();
        let id = SessionId::new("s");
        let mut first = store.load(&id);
        let mut second = store.load(&id);
        first.state.push(PlayerKey::new("A", "QB"));
        second.state.push(PlayerKey::new("B", "RB"));
        second.state.push(PlayerKey::new("C", "WR"));
        store.store(first);
        store.store(second);
        assert_eq!(store.load(&id).state.len(), 2);
    }

    #[test]
    fn stored_session_keeps_pick_order() {
        let store = SessionStore::new();
        let id = SessionId::new("order");
        let mut session = store.load(&id);
        session.state.push(PlayerKey::new("C", "WR"));
        session.state.push(PlayerKey::new("A", "QB"));
        store.store(session);

        let loaded = store.load(&id);
        assert_eq!(
            loaded.state.drafted(),
            &[PlayerKey::new("C", "WR"), PlayerKey::new("A", "QB")]
        );
    }
}
