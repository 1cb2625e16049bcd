use crate::utils::time::current_timestamp;
use dashmap::DashMap;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct SessionEntry {
    values: HashMap<String, String>,
    last_seen: i64,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_seen: current_timestamp(),
        }
    }
}

/// In-memory key/value storage for browser sessions.
///
/// A session only takes up space once something has been written to it.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionStore {
    /// Create a new SessionStore instance
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Attach to an existing session, or hand out a fresh id when `id` is unknown.
    ///
    /// A fresh session is not stored until its first [`Session::set`].
    pub fn open(self: &Arc<Self>, id: Option<&str>) -> Session {
        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                entry.last_seen = current_timestamp();
                return Session {
                    id: id.to_string(),
                    store: Arc::clone(self),
                    is_new: false,
                };
            }
        }

        Session {
            id: new_session_id(),
            store: Arc::clone(self),
            is_new: true,
        }
    }

    pub fn get(&self, id: &str, key: &str) -> Option<String> {
        self.sessions
            .get(id)
            .and_then(|entry| entry.values.get(key).cloned())
    }

    pub fn set(&self, id: &str, key: &str, value: &str) {
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(SessionEntry::new);
        entry.last_seen = current_timestamp();
        entry.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, id: &str, key: &str) -> Option<String> {
        self.sessions
            .get_mut(id)
            .and_then(|mut entry| entry.values.remove(key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Forget a session and everything stored in it
    pub fn destroy(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Drop sessions not seen for longer than `max_idle`. Returns how many were removed.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let max_idle = i64::try_from(max_idle.as_secs()).unwrap_or(i64::MAX);
        self.purge_seen_before(current_timestamp().saturating_sub(max_idle))
    }

    fn purge_seen_before(&self, cutoff: i64) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.last_seen >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on one visitor's session for the duration of a request
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<SessionStore>,
    is_new: bool,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when this request handed out the session id
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// True once something has been written to the session
    pub fn is_stored(&self) -> bool {
        self.store.contains(&self.id)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(&self.id, key)
    }

    pub fn set(&self, key: &str, value: &str) {
        self.store.set(&self.id, key, value);
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.store.remove(&self.id, key)
    }
}

/// 128 random bits, hex encoded
fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
