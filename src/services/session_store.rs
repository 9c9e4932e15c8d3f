use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use hex::encode as hex_encode;
use rand::RngCore;

use crate::models::Session;

/// Random 128-bit token, hex encoded. Used for session ids and CSRF tokens.
pub fn random_token() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex_encode(b)
}

/// Sessions keyed by id, shared across requests.
///
/// Expired entries are dropped lazily: a lookup removes the entry it finds
/// expired, and every insert sweeps the whole map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create and store a session under a fresh id.
    pub fn create(&self, username: &str, role: &str) -> Session {
        self.create_at(username, role, Instant::now())
    }

    pub(crate) fn create_at(&self, username: &str, role: &str, now: Instant) -> Session {
        let mut session = Session::new(random_token(), username, role);
        session.created_at = now;
        session.last_accessed = now;
        let mut sessions = self.lock();
        let timeout = self.idle_timeout;
        sessions.retain(|_, s| !s.is_expired(now, timeout));
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Look up a live session and mark it as accessed.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.get_at(id, Instant::now())
    }

    pub(crate) fn get_at(&self, id: &str, now: Instant) -> Option<Session> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id)?;
        if session.is_expired(now, self.idle_timeout) {
            sessions.remove(id);
            tracing::debug!("dropped expired session");
            return None;
        }
        session.last_accessed = now;
        Some(session.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Session> {
        self.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
