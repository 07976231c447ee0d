use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::types::TransferSession;

/// Identifies a session: transfer ids are scoped to the channel they arrive on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub channel: String,
    pub id: String,
}

impl SessionKey {
    pub fn new(channel: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.channel, self.id)
    }
}

/// Sessions owned by one assembler, with time-based eviction.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<SessionKey, TransferSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Evicts every session older than the TTL. Returns the evicted keys.
    pub fn sweep(&mut self, now: Instant) -> Vec<SessionKey> {
        let ttl = self.ttl;
        let expired: Vec<SessionKey> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.is_expired(now, ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.sessions.remove(key);
        }
        expired
    }

    /// Inserts a session, returning the one it replaced.
    pub fn insert(&mut self, key: SessionKey, session: TransferSession) -> Option<TransferSession> {
        self.sessions.insert(key, session)
    }

    pub fn get(&self, key: &SessionKey) -> Option<&TransferSession> {
        self.sessions.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut TransferSession> {
        self.sessions.get_mut(key)
    }

    pub fn remove(&mut self, key: &SessionKey) -> Option<TransferSession> {
        self.sessions.remove(key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
