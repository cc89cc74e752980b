//! Session state store.
//!
//! [`SessionRepository`] is the seam the orchestrator depends on;
//! [`InMemorySessionStore`] is the single-process implementation, bounded
//! by an LRU capacity and an idle TTL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use counsel_core::config::SessionConfig;

use crate::error::ChatError;
use crate::types::Session;

/// Keyed store of conversation sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Return the session for `id`, creating an idle one if absent.
    async fn get(&self, id: &str) -> Result<Session, ChatError>;

    /// Store `session` under `id`.
    async fn put(&self, id: &str, session: Session) -> Result<(), ChatError>;

    /// Drop the session for `id`, if present.
    async fn evict(&self, id: &str) -> Result<(), ChatError>;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

struct Entry {
    session: Session,
    last_seen: Instant,
    tick: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Access order: tick -> session id. Smallest tick is least recent.
    recency: BTreeMap<u64, String>,
    next_tick: u64,
}

impl Inner {
    fn touch(&mut self, id: &str, session: Session) {
        let tick = self.next_tick;
        self.next_tick += 1;
        let entry = Entry {
            session,
            last_seen: Instant::now(),
            tick,
        };
        if let Some(old) = self.entries.insert(id.to_string(), entry) {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, id.to_string());
    }

    fn remove(&mut self, id: &str) {
        if let Some(old) = self.entries.remove(id) {
            self.recency.remove(&old.tick);
        }
    }

    fn evict_overflow(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            debug!(session_id = %oldest, "Evicting least recently used session");
            self.entries.remove(&oldest);
        }
    }
}

/// In-process session map with LRU and TTL eviction.
pub struct InMemorySessionStore {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_secs(u64::from(config.ttl_minutes) * 60),
        )
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ChatError> {
        self.inner
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Session, ChatError> {
        let mut inner = self.lock()?;
        let session = match inner.entries.get(id) {
            Some(entry) if entry.last_seen.elapsed() <= self.ttl => entry.session.clone(),
            Some(_) => {
                debug!(session_id = %id, "Session expired; starting fresh");
                Session::new()
            }
            None => Session::new(),
        };
        inner.touch(id, session.clone());
        inner.evict_overflow(self.capacity);
        Ok(session)
    }

    async fn put(&self, id: &str, session: Session) -> Result<(), ChatError> {
        let mut inner = self.lock()?;
        inner.touch(id, session);
        inner.evict_overflow(self.capacity);
        Ok(())
    }

    async fn evict(&self, id: &str) -> Result<(), ChatError> {
        self.lock()?.remove(id);
        Ok(())
    }

    async fn len(&self) -> usize {
        self.inner.lock().map(|i| i.entries.len()).unwrap_or(0)
    }
}
