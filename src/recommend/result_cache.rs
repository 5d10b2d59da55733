//! In-memory TTL cache for assembled recommendation pages.
//!
//! The clock is injected so expiry is testable without sleeping, and the
//! cache is passed by reference into the components that need it rather
//! than living as module-level state.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use fnv::FnvHasher;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache key: the requesting user plus a hash of the query options, so
/// different option sets never alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub user_id: String,
    pub options_hash: u64,
}

impl ResultKey {
    pub fn new(user_id: &str, options: &impl Hash) -> Self {
        let mut hasher = FnvHasher::default();
        options.hash(&mut hasher);
        Self {
            user_id: user_id.to_string(),
            options_hash: hasher.finish(),
        }
    }
}

/// Concurrent TTL map of assembled results.
pub struct ResultCache<T> {
    entries: DashMap<ResultKey, (Instant, T)>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Live entry for the key, dropping it if expired.
    pub fn get(&self, key: &ResultKey) -> Option<T> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            let (stored_at, value) = entry.value();
            if now.duration_since(*stored_at) < self.ttl {
                return Some(value.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    pub fn put(&self, key: ResultKey, value: T) {
        self.entries.insert(key, (self.clock.now(), value));
    }

    /// Drop every cached page for one user, e.g. after a vector rebuild.
    pub fn invalidate_user(&self, user_id: &str) {
        self.entries.retain(|key, _| key.user_id != user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
