//! Keyed store whose entries carry the time they were written.
//!
//! Freshness is judged against an injected clock on every read: an entry is
//! stale once its age reaches the window. Stale entries stay until swept.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::infrastructure::ports::ClockPort;

#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

impl<V> Stamped<V> {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }
}

pub struct StampedStore<K, V> {
    slots: RwLock<HashMap<K, Stamped<V>>>,
    window: Duration,
    clock: Arc<dyn ClockPort>,
}

impl<K, V> StampedStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(window: Duration, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            window,
            clock,
        }
    }

    fn within_window(&self, entry: &Stamped<V>, now: DateTime<Utc>) -> bool {
        entry.age(now) < self.window
    }

    /// Write `value` under `key` with the current time, overwriting in place.
    pub async fn put(&self, key: K, value: V) -> DateTime<Utc> {
        let stored_at = self.clock.now();
        self.slots
            .write()
            .await
            .insert(key, Stamped { value, stored_at });
        stored_at
    }

    /// The value under `key`, only while it is inside the window.
    pub async fn fresh(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let slots = self.slots.read().await;
        slots
            .get(key)
            .filter(|entry| self.within_window(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// When `key` was last written, stale or not.
    pub async fn stored_at(&self, key: &K) -> Option<DateTime<Utc>> {
        self.slots.read().await.get(key).map(|e| e.stored_at)
    }

    pub async fn evict(&self, key: &K) -> bool {
        self.slots.write().await.remove(key).is_some()
    }

    pub async fn evict_all(&self) -> usize {
        let mut slots = self.slots.write().await;
        let count = slots.len();
        slots.clear();
        count
    }

    /// Drop every stale entry; returns how many went.
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, entry| self.within_window(entry, now));
        before - slots.len()
    }

    /// Entry count, stale ones included.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
