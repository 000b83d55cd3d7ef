//! Bounded cache of message bodies for recovering deleted content
//!
//! Discord's delete notification carries only ids, so the text, attachments
//! and stickers of a message are captured when it is created.
//!
//! - Capacity-bounded with least-recently-used eviction
//! - Optional TTL: expired entries read as absent and are dropped lazily
//!   or by [`MessageCache::purge_expired`]
//! - Edits never touch an entry; a later delete reports the original text

use crate::audit::{CachedMessage, MessageId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

struct Slot {
    message: CachedMessage,
    recorded_at: Instant,
    generation: u64,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<MessageId, Slot>,
    /// Recency queue; an element is live only while its generation matches the slot
    order: VecDeque<(MessageId, u64)>,
    next_generation: u64,
    stats: CacheStats,
}

impl Inner {
    fn touch(&mut self, id: MessageId) {
        let generation = self.next_generation;
        self.next_generation += 1;
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.generation = generation;
            self.order.push_back((id, generation));
        }
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.slots.len() > capacity {
            let Some((id, generation)) = self.order.pop_front() else {
                break;
            };
            if self.slots.get(&id).is_some_and(|s| s.generation == generation) {
                self.slots.remove(&id);
                self.stats.evictions += 1;
            }
        }
    }

    // Drop queue elements left behind by touches once they outnumber live slots.
    fn compact(&mut self) {
        if self.order.len() <= self.slots.len() * 2 + 64 {
            return;
        }
        let slots = &self.slots;
        self.order
            .retain(|(id, generation)| slots.get(id).is_some_and(|s| s.generation == *generation));
    }
}

pub struct MessageCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl MessageCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        tracing::info!(
            capacity = capacity,
            ttl_secs = ttl.map(|t| t.as_secs()),
            "Creating message cache"
        );

        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No invariant spans a panic point, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, recorded_at: Instant) -> bool {
        self.ttl.is_some_and(|ttl| recorded_at.elapsed() >= ttl)
    }

    /// Store a message body, replacing any earlier entry for the same id.
    pub fn record(&self, id: MessageId, message: CachedMessage) {
        let mut inner = self.lock();
        inner.slots.insert(
            id,
            Slot {
                message,
                recorded_at: Instant::now(),
                generation: 0,
            },
        );
        inner.touch(id);
        inner.evict_to(self.capacity);
        inner.compact();
    }

    /// Read a message body without removing it.
    pub fn lookup(&self, id: MessageId) -> Option<CachedMessage> {
        let mut inner = self.lock();

        let expired = match inner.slots.get(&id) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(slot) => self.is_expired(slot.recorded_at),
        };

        if expired {
            inner.slots.remove(&id);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            tracing::debug!(message_id = %id, "Cached message expired");
            return None;
        }

        inner.stats.hits += 1;
        inner.touch(id);
        inner.compact();
        inner.slots.get(&id).map(|slot| slot.message.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let mut inner = self.lock();
        let before = inner.slots.len();
        inner
            .slots
            .retain(|_, slot| slot.recorded_at.elapsed() < ttl);
        let removed = before - inner.slots.len();
        inner.stats.expirations += removed as u64;
        inner.compact();

        if removed > 0 {
            tracing::info!(
                removed = removed,
                remaining = inner.slots.len(),
                "Purged expired message cache entries"
            );
        }
        removed
    }

    /// Log cache statistics (for periodic monitoring)
    pub fn log_stats(&self) {
        let stats = self.stats();
        let lookups = stats.hits + stats.misses;
        let hit_rate = if lookups > 0 {
            (stats.hits as f32 / lookups as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            cached = self.len(),
            capacity = self.capacity,
            hit_rate = hit_rate,
            evictions = stats.evictions,
            expirations = stats.expirations,
            "Message cache statistics"
        );
    }
}
