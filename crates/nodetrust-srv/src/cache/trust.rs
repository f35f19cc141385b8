//! Time- and size-bounded registry of trusted peers.

use nodetrust_core::PeerId;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Callback invoked with the key of every evicted trust entry.
pub type TrustListener = Box<dyn Fn(&PeerId) + Send + Sync>;

struct TrustEntry {
    inserted: Instant,
    last_access: Instant,
}

struct Inner {
    entries: HashMap<PeerId, TrustEntry>,
    /// Insertion order, oldest at the front. Refreshing an entry moves
    /// it to the back.
    order: VecDeque<PeerId>,
}

/// Bounded, TTL-based registry mapping peer identity to a trust marker.
///
/// Presence is the only meaning of an entry. The cache is bounded by a
/// maximum entry count and a maximum age; when either bound is exceeded
/// the oldest-by-insertion entry is evicted. Every eviction (including
/// explicit removal) notifies the registered listeners synchronously,
/// before the mutating call returns. Removing an absent key is a no-op.
pub struct TrustCache {
    max_entries: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<TrustListener>>,
}

impl TrustCache {
    /// Create a cache bounded by `max_entries` and a per-entry `ttl`.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries,
            ttl,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register an eviction listener. Dependent caches register here at
    /// construction time, before the cache sees any traffic.
    pub fn register_listener(&self, listener: TrustListener) {
        self.listeners
            .lock()
            .expect("trust listener lock poisoned")
            .push(listener);
    }

    /// Whether `id` is currently trusted. Updates the entry's last-access
    /// time and expires overdue entries first.
    pub fn contains(&self, id: &PeerId) -> bool {
        let (present, evicted) = {
            let mut inner = self.inner.lock().expect("trust cache lock poisoned");
            let evicted = Self::purge_expired(&mut inner, self.ttl);
            let present = match inner.entries.get_mut(id) {
                Some(entry) => {
                    entry.last_access = Instant::now();
                    true
                }
                None => false,
            };
            (present, evicted)
        };
        self.notify(&evicted);
        present
    }

    /// Insert or refresh the trust entry for `id`.
    ///
    /// Refreshing resets the entry's age, so a re-announcing peer keeps
    /// its trust alive. May evict the oldest entry if the size bound is
    /// exceeded; the cascade completes before this call returns.
    pub fn set(&self, id: &PeerId) {
        let evicted = {
            let mut inner = self.inner.lock().expect("trust cache lock poisoned");
            let mut evicted = Self::purge_expired(&mut inner, self.ttl);

            let now = Instant::now();
            if inner.entries.contains_key(id) {
                inner.order.retain(|k| k != id);
            }
            inner.order.push_back(id.clone());
            inner.entries.insert(
                id.clone(),
                TrustEntry {
                    inserted: now,
                    last_access: now,
                },
            );

            while inner.entries.len() > self.max_entries {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.entries.remove(&oldest);
                    evicted.push(oldest);
                }
            }
            evicted
        };
        self.notify(&evicted);
    }

    /// Refresh the entry for `id` if present, returning whether it was.
    pub fn refresh(&self, id: &PeerId) -> bool {
        let (present, evicted) = {
            let mut inner = self.inner.lock().expect("trust cache lock poisoned");
            let evicted = Self::purge_expired(&mut inner, self.ttl);
            let present = if let Some(entry) = inner.entries.get_mut(id) {
                let now = Instant::now();
                entry.inserted = now;
                entry.last_access = now;
                inner.order.retain(|k| k != id);
                inner.order.push_back(id.clone());
                true
            } else {
                false
            };
            (present, evicted)
        };
        self.notify(&evicted);
        present
    }

    /// Remove the entry for `id`. Removal of a present entry cascades to
    /// listeners exactly like a bound-driven eviction; removing an
    /// absent key does nothing.
    pub fn remove(&self, id: &PeerId) {
        let evicted = {
            let mut inner = self.inner.lock().expect("trust cache lock poisoned");
            let mut evicted = Self::purge_expired(&mut inner, self.ttl);
            if inner.entries.remove(id).is_some() {
                inner.order.retain(|k| k != id);
                evicted.push(id.clone());
            }
            evicted
        };
        self.notify(&evicted);
    }

    /// Number of live entries (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("trust cache lock poisoned")
            .entries
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time since the entry for `id` was last read or written.
    pub fn idle_time(&self, id: &PeerId) -> Option<Duration> {
        self.inner
            .lock()
            .expect("trust cache lock poisoned")
            .entries
            .get(id)
            .map(|entry| entry.last_access.elapsed())
    }

    fn purge_expired(inner: &mut Inner, ttl: Duration) -> Vec<PeerId> {
        let mut evicted = Vec::new();
        while let Some(front) = inner.order.front() {
            let expired = inner
                .entries
                .get(front)
                .is_some_and(|entry| entry.inserted.elapsed() >= ttl);
            if !expired {
                break;
            }
            let id = inner.order.pop_front().expect("front checked above");
            inner.entries.remove(&id);
            evicted.push(id);
        }
        evicted
    }

    fn notify(&self, evicted: &[PeerId]) {
        if evicted.is_empty() {
            return;
        }
        let listeners = self.listeners.lock().expect("trust listener lock poisoned");
        for id in evicted {
            debug!(peer = %id, "trust entry evicted");
            for listener in listeners.iter() {
                listener(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const FOREVER: Duration = Duration::from_secs(86_400);

    #[test]
    fn test_set_then_contains() {
        let cache = TrustCache::new(10, FOREVER);
        let peer = PeerId::new("QmA");
        assert!(!cache.contains(&peer));
        cache.set(&peer);
        assert!(cache.contains(&peer));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_size_bound_evicts_oldest_by_insertion() {
        let cache = TrustCache::new(2, FOREVER);
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        cache.register_listener(Box::new(move |id| {
            sink.lock().unwrap().push(id.clone());
        }));

        let (a, b, c) = (PeerId::new("QmA"), PeerId::new("QmB"), PeerId::new("QmC"));
        cache.set(&a);
        cache.set(&b);
        cache.set(&c);

        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(*evicted.lock().unwrap(), vec![a]);
    }

    #[test]
    fn test_refresh_protects_from_size_eviction() {
        let cache = TrustCache::new(2, FOREVER);
        let (a, b, c) = (PeerId::new("QmA"), PeerId::new("QmB"), PeerId::new("QmC"));
        cache.set(&a);
        cache.set(&b);
        // A becomes the most recently inserted, so B is now oldest.
        assert!(cache.refresh(&a));
        cache.set(&c);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
    }

    #[test]
    fn test_refresh_absent_returns_false() {
        let cache = TrustCache::new(2, FOREVER);
        assert!(!cache.refresh(&PeerId::new("QmGhost")));
    }

    #[test]
    fn test_ttl_expiry_notifies_listeners() {
        let cache = TrustCache::new(10, Duration::ZERO);
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        cache.register_listener(Box::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));

        let peer = PeerId::new("QmA");
        cache.set(&peer);
        // Zero TTL: the entry is already overdue on the next operation.
        assert!(!cache.contains(&peer));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let cache = TrustCache::new(10, FOREVER);
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        cache.register_listener(Box::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));

        let peer = PeerId::new("QmA");
        cache.remove(&peer);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        cache.set(&peer);
        cache.remove(&peer);
        cache.remove(&peer);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_idle_time_tracks_access() {
        let cache = TrustCache::new(10, FOREVER);
        let peer = PeerId::new("QmA");
        assert!(cache.idle_time(&peer).is_none());
        cache.set(&peer);
        assert!(cache.idle_time(&peer).is_some());
        assert!(cache.contains(&peer));
        // Access just happened, so idle time is near zero.
        assert!(cache.idle_time(&peer).unwrap() < Duration::from_secs(1));
    }
}
