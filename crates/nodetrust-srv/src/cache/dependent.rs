//! Caches whose entries live and die with the trust cache.

use nodetrust_core::PeerId;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

/// Callback invoked with the key and value of every evicted entry.
pub type EvictionListener<V> = Box<dyn Fn(&PeerId, &V) + Send + Sync>;

/// A cache keyed by peer identity whose entries are dropped whenever the
/// trust cache evicts the same key.
///
/// Entries are kept in key order so the discovery sampler can treat the
/// key space as a stable, sliceable sequence. [`evict`](Self::evict) is
/// idempotent and only notifies listeners when an entry was actually
/// present, which is what keeps second-order effects (DNS cleanup) from
/// firing for peers that never held an entry here.
pub struct DependentCache<V> {
    name: &'static str,
    inner: Mutex<BTreeMap<PeerId, V>>,
    listeners: Mutex<Vec<EvictionListener<V>>>,
}

impl<V: Clone> DependentCache<V> {
    /// Create an empty cache. `name` labels log lines only.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(BTreeMap::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener for this cache's own eviction notifications.
    pub fn register_listener(&self, listener: EvictionListener<V>) {
        self.listeners
            .lock()
            .expect("dependent listener lock poisoned")
            .push(listener);
    }

    /// Insert or overwrite the entry for `id`. Overwriting does not
    /// count as an eviction.
    pub fn insert(&self, id: PeerId, value: V) {
        self.inner
            .lock()
            .expect("dependent cache lock poisoned")
            .insert(id, value);
    }

    /// Current value for `id`, if any.
    pub fn get(&self, id: &PeerId) -> Option<V> {
        self.inner
            .lock()
            .expect("dependent cache lock poisoned")
            .get(id)
            .cloned()
    }

    /// Whether an entry exists for `id`.
    pub fn contains(&self, id: &PeerId) -> bool {
        self.inner
            .lock()
            .expect("dependent cache lock poisoned")
            .contains_key(id)
    }

    /// Drop the entry for `id` and notify listeners if one was present.
    pub fn evict(&self, id: &PeerId) {
        let removed = self
            .inner
            .lock()
            .expect("dependent cache lock poisoned")
            .remove(id);
        if let Some(value) = removed {
            debug!(cache = self.name, peer = %id, "dependent entry evicted");
            let listeners = self
                .listeners
                .lock()
                .expect("dependent listener lock poisoned");
            for listener in listeners.iter() {
                listener(id, &value);
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("dependent cache lock poisoned")
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all keys in key order.
    pub fn keys(&self) -> Vec<PeerId> {
        self.inner
            .lock()
            .expect("dependent cache lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}
