use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// A memoizing factory for objects derived from indexed content.
///
/// Each key gets its own slot. The first caller for a key runs the loader while holding
/// that slot, so a concurrent caller for the same key waits and then receives the same
/// `Arc`. Callers for other keys are not blocked. A loader that fails stores nothing: the
/// slot is dropped again unless another caller is already waiting on it, and the next call
/// for that key tries again.
pub struct DerivedCache<K, V> {
    slots: DashMap<K, Slot<V>>,
    loads: AtomicUsize,
    populated: AtomicUsize,
}

impl<K, V> DerivedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            loads: AtomicUsize::new(0),
            populated: AtomicUsize::new(0),
        }
    }

    /// Returns the cached value for `key`, building it with `load` on the first request.
    pub fn get_or_load<E, F>(&self, key: &K, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = self.slot(key);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = value.as_ref() {
            return Ok(Arc::clone(value));
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let loaded = match load() {
            Ok(loaded) => Arc::new(loaded),
            Err(e) => {
                drop(value);
                drop(slot);
                self.discard_empty_slot(key);
                return Err(e);
            }
        };
        *value = Some(Arc::clone(&loaded));
        self.populated.fetch_add(1, Ordering::Relaxed);

        Ok(loaded)
    }

    /// Returns the value for `key` if it has already been built. Never runs a loader.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.slots.get(key).map(|slot| Arc::clone(&slot))?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        value.clone()
    }

    /// Number of keys with a built value
    pub fn len(&self) -> usize {
        self.populated.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a loader has been run, failed runs included
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn slot(&self, key: &K) -> Slot<V> {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(&slot);
        }

        // the shard guard is released at the end of this statement, before the slot is locked
        Arc::clone(&self.slots.entry(key.clone()).or_default())
    }

    /// Removes the slot for `key` if it holds no value and no other caller has a handle to it.
    /// The shard lock is held while checking, so no caller can pick the slot up meanwhile.
    fn discard_empty_slot(&self, key: &K) {
        self.slots.remove_if(key, |_, slot| {
            if Arc::strong_count(slot) > 1 {
                return false;
            }
            let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
            value.is_none()
        });
    }
}

impl<K, V> Default for DerivedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for DerivedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedCache")
            .field("populated", &self.populated.load(Ordering::Relaxed))
            .field("loads", &self.loads.load(Ordering::Relaxed))
            .finish()
    }
}
