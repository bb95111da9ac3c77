//! Tombstone-Reusing String Store
//!
//! This module implements the associative store backing one namespace.
//! It maps string keys to string values in a flat slot vector.
//!
//! ## Design Decisions
//!
//! 1. **Tombstone reuse**: deleting an entry clears its slot (`None`)
//!    instead of compacting the vector; the next insert of a new key fills
//!    the first cleared slot it finds.
//! 2. **Fixed-chunk growth**: when every slot is occupied, capacity grows
//!    by a fixed chunk via `try_reserve`, so an allocation failure surfaces
//!    as a `StoreError` (the router's 500) rather than aborting the process.
//! 3. **No internal locking**: the store is owned by [`Namespaces`] behind
//!    the single shared data mutex; callers hold that lock around every
//!    operation. See [`crate::storage`].
//! 4. **Forward scan**: lookup is O(n) over the slots. The store holds an
//!    interactive client workload's worth of keys, not an index's.
//!
//! [`Namespaces`]: crate::storage::Namespaces

use thiserror::Error;

/// Capacity added each time the slot vector fills up.
const GROWTH_CHUNK: usize = 100;

/// A live key/value pair occupying one store slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub key: String,
    pub value: String,
}

/// Errors a store mutation can produce.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The slot vector could not grow to hold another entry.
    #[error("unable to grow store: {0}")]
    Alloc(#[from] std::collections::TryReserveError),
}

/// An in-memory associative store with tombstone-reusing slots.
///
/// At most one live entry exists per distinct key. A deleted entry leaves a
/// tombstone (`None` slot) that a later insert of any key may reuse, so
/// deletion never moves surviving entries.
///
/// # Example
///
/// ```
/// use duokv::storage::StringStore;
///
/// let mut store = StringStore::new();
/// store.put("color", "red").unwrap();
/// store.put("color", "blue").unwrap();
/// assert_eq!(store.get("color"), Some("blue"));
///
/// assert!(store.delete("color"));
/// assert_eq!(store.get("color"), None);
/// ```
#[derive(Debug)]
pub struct StringStore {
    /// Entry slots; `None` marks a tombstone left by a delete.
    slots: Vec<Option<StoreEntry>>,
    /// Count of live (non-tombstone) entries.
    live: usize,
}

impl Default for StringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StringStore {
    /// Creates an empty store with one growth chunk of capacity.
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(GROWTH_CHUNK),
            live: 0,
        }
    }

    /// Inserts or replaces the value for `key`.
    ///
    /// An existing live entry is replaced in place. Otherwise the first
    /// tombstone slot is reused, and only when none exists is a new slot
    /// appended (growing capacity by a fixed chunk when exhausted).
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // Replace in place when the key already has a live slot
        for entry in self.slots.iter_mut().flatten() {
            if entry.key == key {
                entry.value = value.to_string();
                return Ok(());
            }
        }

        let entry = StoreEntry {
            key: key.to_string(),
            value: value.to_string(),
        };

        // Reuse the first tombstone left behind by a delete
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(entry);
            self.live += 1;
            return Ok(());
        }

        if self.slots.len() == self.slots.capacity() {
            self.slots.try_reserve(GROWTH_CHUNK)?;
        }
        self.slots.push(Some(entry));
        self.live += 1;
        Ok(())
    }

    /// Returns the value stored for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots
            .iter()
            .flatten()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Deletes the entry for `key`, leaving a reusable tombstone.
    ///
    /// Returns `true` if an entry was deleted, `false` if the key was
    /// absent.
    pub fn delete(&mut self, key: &str) -> bool {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(entry) if entry.key == key) {
                *slot = None;
                self.live -= 1;
                return true;
            }
        }
        false
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no live entries exist.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots in use, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut store = StringStore::new();
        store.put("color", "red").unwrap();
        assert_eq!(store.get("color"), Some("red"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let store = StringStore::new();
        assert_eq!(store.get("nothing"), None);
    }

    #[test]
    fn test_put_replaces_in_place() {
        let mut store = StringStore::new();
        store.put("color", "red").unwrap();
        store.put("color", "blue").unwrap();
        assert_eq!(store.get("color"), Some("blue"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.slot_count(), 1);
    }

    #[test]
    fn test_delete() {
        let mut store = StringStore::new();
        store.put("color", "red").unwrap();
        assert!(store.delete("color"));
        assert_eq!(store.get("color"), None);
        assert_eq!(store.len(), 0);
        assert!(!store.delete("color"));
    }

    #[test]
    fn test_delete_missing() {
        let mut store = StringStore::new();
        assert!(!store.delete("nothing"));
    }

    #[test]
    fn test_tombstone_slot_is_reused() {
        let mut store = StringStore::new();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        assert_eq!(store.slot_count(), 2);

        assert!(store.delete("a"));
        store.put("c", "3").unwrap();

        // "c" filled the tombstone "a" left; no new slot appended
        assert_eq!(store.slot_count(), 2);
        assert_eq!(store.get("b"), Some("2"));
        assert_eq!(store.get("c"), Some("3"));
    }

    #[test]
    fn test_delete_then_put_same_key() {
        let mut store = StringStore::new();
        store.put("color", "red").unwrap();
        assert!(store.delete("color"));
        store.put("color", "green").unwrap();
        assert_eq!(store.get("color"), Some("green"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_growth_past_initial_chunk() {
        let mut store = StringStore::new();
        for i in 0..250 {
            store.put(&format!("key-{i}"), &format!("value-{i}")).unwrap();
        }
        assert_eq!(store.len(), 250);
        for i in 0..250 {
            assert_eq!(
                store.get(&format!("key-{i}")),
                Some(format!("value-{i}").as_str())
            );
        }
    }

    #[test]
    fn test_empty_key_and_value() {
        let mut store = StringStore::new();
        store.put("", "").unwrap();
        assert_eq!(store.get(""), Some(""));
        assert!(store.delete(""));
        assert_eq!(store.get(""), None);
    }
}
