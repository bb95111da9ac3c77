//! Namespace Pair Behind the Data Lock
//!
//! The server keeps two independent store instances, one per namespace.
//! Both live inside a single [`Namespaces`] value guarded by one mutex —
//! the process-wide data lock. A request's entire store access happens
//! inside one acquisition of that lock, and the lock is never held across
//! network I/O.

use crate::protocol::Namespace;
use crate::storage::store::StringStore;
use std::sync::{Arc, Mutex};

/// The public and private store instances, created once at startup and
/// living for the rest of the process.
#[derive(Debug, Default)]
pub struct Namespaces {
    public: StringStore,
    private: StringStore,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the namespace pair already wrapped in the shared data lock.
    pub fn new_shared() -> SharedNamespaces {
        Arc::new(Mutex::new(Self::new()))
    }

    /// The store backing the given namespace.
    pub fn store(&self, namespace: Namespace) -> &StringStore {
        match namespace {
            Namespace::Public => &self.public,
            Namespace::Private => &self.private,
        }
    }

    /// Mutable access to the store backing the given namespace.
    pub fn store_mut(&mut self, namespace: Namespace) -> &mut StringStore {
        match namespace {
            Namespace::Public => &mut self.public,
            Namespace::Private => &mut self.private,
        }
    }
}

/// The single process-wide data lock over both namespace stores.
pub type SharedNamespaces = Arc<Mutex<Namespaces>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_independent() {
        let mut namespaces = Namespaces::new();
        namespaces
            .store_mut(Namespace::Public)
            .put("color", "red")
            .unwrap();

        assert_eq!(namespaces.store(Namespace::Public).get("color"), Some("red"));
        assert_eq!(namespaces.store(Namespace::Private).get("color"), None);

        namespaces
            .store_mut(Namespace::Private)
            .put("color", "black")
            .unwrap();
        assert_eq!(namespaces.store(Namespace::Public).get("color"), Some("red"));
        assert_eq!(
            namespaces.store(Namespace::Private).get("color"),
            Some("black")
        );
    }
}
