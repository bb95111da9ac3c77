//! Storage Module
//!
//! This module provides the in-memory associative store backing the two
//! namespaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Mutex<Namespaces>                │
//! │   (the single process-wide data lock)       │
//! │                                             │
//! │   ┌─────────────────┐ ┌─────────────────┐   │
//! │   │  StringStore    │ │  StringStore    │   │
//! │   │  (public)       │ │  (private)      │   │
//! │   └─────────────────┘ └─────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The stores themselves perform no locking; the router takes the shared
//! mutex once per request, dispatches against the namespace's store, and
//! releases it before any response byte is written.
//!
//! ## Example
//!
//! ```
//! use duokv::storage::StringStore;
//!
//! let mut store = StringStore::new();
//! store.put("color", "red").unwrap();
//! assert_eq!(store.get("color"), Some("red"));
//! assert!(store.delete("color"));
//! assert_eq!(store.get("color"), None);
//! ```

pub mod namespaces;
pub mod store;

// Re-export commonly used types
pub use namespaces::{Namespaces, SharedNamespaces};
pub use store::{StoreEntry, StoreError, StringStore};
