//! Connection Handling Module
//!
//! This module manages individual client connections. Each admitted
//! connection is handled by its own async task running a request/response
//! loop until the client disconnects or sends something unparsable.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Accept / Admission                      │
//! │                       (server.rs)                           │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ spawn task per admitted connection
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌───────────┐   ┌──────────┐   ┌───────┐   ┌───────────┐  │
//! │  │ Read data │──>│  Decode  │──>│ Route │──>│ Send resp │  │
//! │  └───────────┘   └──────────┘   └───────┘   └───────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: Tokio non-blocking reads and writes
//! - **Buffer Management**: BytesMut accumulation with incremental decoding
//! - **Pipelining**: multiple requests in a single TCP packet are served in
//!   order
//! - **Statistics**: lifecycle and per-operation counters

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler};
