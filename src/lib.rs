//! # duokv - A Small Networked Key-Value Store
//!
//! duokv is an in-memory key-value server speaking a minimal HTTP-shaped
//! protocol. Clients issue repeated GET/PUT/DELETE requests against one of
//! two independent namespaces: `public`, open to anyone, and `private`,
//! which requires a shared-secret credential in the `Authorization` header.
//!
//! ## Features
//!
//! - **Two namespaces**: independent public and private stores behind one
//!   data lock
//! - **Bounded admission**: a configurable ceiling on simultaneous clients,
//!   excess connections refused with `503` before any request is read
//! - **Async I/O**: built on Tokio, one detached task per connection
//! - **Live statistics**: six process-wide counters dumped to stderr on
//!   SIGHUP
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                              duokv                                │
//! │                                                                   │
//! │  ┌────────────┐    ┌────────────┐    ┌──────────┐    ┌─────────┐  │
//! │  │  Admission │───>│ Connection │───>│   Auth   │───>│ Router  │  │
//! │  │ (503 gate) │    │   Worker   │    │   Gate   │    │         │  │
//! │  └──────┬─────┘    └─────┬──────┘    └──────────┘    └────┬────┘  │
//! │         │                │                                │       │
//! │         │                ▼                                ▼       │
//! │         │         ┌────────────┐              ┌─────────────────┐ │
//! │         │         │  Request   │              │ Mutex<Namespaces>│ │
//! │         │         │  Parser    │              │ ┌──────┐┌──────┐ │ │
//! │         │         └────────────┘              │ │public││priv. │ │ │
//! │         │                                     │ └──────┘└──────┘ │ │
//! │         │                                     └─────────────────┘ │
//! │         ▼                                                         │
//! │  ┌─────────────────┐         ┌──────────────────────────────────┐ │
//! │  │ Mutex<Counters> │<────────│   SIGHUP Reporter (Tokio task)   │ │
//! │  └─────────────────┘         └──────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use duokv::config::ServerConfig;
//! use duokv::server::Server;
//! use duokv::stats::spawn_stats_reporter;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::load("authfile", 10).unwrap();
//!     let server = Server::new(config);
//!
//!     let _reporter = spawn_stats_reporter(server.stats()).unwrap();
//!
//!     let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
//!     server.run(listener).await;
//! }
//! ```
//!
//! ## Protocol
//!
//! ```text
//! PUT /public/color HTTP/1.1\r\nContent-Length: 3\r\n\r\nred
//!   -> HTTP/1.1 200 OK\r\n\r\n
//! GET /public/color HTTP/1.1\r\n\r\n
//!   -> HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nred
//! DELETE /public/color HTTP/1.1\r\n\r\n
//!   -> HTTP/1.1 200 OK\r\n\r\n
//! GET /private/color HTTP/1.1\r\nAuthorization: <secret>\r\n\r\n
//!   -> HTTP/1.1 404 Not Found\r\n\r\n
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: request decoding and response serialization
//! - [`storage`]: the tombstone-reusing string stores, one per namespace
//! - [`auth`]: the shared-secret gate for the private namespace
//! - [`router`]: request dispatch against the stores under the data lock
//! - [`connection`]: per-client request/response loop
//! - [`server`]: accept loop and connection admission
//! - [`stats`]: process-wide counters and the SIGHUP reporter
//! - [`config`]: shared secret and connection limit, loaded at startup
//!
//! ## Concurrency Model
//!
//! Two independent mutexes guard all shared state: the data lock over both
//! namespace stores, and the statistics lock over the six counters. Each is
//! held only for the store dispatch or counter update it protects - never
//! across network I/O - and a code path that needs both takes and releases
//! the data lock before touching the statistics lock, so no ordering cycle
//! exists. Workers are detached tasks; the admission check-and-increment is
//! atomic under the statistics lock, which is what makes the connection
//! limit exact under concurrent accepts.

pub mod auth;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod router;
pub mod server;
pub mod stats;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ServerConfig};
pub use connection::{handle_connection, ConnectionError, ConnectionHandler};
pub use protocol::{
    parse_request, Method, Namespace, ParseError, Request, RequestParser, Response, Status,
};
pub use router::Router;
pub use server::Server;
pub use stats::{spawn_stats_reporter, Statistics, StatsSnapshot};
pub use storage::{Namespaces, SharedNamespaces, StringStore};

/// The host the server binds to (the server is localhost-only)
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of duokv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
