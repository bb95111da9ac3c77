//! Statistics & Signal Reporter
//!
//! Process-wide counters for connections and operations, all guarded by a
//! single mutex — the statistics lock. The lock is held only for a counter
//! read-modify-write or the report dump, never across I/O with a client.
//!
//! Two counter updates are deliberately compound, each under one lock
//! acquisition:
//! - [`Statistics::try_admit`]: the connection-limit check and the
//!   `connected` increment, so the limit can never be over-admitted by a
//!   racing accept.
//! - [`Statistics::connection_closed`]: the `connected` decrement and the
//!   `completed` increment on worker exit.
//!
//! The reporter is a background task that waits for SIGHUP and dumps the
//! six counters to stderr in a fixed order, for the life of the process.
//! It never mutates the counters.

use crate::protocol::Method;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::debug;

/// A copy of all six counters taken under the statistics lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Clients currently connected (admitted, worker not yet exited)
    pub connected: u64,
    /// Clients whose connection has completed
    pub completed: u64,
    /// Private-namespace requests that failed authentication
    pub auth_failures: u64,
    /// GET requests answered 200
    pub get_ops: u64,
    /// PUT requests answered 200
    pub put_ops: u64,
    /// DELETE requests answered 200
    pub delete_ops: u64,
}

/// The process-wide statistics block.
#[derive(Debug, Default)]
pub struct Statistics {
    counters: Mutex<StatsSnapshot>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admission check: admits the connection and counts it as connected,
    /// or refuses it, in one atomic section. A `limit` of 0 is unlimited.
    pub fn try_admit(&self, limit: usize) -> bool {
        let mut counters = self.counters.lock().unwrap();
        if limit != 0 && counters.connected >= limit as u64 {
            return false;
        }
        counters.connected += 1;
        true
    }

    /// Worker exit: the connected/completed pair moves together under one
    /// lock acquisition.
    pub fn connection_closed(&self) {
        let mut counters = self.counters.lock().unwrap();
        counters.connected -= 1;
        counters.completed += 1;
    }

    /// Counts one failed private-namespace authentication.
    pub fn auth_failure(&self) {
        self.counters.lock().unwrap().auth_failures += 1;
    }

    /// Counts a request that was answered 200, by method. Callers must not
    /// record non-200 outcomes.
    pub fn record_success(&self, method: Method) {
        let mut counters = self.counters.lock().unwrap();
        match method {
            Method::Get => counters.get_ops += 1,
            Method::Put => counters.put_ops += 1,
            Method::Delete => counters.delete_ops += 1,
        }
    }

    /// A consistent copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        *self.counters.lock().unwrap()
    }

    /// Writes the six counters to `out` in the fixed report order, holding
    /// the statistics lock for the duration of the dump.
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let counters = self.counters.lock().unwrap();
        writeln!(out, "Connected clients:{}", counters.connected)?;
        writeln!(out, "Completed clients:{}", counters.completed)?;
        writeln!(out, "Auth failures:{}", counters.auth_failures)?;
        writeln!(out, "GET operations:{}", counters.get_ops)?;
        writeln!(out, "PUT operations:{}", counters.put_ops)?;
        writeln!(out, "DELETE operations:{}", counters.delete_ops)?;
        out.flush()
    }
}

/// Spawns the background task that dumps the statistics to stderr each
/// time the process receives SIGHUP.
///
/// The listener is registered before the task starts so a registration
/// failure surfaces at startup rather than inside the task. The task runs
/// for the life of the process.
pub fn spawn_stats_reporter(stats: Arc<Statistics>) -> io::Result<JoinHandle<()>> {
    let mut hangup = signal(SignalKind::hangup())?;
    let handle = tokio::spawn(async move {
        loop {
            if hangup.recv().await.is_none() {
                debug!("signal stream closed, stats reporter exiting");
                return;
            }
            if let Err(e) = stats.report(&mut io::stderr()) {
                debug!(error = %e, "failed to write statistics report");
            }
        }
    });
    Ok(handle)
}
