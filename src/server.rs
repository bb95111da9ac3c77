//! Connection Admission
//!
//! The accept loop and the connection limit. Every accepted connection goes
//! through [`Statistics::try_admit`], which checks the configured limit and
//! increments the `connected` counter in one atomic section - so the limit
//! can never be over-admitted however many accepts race. Refused
//! connections get a single bare `503 Service Unavailable` (nothing is read
//! from them) and are closed without a worker; admitted ones get their own
//! detached worker task.
//!
//! The 503 is written on its own task, after the statistics lock is
//! released - a slow refused client never blocks admission and no lock is
//! held across I/O.

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::protocol::Response;
use crate::router::Router;
use crate::stats::Statistics;
use crate::storage::Namespaces;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// The duokv server: shared configuration, stores and statistics, plus the
/// accept loop that feeds workers.
pub struct Server {
    config: Arc<ServerConfig>,
    router: Router,
    stats: Arc<Statistics>,
}

impl Server {
    /// Creates a server with fresh (empty) stores and zeroed statistics.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            router: Router::new(Namespaces::new_shared()),
            stats: Arc::new(Statistics::new()),
        }
    }

    /// The process-wide statistics block, for the signal reporter and for
    /// tests.
    pub fn stats(&self) -> Arc<Statistics> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections forever, admitting or refusing each one.
    ///
    /// Accept errors are logged and the loop continues; nothing short of
    /// process shutdown stops it.
    pub async fn run(self, listener: TcpListener) {
        info!(limit = self.config.connection_limit, "Accepting connections");
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Admits the connection into a worker task, or refuses it with a 503.
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        if !self.stats.try_admit(self.config.connection_limit) {
            debug!(client = %addr, "Connection limit reached, refusing");
            tokio::spawn(refuse(stream, addr));
            return;
        }

        tokio::spawn(handle_connection(
            stream,
            addr,
            self.router.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.stats),
        ));
    }
}

/// Sends the bare 503 refusal and closes the stream. Nothing is read from
/// the client first, and no worker is ever started for it.
async fn refuse(mut stream: TcpStream, addr: SocketAddr) {
    let bytes = Response::service_unavailable().serialize();
    if let Err(e) = stream.write_all(&bytes).await {
        debug!(client = %addr, error = %e, "Failed to send 503");
        return;
    }
    let _ = stream.shutdown().await;
}
