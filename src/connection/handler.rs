//! Connection Handler Module
//!
//! This module handles one client connection to duokv. Each client gets its
//! own worker task that runs a request/response loop: read bytes, decode a
//! request, authorize it if it targets the private namespace, route it
//! against the stores, count it, and write the response back.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Connection admitted (connected counter already incremented)
//!        │
//!        ▼
//! 2. Worker task spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  read bytes ─> decode        │
//!    │       │            │         │
//!    │       │            ▼         │
//!    │       │       authenticate   │
//!    │       │            │         │
//!    │       │            ▼         │
//!    │       │          route       │
//!    │       │            │         │
//!    │       │            ▼         │
//!    │       └──── send response    │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects or sends something unparsable
//!        │
//!        ▼
//! 5. connected-- / completed++ under one lock acquisition
//! ```
//!
//! End-of-stream and malformed input are handled identically: the worker
//! closes the connection without sending anything. Every other outcome is a
//! well-formed response.
//!
//! ## Buffer Management
//!
//! We use a BytesMut buffer to accumulate incoming data. TCP is a stream
//! protocol - a read may deliver a partial request, or several pipelined
//! requests at once.

use crate::auth;
use crate::config::ServerConfig;
use crate::protocol::{Namespace, ParseError, Request, RequestParser, Status};
use crate::router::Router;
use crate::stats::Statistics;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum size for the read buffer (64 KB)
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Handles a single client connection.
///
/// This struct manages the read buffer, decoding, routing, statistics and
/// response sending for one connected client.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Routes requests against the shared stores
    router: Router,

    /// Request decoder
    parser: RequestParser,

    /// Immutable server configuration (shared secret)
    config: Arc<ServerConfig>,

    /// Process-wide statistics (shared)
    stats: Arc<Statistics>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// The connection must already have been admitted: the `connected`
    /// counter is incremented by admission, and this handler performs the
    /// matching decrement (paired with the `completed` increment) when it
    /// finishes.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        router: Router,
        config: Arc<ServerConfig>,
        stats: Arc<Statistics>,
    ) -> Self {
        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            router,
            parser: RequestParser::new(),
            config,
            stats,
        }
    }

    /// Runs the request/response loop to completion.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::Malformed(parse_err) => {
                    debug!(client = %self.addr, error = %parse_err,
                        "Closing connection on malformed request")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-decode-route-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Drain every complete request already buffered
            while let Some(request) = self.try_parse_request()? {
                self.handle_request(request).await?;
            }

            // Need more data - read from the socket
            self.read_more_data().await?;
        }
    }

    /// Authorizes, routes and answers one decoded request.
    async fn handle_request(&mut self, mut request: Request) -> Result<(), ConnectionError> {
        // The gate is only consulted for the private namespace; a failure
        // is counted exactly once and the request carries the verdict to
        // the router.
        if request.namespace == Some(Namespace::Private)
            && !auth::authenticate(&request, &self.config)
        {
            self.stats.auth_failure();
            request.authenticated = false;
        }

        let response = self.router.route(&request);

        // Operation counters move only for 200 outcomes
        if response.status == Status::Ok {
            if let Some(method) = request.method {
                self.stats.record_success(method);
            }
        }

        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        trace!(
            client = %self.addr,
            status = response.status.code(),
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }

    /// Attempts to decode a request from the buffer.
    fn try_parse_request(&mut self) -> Result<Option<Request>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.parser.parse(&self.buffer) {
            Ok(Some((request, consumed))) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    consumed = consumed,
                    remaining = self.buffer.len(),
                    "Decoded request"
                );
                Ok(Some(request))
            }
            Ok(None) => {
                // Incomplete data - need to read more
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete request, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                // Malformed input closes the connection without a response
                warn!(client = %self.addr, error = %e, "Malformed request");
                Err(ConnectionError::Malformed(e))
            }
        }
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            warn!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            // Connection closed by client
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial request in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }
}

/// Errors that can occur while handling a connection. None of them produce
/// a response; they all end with the connection closed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The client sent bytes that cannot be a valid request
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),

    /// Client disconnected normally
    #[error("client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial request)
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("buffer size limit exceeded")]
    BufferFull,
}

/// Handles a client connection to completion.
///
/// This is a convenience function that creates a ConnectionHandler and runs
/// it, swallowing the routine endings (disconnect, reset) and logging the
/// rest at debug.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    router: Router,
    config: Arc<ServerConfig>,
    stats: Arc<Statistics>,
) {
    let handler = ConnectionHandler::new(stream, addr, router, config, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Namespaces;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn create_test_server(secret: &str) -> (SocketAddr, Arc<Statistics>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = Arc::new(ServerConfig::new(secret, 0));
        let stats = Arc::new(Statistics::new());
        let router = Router::new(Namespaces::new_shared());

        let stats_clone = Arc::clone(&stats);
        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let stats = Arc::clone(&stats_clone);
                assert!(stats.try_admit(0));
                tokio::spawn(handle_connection(
                    stream,
                    client_addr,
                    router.clone(),
                    Arc::clone(&config),
                    stats,
                ));
            }
        });

        (addr, stats)
    }

    async fn expect_response(client: &mut TcpStream, expected: &[u8]) {
        let mut buf = vec![0u8; expected.len()];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, expected);
    }

    #[tokio::test]
    async fn test_put_get_delete_round_trip() {
        let (addr, _) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(b"PUT /public/color HTTP/1.1\r\nContent-Length: 3\r\n\r\nred")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\n\r\n").await;

        client
            .write_all(b"GET /public/color HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(
            &mut client,
            b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nred",
        )
        .await;

        client
            .write_all(b"DELETE /public/color HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\n\r\n").await;

        client
            .write_all(b"GET /public/color HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;
    }

    #[tokio::test]
    async fn test_private_namespace_authentication() {
        let (addr, stats) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(b"GET /private/x HTTP/1.1\r\nAuthorization: wrong\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 401 Unauthorized\r\n\r\n").await;

        client
            .write_all(b"GET /private/x HTTP/1.1\r\nAuthorization: s3cr3t\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;

        // One failure counted, the authorized attempt not counted
        assert_eq!(stats.snapshot().auth_failures, 1);
    }

    #[tokio::test]
    async fn test_missing_authorization_header_is_unauthorized() {
        let (addr, stats) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(b"GET /private/x HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 401 Unauthorized\r\n\r\n").await;
        assert_eq!(stats.snapshot().auth_failures, 1);
    }

    #[tokio::test]
    async fn test_private_round_trip_with_credential() {
        let (addr, _) = create_test_server("hunter2").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(
                b"PUT /private/k HTTP/1.1\r\nAuthorization: hunter2\r\nContent-Length: 5\r\n\r\nvalue",
            )
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\n\r\n").await;

        client
            .write_all(b"GET /private/k HTTP/1.1\r\nAuthorization: hunter2\r\n\r\n")
            .await
            .unwrap();
        expect_response(
            &mut client,
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nvalue",
        )
        .await;

        // The same key is absent from the public namespace
        client
            .write_all(b"GET /public/k HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;
    }

    #[tokio::test]
    async fn test_unrecognized_method_gets_400_and_loop_continues() {
        let (addr, _) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(b"POST /public/x HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 400 Bad Request\r\n\r\n").await;

        // The connection survives a 400; the next request is served
        client
            .write_all(b"GET /public/x HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;
    }

    #[tokio::test]
    async fn test_malformed_request_closes_without_response() {
        let (addr, _) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        client
            .write_all(b"GET /public/too/many HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        // Silent close: the next read sees EOF with no bytes
        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_counters_move_only_on_200() {
        let (addr, stats) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        // 404 GET: not counted
        client
            .write_all(b"GET /public/ghost HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;
        assert_eq!(stats.snapshot().get_ops, 0);

        // 200 PUT then 200 GET: both counted
        client
            .write_all(b"PUT /public/k HTTP/1.1\r\nContent-Length: 1\r\n\r\nv")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\n\r\n").await;
        client
            .write_all(b"GET /public/k HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nv")
            .await;

        // 404 DELETE: not counted
        client
            .write_all(b"DELETE /public/ghost HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get_ops, 1);
        assert_eq!(snapshot.put_ops, 1);
        assert_eq!(snapshot.delete_ops, 0);
    }

    #[tokio::test]
    async fn test_pipelined_requests() {
        let (addr, _) = create_test_server("s3cr3t").await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        // Two requests in one write
        client
            .write_all(
                b"PUT /public/a HTTP/1.1\r\nContent-Length: 1\r\n\r\n1GET /public/a HTTP/1.1\r\n\r\n",
            )
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\n\r\n").await;
        expect_response(&mut client, b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n1")
            .await;
    }

    #[tokio::test]
    async fn test_connection_lifecycle_counters() {
        let (addr, stats) = create_test_server("s3cr3t").await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /public/x HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        expect_response(&mut client, b"HTTP/1.1 404 Not Found\r\n\r\n").await;

        assert_eq!(stats.snapshot().connected, 1);
        assert_eq!(stats.snapshot().completed, 0);

        drop(client);
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.snapshot().connected, 0);
        assert_eq!(stats.snapshot().completed, 1);
    }
}
