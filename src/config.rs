//! Server Configuration
//!
//! The two startup inputs the workers share: the shared secret guarding the
//! private namespace, and the connection limit. Both are loaded once before
//! the listener starts and are immutable afterwards, so workers read them
//! through a plain `Arc` with no locking.

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors loading the server configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The auth file could not be read
    #[error("unable to read authentication file: {0}")]
    Io(#[from] io::Error),

    /// The auth file's first line is empty
    #[error("authentication file has an empty first line")]
    EmptySecret,
}

/// Immutable server configuration shared by every worker.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The credential every private-namespace request must present in its
    /// `Authorization` header, byte for byte.
    pub shared_secret: String,

    /// Maximum simultaneously connected clients; 0 means unlimited.
    pub connection_limit: usize,
}

impl ServerConfig {
    /// Builds a configuration directly from its parts.
    pub fn new(shared_secret: impl Into<String>, connection_limit: usize) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            connection_limit,
        }
    }

    /// Loads the shared secret from the first line of `authfile`.
    ///
    /// The line is taken without its trailing newline and must be
    /// non-empty; an unreadable file or an empty first line is a startup
    /// failure.
    pub fn load(
        authfile: impl AsRef<Path>,
        connection_limit: usize,
    ) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(authfile)?;
        let secret = contents.lines().next().unwrap_or("");
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self::new(secret, connection_limit))
    }
}
