//! duokv server binary
//!
//! Parses the command line, loads the shared secret, binds the listener and
//! hands everything to the library: the admission loop, the per-connection
//! workers and the SIGHUP statistics reporter.
//!
//! Usage:
//!     duokv-server authfile connections [portnum]
//!
//! The authfile's first line is the shared secret for the private
//! namespace. connections caps the number of simultaneous clients (0 = no
//! limit). portnum, if given, must be 0 or 1024-65535; absent or 0 means an
//! ephemeral port. The bound port is printed to stderr once listening. Any
//! additional arguments are silently ignored.

use duokv::config::ServerConfig;
use duokv::server::Server;
use duokv::stats::spawn_stats_reporter;
use duokv::DEFAULT_HOST;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/* Error messages */
const USAGE_ERROR_MSG: &str = "Usage: duokv-server authfile connections [portnum]";
const PORT_BIND_ERROR: &str = "duokv-server: unable to open socket for listening";
const AUTH_STRING_ERROR: &str = "duokv-server: unable to read authentication string";

/* Exit statuses */
const EXIT_USAGE: i32 = 1;
const EXIT_AUTH: i32 = 2;
const EXIT_LISTEN: i32 = 3;

/// Minimum and maximum explicitly requestable port numbers
const MIN_VALID_PORT: u32 = 1024;
const MAX_VALID_PORT: u32 = 65535;

/// Validated command-line arguments
struct ServerArgs {
    /// File whose first line is the shared secret
    authfile: String,
    /// Simultaneous connection ceiling, 0 for unlimited
    connections: usize,
    /// Port to listen on, 0 for an ephemeral port
    port: u16,
}

impl ServerArgs {
    /// Parses and validates the positional command-line arguments.
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        if args.len() < 3 {
            usage_error();
        }

        // connections must be a non-negative integer
        let connections = match args[2].parse::<usize>() {
            Ok(n) => n,
            Err(_) => usage_error(),
        };

        // port, when given, must be 0 or in the valid range
        let mut port: u16 = 0;
        if args.len() > 3 {
            match args[3].parse::<u32>() {
                Ok(p) if p == 0 || (MIN_VALID_PORT..=MAX_VALID_PORT).contains(&p) => {
                    port = p as u16;
                }
                _ => usage_error(),
            }
        }

        ServerArgs {
            authfile: args[1].clone(),
            connections,
            port,
        }
    }
}

fn usage_error() -> ! {
    eprintln!("{USAGE_ERROR_MSG}");
    std::process::exit(EXIT_USAGE);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Load the shared secret and connection limit
    let config = match ServerConfig::load(&args.authfile, args.connections) {
        Ok(config) => config,
        Err(_) => {
            eprintln!("{AUTH_STRING_ERROR}");
            std::process::exit(EXIT_AUTH);
        }
    };

    // Bind the listener and report the bound port on stderr (meaningful
    // when an ephemeral port was requested)
    let listener = match TcpListener::bind((DEFAULT_HOST, args.port)).await {
        Ok(listener) => listener,
        Err(_) => {
            eprintln!("{PORT_BIND_ERROR}");
            std::process::exit(EXIT_LISTEN);
        }
    };
    let port = listener.local_addr()?.port();
    eprintln!("{port}");
    info!("Listening on {}:{}", DEFAULT_HOST, port);

    let server = Server::new(config);

    // Start the SIGHUP statistics reporter
    let _reporter = spawn_stats_reporter(server.stats())?;
    info!("Statistics reporter started, dump with SIGHUP");

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = server.run(listener) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}
