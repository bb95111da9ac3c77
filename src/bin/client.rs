//! duokv client binary
//!
//! A one-shot client for the public namespace: with a key it issues a GET
//! and prints the value; with a key and a value it issues a PUT.
//!
//! Usage:
//!     duokv-client portnum key [value]
//!
//! Exit status: 0 on a 200 response, 1 on a usage error, 2 when the
//! connection fails, 3 on a non-200 GET, 4 on a non-200 PUT. Any additional
//! arguments are silently ignored.

use std::process;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/* Error messages */
const USAGE_ERROR_MSG: &str = "Usage: duokv-client portnum key [value]";
const KEY_ERROR: &str = "duokv-client: key must not contain spaces or newlines";

/* Exit statuses */
const EXIT_USAGE: i32 = 1;
const EXIT_CONNECTION: i32 = 2;
const EXIT_GET_FAILED: i32 = 3;
const EXIT_PUT_FAILED: i32 = 4;

/// Validated command-line arguments
struct ClientArgs {
    port: String,
    key: String,
    /// Present for a PUT, absent for a GET
    value: Option<String>,
}

impl ClientArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        if args.len() < 3 {
            eprintln!("{USAGE_ERROR_MSG}");
            process::exit(EXIT_USAGE);
        }

        // A key containing a space or newline cannot appear in a request
        // line
        let key = args[2].clone();
        if key.contains(' ') || key.contains('\n') {
            eprintln!("{KEY_ERROR}");
            process::exit(EXIT_USAGE);
        }

        ClientArgs {
            port: args[1].clone(),
            key,
            value: args.get(3).cloned(),
        }
    }
}

/// Builds the request bytes: a PUT with a Content-Length framed body when a
/// value was given, a bare GET otherwise.
fn build_request(key: &str, value: Option<&str>) -> Vec<u8> {
    match value {
        Some(value) => format!(
            "PUT /public/{key} HTTP/1.1\r\nContent-Length: {}\r\n\r\n{value}",
            value.len()
        )
        .into_bytes(),
        None => format!("GET /public/{key} HTTP/1.1\r\n\r\n").into_bytes(),
    }
}

/// Splits a raw response into its status code and body.
///
/// Returns `None` when the bytes do not look like a response at all.
fn parse_response(raw: &[u8]) -> Option<(u16, String)> {
    let text = String::from_utf8_lossy(raw);
    let (head, body) = text.split_once("\r\n\r\n")?;
    let status_line = head.lines().next()?;
    let status: u16 = status_line.split(' ').nth(1)?.parse().ok()?;
    Some((status, body.to_string()))
}

fn connection_error(port: &str) -> ! {
    eprintln!("duokv-client: unable to connect to port {port}");
    process::exit(EXIT_CONNECTION);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ClientArgs::from_args();
    let is_get = args.value.is_none();

    let port: u16 = match args.port.parse() {
        Ok(port) => port,
        Err(_) => connection_error(&args.port),
    };

    let mut stream = match TcpStream::connect(("127.0.0.1", port)).await {
        Ok(stream) => stream,
        Err(_) => connection_error(&args.port),
    };

    let request = build_request(&args.key, args.value.as_deref());
    stream.write_all(&request).await?;

    // Closing the write half tells the server this was the only request,
    // so it answers and then closes its end, ending our read
    stream.shutdown().await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    let status = match parse_response(&raw) {
        Some((200, body)) => {
            if is_get {
                println!("{body}");
            }
            0
        }
        _ if is_get => EXIT_GET_FAILED,
        _ => EXIT_PUT_FAILED,
    };
    process::exit(status);
}
