//! Wire Protocol Implementation
//!
//! This module implements the HTTP-shaped protocol duokv speaks: three
//! methods (GET, PUT, DELETE) against a two-segment path
//! `/<namespace>/<key>`, with `Content-Length`-framed bodies.
//!
//! ## Modules
//!
//! - `types`: request/response structures and the method, namespace and
//!   status enums, plus response serialization
//! - `parser`: incremental decoder for incoming request bytes
//!
//! ## Example
//!
//! ```
//! use duokv::protocol::{parse_request, Response};
//!
//! // Parsing incoming data
//! let data = b"GET /public/color HTTP/1.1\r\n\r\n";
//! let (request, consumed) = parse_request(data).unwrap().unwrap();
//! assert_eq!(request.key, "color");
//! assert_eq!(consumed, data.len());
//!
//! // Creating responses
//! let bytes = Response::ok_with_body("red").serialize();
//! assert_eq!(bytes, b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nred");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_request, ParseError, ParseResult, RequestParser};
pub use types::{Method, Namespace, Request, Response, Status};
