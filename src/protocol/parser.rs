//! Incremental Request Parser
//!
//! This module decodes the HTTP-shaped request protocol from a byte buffer.
//! TCP is a stream protocol, so the buffer may hold a partial request or
//! several pipelined requests; the parser reports exactly how much it
//! consumed and asks for more data when a request is incomplete.
//!
//! The parser returns one of:
//! - `Ok(Some((request, consumed)))` - a complete request, `consumed` bytes used
//! - `Ok(None)` - the data so far is an incomplete prefix, read more
//! - `Err(ParseError)` - the bytes cannot be a valid request
//!
//! A parse error is terminal for the connection: the worker closes the
//! stream without responding, the same way it treats end-of-stream.
//!
//! Two kinds of "wrong" input are deliberately distinct. A request whose
//! *shape* is wrong (request line not three tokens, path not exactly
//! `/namespace/key`, header line without a colon) is a `ParseError`. A
//! request with valid shape whose method or namespace token is simply not
//! recognized parses successfully with that field set to `None`, and the
//! router answers it with 400.

use crate::protocol::types::{Method, Namespace, Request, CONTENT_LENGTH};
use thiserror::Error;

/// Errors that can occur while decoding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line is not `METHOD SP PATH SP HTTP/1.1`
    #[error("malformed request line: {0:?}")]
    BadRequestLine(String),

    /// Path does not split into exactly `/namespace/key`
    #[error("malformed request path: {0:?}")]
    BadPath(String),

    /// Header line without a colon separator
    #[error("malformed header line: {0:?}")]
    BadHeader(String),

    /// Content-Length header present but not an unsigned integer
    #[error("invalid Content-Length: {0:?}")]
    BadContentLength(String),

    /// Request text is not valid UTF-8
    #[error("invalid UTF-8 in request")]
    InvalidUtf8,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The protocol version token every request line must carry.
const HTTP_VERSION: &str = "HTTP/1.1";

/// An incremental request parser.
///
/// The parser itself is stateless; it re-examines the buffer from the start
/// on every call, so the caller can simply append incoming bytes and retry.
///
/// # Example
///
/// ```
/// use duokv::protocol::RequestParser;
///
/// let parser = RequestParser::new();
/// let buf = b"GET /public/color HTTP/1.1\r\n\r\n";
/// let (request, consumed) = parser.parse(buf).unwrap().unwrap();
/// assert_eq!(consumed, buf.len());
/// assert_eq!(request.key, "color");
/// ```
#[derive(Debug, Default)]
pub struct RequestParser;

impl RequestParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        RequestParser
    }

    /// Attempts to decode one complete request from the front of `buf`.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        let mut pos = 0;

        // Request line
        let line = match read_line(buf, pos)? {
            Some((line, next)) => {
                pos = next;
                line
            }
            None => return Ok(None),
        };
        let (method, namespace, key) = parse_request_line(line)?;

        // Header lines until the blank line
        let mut headers: Vec<(String, String)> = Vec::new();
        loop {
            let line = match read_line(buf, pos)? {
                Some((line, next)) => {
                    pos = next;
                    line
                }
                None => return Ok(None),
            };
            if line.is_empty() {
                break;
            }
            headers.push(parse_header_line(line)?);
        }

        // Body, framed by Content-Length when present
        let body = match header_value(&headers, CONTENT_LENGTH) {
            Some(raw) => {
                let length: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::BadContentLength(raw.to_string()))?;
                if buf.len() < pos + length {
                    return Ok(None);
                }
                let body = std::str::from_utf8(&buf[pos..pos + length])
                    .map_err(|_| ParseError::InvalidUtf8)?;
                pos += length;
                Some(body.to_string())
            }
            None => None,
        };

        let request = Request {
            method,
            namespace,
            key,
            headers,
            body,
            authenticated: true,
        };
        Ok(Some((request, pos)))
    }
}

/// Splits the request line into its method, namespace and key.
///
/// The line must be exactly three space-separated tokens ending in
/// `HTTP/1.1`, and the path must split on `/` into exactly three segments
/// (a leading empty one, the namespace, the key).
fn parse_request_line(
    line: &str,
) -> ParseResult<(Option<Method>, Option<Namespace>, String)> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != 3 || tokens[2] != HTTP_VERSION {
        return Err(ParseError::BadRequestLine(line.to_string()));
    }

    let segments: Vec<&str> = tokens[1].split('/').collect();
    if segments.len() != 3 || !segments[0].is_empty() {
        return Err(ParseError::BadPath(tokens[1].to_string()));
    }

    Ok((
        Method::from_token(tokens[0]),
        Namespace::from_token(segments[1]),
        segments[2].to_string(),
    ))
}

/// Splits a header line at the first colon. The name is kept exactly as
/// received; the value has leading spaces stripped.
fn parse_header_line(line: &str) -> ParseResult<(String, String)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::BadHeader(line.to_string()))?;
    Ok((name.to_string(), value.trim_start_matches(' ').to_string()))
}

/// Case-sensitive lookup over collected headers, first occurrence wins.
fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Reads one CRLF-terminated line starting at `pos`.
///
/// Returns the line (without its CRLF) and the offset just past it, or
/// `None` if the terminator has not arrived yet.
fn read_line(buf: &[u8], pos: usize) -> ParseResult<Option<(&str, usize)>> {
    match find_crlf(&buf[pos..]) {
        Some(end) => {
            let line = std::str::from_utf8(&buf[pos..pos + end])
                .map_err(|_| ParseError::InvalidUtf8)?;
            Ok(Some((line, pos + end + 2)))
        }
        None => Ok(None),
    }
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    for i in 0..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            return Some(i);
        }
    }
    None
}

/// Helper function to parse a single request from bytes.
///
/// This is a convenience function for simple use cases.
pub fn parse_request(buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
    RequestParser::new().parse(buf)
}
