//! Wire Protocol Data Types
//!
//! This module defines the structured forms of the HTTP-shaped protocol
//! duokv speaks: the parsed request, the response, and the small enums
//! (method, namespace, status) they are built from.
//!
//! ## Protocol Format
//!
//! A request is a request line, zero or more header lines, a blank line,
//! and an optional body framed by `Content-Length`:
//!
//! ```text
//! PUT /public/color HTTP/1.1\r\n
//! Content-Length: 3\r\n
//! \r\n
//! red
//! ```
//!
//! A response is a status line, an optional `Content-Length` header (present
//! exactly when a body is), a blank line, and the body:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 3\r\n
//! \r\n
//! red
//! ```

use std::fmt;

/// The CRLF terminator used by the wire protocol
pub const CRLF: &[u8] = b"\r\n";

/// Header carrying the shared-secret credential for the private namespace.
/// Matched case-sensitively, exactly as received.
pub const AUTHORIZATION: &str = "Authorization";

/// Header framing a request or response body. Matched case-sensitively.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// The three operations a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    /// Maps a request-line token onto a method. Unrecognized tokens yield
    /// `None`; the router answers those with 400 rather than the parser
    /// dropping the connection.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two key spaces a request may address. Each is backed by its own
/// store instance; `Private` additionally requires the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Public,
    Private,
}

impl Namespace {
    /// Maps a path segment onto a namespace, `None` for unrecognized names.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "public" => Some(Namespace::Public),
            "private" => Some(Namespace::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Public => "public",
            Namespace::Private => "private",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response statuses the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    Unauthorized,
    NotFound,
    InternalServerError,
    ServiceUnavailable,
}

impl Status {
    /// The numeric status code sent on the wire.
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::ServiceUnavailable => 503,
        }
    }

    /// The standard reason phrase for the status line.
    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
            Status::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// A fully parsed client request.
///
/// `method` and `namespace` are `None` when the token was present and
/// well-formed but not one of the recognized values; such requests are
/// answered with 400 by the router. `authenticated` starts out `true` and
/// is cleared by the connection worker when the authentication gate rejects
/// a private-namespace request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Option<Method>,
    pub namespace: Option<Namespace>,
    pub key: String,
    /// Header names and values exactly as received, in order.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub authenticated: bool,
}

impl Request {
    /// Looks up a header by exact, case-sensitive name. The first
    /// occurrence wins when a name repeats.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A response ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: Option<String>,
}

impl Response {
    /// 200 with no body (successful PUT or DELETE).
    pub fn ok() -> Self {
        Response {
            status: Status::Ok,
            body: None,
        }
    }

    /// 200 carrying a retrieved value (successful GET).
    pub fn ok_with_body(body: impl Into<String>) -> Self {
        Response {
            status: Status::Ok,
            body: Some(body.into()),
        }
    }

    pub fn bad_request() -> Self {
        Response {
            status: Status::BadRequest,
            body: None,
        }
    }

    pub fn unauthorized() -> Self {
        Response {
            status: Status::Unauthorized,
            body: None,
        }
    }

    pub fn not_found() -> Self {
        Response {
            status: Status::NotFound,
            body: None,
        }
    }

    pub fn internal_server_error() -> Self {
        Response {
            status: Status::InternalServerError,
            body: None,
        }
    }

    pub fn service_unavailable() -> Self {
        Response {
            status: Status::ServiceUnavailable,
            body: None,
        }
    }

    /// Serializes the response to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the response into an existing buffer.
    ///
    /// The `Content-Length` header is emitted exactly when a body is
    /// present; a body-less response is a status line and a blank line.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"HTTP/1.1 ");
        buf.extend_from_slice(self.status.code().to_string().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.status.reason().as_bytes());
        buf.extend_from_slice(CRLF);

        if let Some(body) = &self.body {
            buf.extend_from_slice(CONTENT_LENGTH.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(body.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            buf.extend_from_slice(CRLF);
            buf.extend_from_slice(body.as_bytes());
        } else {
            buf.extend_from_slice(CRLF);
        }
    }
}
