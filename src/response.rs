//! # Response Module
//!
//! The opaque response value a handler enqueues for the transport.
//!
//! This layer never writes a status line or moves file bytes — it only records
//! what the handler decided. The body distinguishes an in-memory buffer from a
//! whole file and from a byte-range of a file so the transport can pick its
//! transfer strategy (buffer send, sendfile, range read) without re-inspecting
//! the handler's intent.

use smallvec::SmallVec;
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum inline response headers before heap allocation.
/// Most responses carry well under 16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated response header storage
///
/// Header names use `Arc<str>` because the common names (content-type,
/// cache-control, ...) repeat across responses and clone in O(1); values are
/// per-response data and stay `String`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// What the transport should transmit as the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// An in-memory buffer, sent as-is
    Buffer(Vec<u8>),
    /// A whole file; the transport opens and streams it
    File {
        /// Path of the file to serve
        path: PathBuf,
    },
    /// A byte-range of a file, for range requests
    FileRange {
        /// Path of the file to serve
        path: PathBuf,
        /// First byte offset of the range
        offset: u64,
        /// Number of bytes to serve from the offset
        length: u64,
    },
}

/// A response enqueued by a handler, opaque to the dispatch core
#[derive(Debug)]
pub struct Response {
    /// HTTP status code (200, 404, 500, ...)
    pub status: u16,
    /// Response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body
    pub body: ResponseBody,
}

impl Response {
    /// Create a response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A response with a status code and an empty body
    #[must_use]
    pub fn status_only(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), ResponseBody::Buffer(Vec::new()))
    }

    /// A plain-text response
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::with_content_type(status, "text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// An HTML response
    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::with_content_type(status, "text/html; charset=utf-8", body.into().into_bytes())
    }

    /// A binary response with an explicit content type
    #[must_use]
    pub fn with_content_type(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_string()));
        Self::new(status, headers, ResponseBody::Buffer(body))
    }

    /// A JSON response serialized from any `Serialize` value
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn json<T: serde::Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::with_content_type(status, "application/json", body))
    }

    /// A whole-file response; the transport opens and streams the file
    #[must_use]
    pub fn from_file(status: u16, path: impl Into<PathBuf>) -> Self {
        Self::new(
            status,
            HeaderVec::new(),
            ResponseBody::File { path: path.into() },
        )
    }

    /// A byte-range file response for range requests
    #[must_use]
    pub fn from_file_range(status: u16, path: impl Into<PathBuf>, offset: u64, length: u64) -> Self {
        Self::new(
            status,
            HeaderVec::new(),
            ResponseBody::FileRange {
                path: path.into(),
                offset,
                length,
            },
        )
    }

    /// Canonical reason phrase for this response's status code
    ///
    /// `None` for codes outside the table; the transport supplies its own
    /// phrase (or an empty one) in that case.
    #[inline]
    #[must_use]
    pub fn reason_phrase(&self) -> Option<&'static str> {
        reason_phrase(self.status)
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Canonical reason phrase for an HTTP status code
///
/// Covers the common 2xx-5xx codes so the transport can build a status line
/// without its own table.
#[must_use]
pub fn reason_phrase(status: u16) -> Option<&'static str> {
    let phrase = match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-authoritative information",
        204 => "No content",
        205 => "Reset content",
        206 => "Partial content",
        207 => "Multi-status",
        208 => "Already reported",
        226 => "IM Used",
        300 => "Multiple choices",
        301 => "Moved permanently",
        302 => "Found",
        303 => "See other",
        304 => "Not modified",
        305 => "Use proxy",
        306 => "Switch proxy",
        307 => "Temporary redirect",
        308 => "Permanent redirect",
        400 => "Bad request",
        401 => "Unauthorized",
        402 => "Payment required",
        403 => "Forbidden",
        404 => "Not found",
        405 => "Method not allowed",
        406 => "Not acceptable",
        407 => "Proxy authentication required",
        408 => "Request timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length required",
        412 => "Precondition failed",
        413 => "Payload too large",
        414 => "URI too long",
        415 => "Unsupported media type",
        416 => "Range not satisfiable",
        417 => "Expectation failed",
        418 => "I'm a teapot",
        421 => "Misdirected request",
        422 => "Unprocessable entity",
        423 => "Locked",
        424 => "Failed dependency",
        425 => "Too early",
        426 => "Upgrade required",
        428 => "Precondition required",
        429 => "Too many requests",
        431 => "Request header fields too large",
        451 => "Unavailable for legal reasons",
        500 => "Internal server error",
        501 => "Not implemented",
        502 => "Bad gateway",
        503 => "Service unavailable",
        504 => "Gateway timeout",
        505 => "HTTP version not supported",
        506 => "Variant also negotiates",
        507 => "Insufficient storage",
        508 => "Loop detected",
        510 => "Not extended",
        511 => "Network authentication required",
        _ => return None,
    };
    Some(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn text_response_sets_content_type() {
        let resp = Response::text(200, "hi");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.get_header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(resp.body, ResponseBody::Buffer(b"hi".to_vec()));
    }

    #[test]
    fn json_response_serializes_value() {
        #[derive(Serialize)]
        struct Pet {
            name: &'static str,
        }
        let resp = Response::json(201, &Pet { name: "Fluffy" }).unwrap();
        assert_eq!(resp.get_header("content-type"), Some("application/json"));
        assert_eq!(resp.body, ResponseBody::Buffer(br#"{"name":"Fluffy"}"#.to_vec()));
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut resp = Response::status_only(204);
        resp.set_header("X-Trace", "a".to_string());
        resp.set_header("x-trace", "b".to_string());
        assert_eq!(resp.get_header("X-TRACE"), Some("b"));
        assert_eq!(resp.headers.len(), 1);
    }

    #[test]
    fn reason_phrases_cover_the_common_codes() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(404), Some("Not found"));
        assert_eq!(reason_phrase(418), Some("I'm a teapot"));
        assert_eq!(reason_phrase(503), Some("Service unavailable"));
        // Unlisted codes are the transport's problem.
        assert_eq!(reason_phrase(299), None);
        assert_eq!(reason_phrase(600), None);

        let resp = Response::status_only(206);
        assert_eq!(resp.reason_phrase(), Some("Partial content"));
    }

    #[test]
    fn file_range_body_carries_offsets() {
        let resp = Response::from_file_range(206, "/tmp/data.bin", 100, 50);
        match resp.body {
            ResponseBody::FileRange { offset, length, .. } => {
                assert_eq!((offset, length), (100, 50));
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
