//! # Request Module
//!
//! The handler-visible view of one HTTP exchange.
//!
//! A [`Request`] carries the progressively-discovered request metadata (method,
//! path, raw query string) and the slot the handler enqueues its
//! [`Response`](crate::response::Response) into. Header and query-string
//! parsing are transport concerns; the query string is carried here opaquely.

use http::Method;

use crate::response::Response;

/// Handler-visible request state for one HTTP exchange
///
/// Created by the dispatcher at the begin phase, handed to the handler by
/// mutable reference at invocation time, destroyed at the complete phase.
/// Never shared between exchanges or threads.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    response: Option<Response>,
}

impl Request {
    pub(crate) fn new(method: Method, path: String, query: Option<String>) -> Self {
        Self {
            method,
            path,
            query,
            response: None,
        }
    }

    /// HTTP method of the exchange
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path with the query string stripped
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, if the request target carried one
    ///
    /// Opaque to this layer — decoding and splitting belong to the embedding
    /// application.
    #[inline]
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Enqueue the response the transport should send
    ///
    /// Last write wins: a handler that responds twice replaces the first
    /// response.
    pub fn respond(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Whether a response has been enqueued
    #[inline]
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub(crate) fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}
