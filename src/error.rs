use http::Method;
use std::fmt;

/// Route registration error
///
/// Returned by the [`RouteTable`](crate::router::RouteTable) registration
/// methods when a route cannot be added. Registration errors are fatal to that
/// registration and surfaced immediately — a misconfigured route is a startup
/// bug, not a per-request condition.
#[derive(Debug)]
pub enum RegistrationError {
    /// The path template is not a syntactically valid pattern
    ///
    /// Either the `{name}`-style template is malformed or the raw regex body
    /// failed to compile.
    InvalidPattern {
        /// The offending template as supplied by the caller
        pattern: String,
        /// Compilation failure reported by the regex engine
        source: regex::Error,
    },
    /// Declared parameter arity does not equal the pattern's capture count
    ///
    /// The handler's declared extra-parameter count must equal the number of
    /// capturing groups in the compiled pattern. A mismatch is a contract
    /// violation by the registering code, never a runtime user error.
    ArityMismatch {
        /// The route's path template
        pattern: String,
        /// Capture-group count of the compiled pattern
        captures: usize,
        /// Arity declared by the handler
        declared: usize,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::InvalidPattern { pattern, source } => {
                write!(
                    f,
                    "invalid path pattern '{}': {}",
                    pattern, source
                )
            }
            RegistrationError::ArityMismatch {
                pattern,
                captures,
                declared,
            } => {
                write!(
                    f,
                    "arity mismatch for pattern '{}': pattern has {} capture group(s) \
                     but the handler declares {} parameter(s)",
                    pattern, captures, declared
                )
            }
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistrationError::InvalidPattern { source, .. } => Some(source),
            RegistrationError::ArityMismatch { .. } => None,
        }
    }
}

/// Per-exchange dispatch error
///
/// Returned once, via the return value of the transport call that triggered
/// it. Any of these transitions the exchange to its terminal `Failed` state;
/// the core never retries an exchange internally.
#[derive(Debug)]
pub enum DispatchError {
    /// No registered route matches the request method and path
    ///
    /// Raised at the begin phase, before any body byte is consumed. The
    /// transport maps this to a not-found / method-not-allowed outcome.
    NoRoute {
        /// Request method
        method: Method,
        /// Request path (query string excluded)
        path: String,
    },
    /// Accumulated body size reached or exceeded the route's maximum
    ///
    /// The bound is strict: a chunk whose addition would make the buffer reach
    /// the maximum is rejected whole, never truncated.
    PayloadTooLarge {
        /// The route's configured maximum payload size in bytes
        limit: usize,
        /// Cumulative size the rejected chunk would have produced
        attempted: usize,
    },
    /// The handler itself faulted
    ///
    /// Covers handler callbacks that returned an error, panicked, or (for
    /// streaming routes) left part of a non-terminal chunk unconsumed.
    /// Unrecoverable for this exchange; the core does not retry.
    HandlerFailure(anyhow::Error),
    /// A lifecycle call arrived in a state that cannot accept it
    ///
    /// For example a body chunk before a successful begin, or after the
    /// exchange already reached `Done` or `Failed`. Such calls produce no
    /// behavior beyond this error.
    BadLifecycle {
        /// Name of the transport call that was rejected
        call: &'static str,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoRoute { method, path } => {
                write!(f, "no route matches {} {}", method, path)
            }
            DispatchError::PayloadTooLarge { limit, attempted } => {
                write!(
                    f,
                    "payload too large: {} byte(s) reaches the {} byte limit",
                    attempted, limit
                )
            }
            DispatchError::HandlerFailure(err) => {
                write!(f, "handler failed: {}", err)
            }
            DispatchError::BadLifecycle { call } => {
                write!(f, "lifecycle call '{}' rejected in the current exchange state", call)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::HandlerFailure(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
