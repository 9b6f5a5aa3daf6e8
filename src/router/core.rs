//! Router core - hot path for request-to-route matching.

use http::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::RegistrationError;
use crate::handler::RouteHandler;
use crate::pattern::{CaptureVec, PathPattern};
use crate::payload::PayloadMode;
use crate::request::Request;

/// One registered route: method, compiled pattern, payload policy, handler
///
/// Immutable once appended to the table. The payload mode and declared arity
/// come from the handler variant; the maximum payload size is meaningful only
/// for the buffered modes (0 = unbounded).
#[derive(Debug)]
pub struct Route {
    /// HTTP method this route answers
    pub method: Method,
    /// Compiled path pattern
    pub pattern: PathPattern,
    /// Maximum payload size in bytes for buffered modes; 0 = unbounded
    pub max_size: usize,
    handler: RouteHandler,
}

impl Route {
    /// Payload-handling mode implied by the handler shape
    #[inline]
    #[must_use]
    pub fn mode(&self) -> PayloadMode {
        self.handler.mode()
    }

    /// Extra-parameter arity declared by the handler
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.handler.arity()
    }

    pub(crate) fn handler(&self) -> &RouteHandler {
        &self.handler
    }
}

/// Result of successfully matching a request to a route
///
/// Contains the matched registration and the captures extracted from the path,
/// in left-to-right group order, ready for positional binding at invocation.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched registration (`Arc` — shared with the frozen table)
    pub route: Arc<Route>,
    /// Ordered path captures (stack-allocated for ≤8 captures)
    pub captures: CaptureVec,
}

/// Ordered, append-only collection of route registrations
///
/// Built once at startup, then frozen into an `Arc` by the
/// [`Dispatcher`](crate::dispatcher::Dispatcher). Lookup is a linear scan in
/// registration order; the first registration whose method, pattern, and arity
/// all fit wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Append a route registration
    ///
    /// The template is compiled immediately and the handler's declared arity is
    /// validated against the pattern's capture count — a misregistered route
    /// fails here, at startup, never per-request.
    ///
    /// # Errors
    ///
    /// [`RegistrationError::InvalidPattern`] if the template does not compile;
    /// [`RegistrationError::ArityMismatch`] if the declared arity differs from
    /// the pattern's capture-group count.
    pub fn route(
        &mut self,
        method: Method,
        template: &str,
        handler: RouteHandler,
        max_size: usize,
    ) -> Result<(), RegistrationError> {
        let pattern = PathPattern::compile(template)?;

        if handler.arity() != pattern.capture_count() {
            return Err(RegistrationError::ArityMismatch {
                pattern: template.to_string(),
                captures: pattern.capture_count(),
                declared: handler.arity(),
            });
        }

        info!(
            method = %method,
            pattern = %pattern,
            mode = %handler.mode(),
            arity = handler.arity(),
            max_size = max_size,
            position = self.routes.len(),
            "Route registered"
        );

        self.routes.push(Arc::new(Route {
            method,
            pattern,
            max_size,
            handler,
        }));
        Ok(())
    }

    /// Register a GET route that ignores any request body
    ///
    /// The handler's arity follows the pattern: it receives one capture string
    /// per capturing group. Use [`RouteTable::route`] with an explicit
    /// [`RouteHandler`] when the arity should be independently asserted.
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::route`].
    pub fn get<F>(&mut self, template: &str, func: F) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.no_payload_route(Method::GET, template, func)
    }

    /// Register a POST route that ignores any request body
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::route`].
    pub fn post<F>(&mut self, template: &str, func: F) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.no_payload_route(Method::POST, template, func)
    }

    /// Register a PUT route that ignores any request body
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::route`].
    pub fn put<F>(&mut self, template: &str, func: F) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.no_payload_route(Method::PUT, template, func)
    }

    /// Register a DELETE route that ignores any request body
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::route`].
    pub fn delete<F>(&mut self, template: &str, func: F) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.no_payload_route(Method::DELETE, template, func)
    }

    fn no_payload_route<F>(
        &mut self,
        method: Method,
        template: &str,
        func: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let pattern = PathPattern::compile(template)?;
        let handler = RouteHandler::no_payload(pattern.capture_count(), func);
        self.route(method, template, handler, 0)
    }

    /// Match a request's method and path to the first suitable registration
    ///
    /// Scans registrations in registration order. A candidate matches when its
    /// method equals the request method, its pattern fully matches the path,
    /// and the capture count equals the handler's declared arity. A candidate
    /// whose pattern matched but whose capture count disagrees with its arity
    /// is skipped — the pattern matched the path string but is not a valid
    /// route for it — and the scan continues.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the first matching registration plus its captures
    /// * `None` - no registration matched; callers surface `NoRoute`
    #[must_use]
    pub fn find_match(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for (position, route) in self.routes.iter().enumerate() {
            if route.method != *method {
                continue;
            }
            let Some(captures) = route.pattern.match_path(path) else {
                continue;
            };
            if captures.len() != route.arity() {
                warn!(
                    method = %method,
                    path = %path,
                    pattern = %route.pattern,
                    captures = captures.len(),
                    declared_arity = route.arity(),
                    position = position,
                    "Pattern matched but arity disagrees - skipping registration"
                );
                continue;
            }

            info!(
                method = %method,
                path = %path,
                pattern = %route.pattern,
                captures = ?captures,
                position = position,
                "Route matched"
            );
            return Some(RouteMatch {
                route: Arc::clone(route),
                captures,
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Test-only append that bypasses registration validation, to exercise the
    /// match-time arity-skip path.
    #[cfg(test)]
    pub(crate) fn push_unchecked(
        &mut self,
        method: Method,
        pattern: PathPattern,
        handler: RouteHandler,
        max_size: usize,
    ) {
        self.routes.push(Arc::new(Route {
            method,
            pattern,
            max_size,
            handler,
        }));
    }
}
