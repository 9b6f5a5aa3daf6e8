//! Dispatcher core - hot path for exchange lifecycle and handler invocation.

use anyhow::anyhow;
use http::Method;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::DispatchError;
use crate::handler::{RouteHandler, StreamState};
use crate::payload::{FinalPayload, PayloadBuffer, PayloadMode, TextPayload};
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteMatch, RouteTable};

/// Lifecycle state of one HTTP exchange
///
/// `Done` and `Failed` are terminal; `Failed` is reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Created; the begin phase has not resolved a route yet
    Unmatched,
    /// A route is matched; no body chunk has been processed
    Matched,
    /// At least one body chunk has been processed
    Accumulating,
    /// The final invocation ran; transitions to `Done` immediately after
    Invoked,
    /// The exchange finished normally
    Done,
    /// The exchange failed; the handler will not be (further) invoked
    Failed,
}

impl ExchangeState {
    /// Whether no further lifecycle progress is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ExchangeState::Done | ExchangeState::Failed)
    }
}

/// Per-exchange request state
///
/// One `Exchange` exists per HTTP exchange, created when the transport learns
/// the method and request target, destroyed after the complete phase. It is
/// exclusively owned by the transport context driving that connection and is
/// never shared or reused.
#[derive(Debug)]
pub struct Exchange {
    request: Request,
    matched: Option<RouteMatch>,
    accumulator: Option<PayloadBuffer>,
    stream: StreamState,
    state: ExchangeState,
}

impl Exchange {
    /// Create request state for a new exchange
    ///
    /// `target` is the request target as it appeared on the request line; it
    /// splits at the first `?` into the path and the opaque query string.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            request: Request::new(method, path, query),
            matched: None,
            accumulator: None,
            stream: StreamState::new(),
            state: ExchangeState::Unmatched,
        }
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// The handler-visible request state
    #[inline]
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Take the response the handler enqueued, if any
    ///
    /// `None` means the handler produced no response; the transport decides
    /// what that means for the connection.
    pub fn take_response(&mut self) -> Option<Response> {
        self.request.take_response()
    }

    /// Abort the exchange from any state
    ///
    /// The transport calls this when the connection drops mid-body. Releases
    /// per-request resources without invoking the handler. An already-`Done`
    /// exchange stays `Done`.
    pub fn abort(&mut self) {
        if self.state != ExchangeState::Done {
            debug!(state = ?self.state, "Exchange aborted");
            self.state = ExchangeState::Failed;
        }
        self.release();
    }

    fn fail(&mut self) {
        self.state = ExchangeState::Failed;
        self.release();
    }

    /// Drop accumulated payload and continuation state.
    fn release(&mut self) {
        self.accumulator = None;
        self.stream.clear();
    }
}

/// Dispatch engine over a frozen route table
///
/// Orchestrates the three lifecycle phases against the route table and the
/// payload accumulator, and performs the final invocation with captures bound
/// positionally. Cloning shares the frozen table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    /// Freeze a route table and build the dispatch engine over it
    ///
    /// After this point the table is read-only and safe for unsynchronized
    /// concurrent lookups from transport worker threads.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// The frozen route table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Begin phase: resolve the exchange against the route table
    ///
    /// No body is available yet. Success stores the matched registration and
    /// its captures and signals accept to the transport; failure is fast —
    /// before a single body byte is consumed — and terminal for the exchange.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoRoute`] when nothing matches (the transport emits a
    /// not-found / method-not-allowed outcome);
    /// [`DispatchError::BadLifecycle`] when begin was already called.
    pub fn begin(&self, exchange: &mut Exchange) -> Result<(), DispatchError> {
        if exchange.state != ExchangeState::Unmatched {
            return Err(DispatchError::BadLifecycle { call: "begin" });
        }

        let method = exchange.request.method().clone();
        let path = exchange.request.path().to_string();

        match self.table.find_match(&method, &path) {
            Some(route_match) => {
                exchange.accumulator = Some(PayloadBuffer::new(
                    route_match.route.mode(),
                    route_match.route.max_size,
                ));
                exchange.matched = Some(route_match);
                exchange.state = ExchangeState::Matched;
                Ok(())
            }
            None => {
                exchange.fail();
                Err(DispatchError::NoRoute { method, path })
            }
        }
    }

    /// Body phase: process one chunk, or the terminal end-of-body signal
    ///
    /// Called zero or more times after a successful begin. A zero-length chunk
    /// (equivalently `is_final`) signals end of body and triggers the final
    /// invocation. Buffered modes accumulate under the route's size bound;
    /// streaming routes see every chunk immediately, the terminal call
    /// carrying a zero-length chunk and the same continuation slot as every
    /// call before it.
    ///
    /// # Errors
    ///
    /// [`DispatchError::PayloadTooLarge`] on a bound violation,
    /// [`DispatchError::HandlerFailure`] when the handler errors, panics, or
    /// leaves part of a non-terminal streaming chunk unconsumed, and
    /// [`DispatchError::BadLifecycle`] for a chunk arriving before begin or
    /// after the exchange reached a terminal state. All of these leave the
    /// exchange `Failed` (lifecycle errors leave the state untouched) and are
    /// reported exactly once.
    pub fn body_chunk(
        &self,
        exchange: &mut Exchange,
        data: &[u8],
        is_final: bool,
    ) -> Result<(), DispatchError> {
        if !matches!(
            exchange.state,
            ExchangeState::Matched | ExchangeState::Accumulating
        ) {
            return Err(DispatchError::BadLifecycle { call: "body_chunk" });
        }

        let terminal = is_final || data.is_empty();
        let mode = match &exchange.matched {
            Some(m) => m.route.mode(),
            // Matched state always carries a route; guard for the invariant.
            None => {
                exchange.fail();
                return Err(DispatchError::HandlerFailure(anyhow!(
                    "exchange in matched state without a stored route"
                )));
            }
        };

        match mode {
            PayloadMode::Streaming => self.stream_chunk(exchange, data, terminal),
            PayloadMode::Ignore | PayloadMode::BufferedText | PayloadMode::BufferedBinary => {
                if !data.is_empty() {
                    if let Some(acc) = exchange.accumulator.as_mut() {
                        if let Err(err) = acc.feed(data) {
                            exchange.fail();
                            return Err(err);
                        }
                    }
                    exchange.state = ExchangeState::Accumulating;
                }
                if terminal {
                    self.final_invocation(exchange)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Complete phase: release per-request state
    ///
    /// Always called exactly once per exchange regardless of outcome, after
    /// the transport is done with the connection. Idempotent over `Done` and
    /// `Failed`, never invokes the handler, never panics. An exchange that
    /// never reached `Done` (connection drop mid-body) is marked `Failed`.
    pub fn complete(&self, exchange: &mut Exchange) {
        debug!(state = ?exchange.state, "Exchange complete");
        if !exchange.state.is_terminal() {
            exchange.state = ExchangeState::Failed;
        }
        exchange.release();
    }

    /// Deliver one chunk to a streaming handler, terminal call included.
    fn stream_chunk(
        &self,
        exchange: &mut Exchange,
        data: &[u8],
        terminal: bool,
    ) -> Result<(), DispatchError> {
        // A final flag on a non-empty chunk still owes the handler its
        // terminal zero-length call; deliver the data first.
        if terminal && !data.is_empty() {
            self.stream_chunk(exchange, data, false)?;
            return self.stream_chunk(exchange, &[], true);
        }

        exchange.state = if terminal {
            ExchangeState::Invoked
        } else {
            ExchangeState::Accumulating
        };

        let Exchange {
            request,
            matched,
            stream,
            ..
        } = exchange;
        let Some(route_match) = matched.as_ref() else {
            exchange.fail();
            return Err(DispatchError::HandlerFailure(anyhow!(
                "streaming exchange without a stored route"
            )));
        };
        let params = route_match.captures.as_slice();

        let RouteHandler::Streaming { func, .. } = route_match.route.handler() else {
            exchange.fail();
            return Err(DispatchError::HandlerFailure(anyhow!(
                "streaming chunk delivered to a non-streaming handler"
            )));
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| func(request, data, stream, params)));
        let consumed = match outcome {
            Ok(Ok(n)) => n,
            Ok(Err(err)) => {
                error!(error = %err, "Streaming handler returned an error");
                exchange.fail();
                return Err(DispatchError::HandlerFailure(err));
            }
            Err(panic) => {
                let message = format!("{panic:?}");
                error!(panic_message = %message, "Streaming handler panicked");
                exchange.fail();
                return Err(DispatchError::HandlerFailure(anyhow!(
                    "handler panicked: {message}"
                )));
            }
        };

        // Unconsumed bytes on a non-terminal chunk are an error: this layer
        // neither retries leftovers nor drops them silently.
        if !terminal && consumed != data.len() {
            error!(
                consumed = consumed,
                chunk_len = data.len(),
                "Streaming handler left chunk bytes unconsumed"
            );
            exchange.fail();
            return Err(DispatchError::HandlerFailure(anyhow!(
                "streaming handler consumed {consumed} of {} chunk byte(s)",
                data.len()
            )));
        }

        if terminal {
            info!(
                method = %exchange.request.method(),
                path = %exchange.request.path(),
                "Streaming exchange finished"
            );
            exchange.state = ExchangeState::Done;
            exchange.stream.clear();
        }
        Ok(())
    }

    /// Final invocation for the non-streaming modes: bind the captures
    /// positionally, then the finished payload where the shape takes one.
    /// At most once per exchange — `Done` is terminal.
    fn final_invocation(&self, exchange: &mut Exchange) -> Result<(), DispatchError> {
        let Some(acc) = exchange.accumulator.take() else {
            exchange.fail();
            return Err(DispatchError::HandlerFailure(anyhow!(
                "final invocation without an accumulator"
            )));
        };
        let payload = acc.finish();

        let Exchange {
            request, matched, ..
        } = exchange;
        let Some(route_match) = matched.as_ref() else {
            exchange.fail();
            return Err(DispatchError::HandlerFailure(anyhow!(
                "final invocation without a stored route"
            )));
        };
        let params = route_match.captures.as_slice();

        info!(
            method = %request.method(),
            path = %request.path(),
            mode = %route_match.route.mode(),
            payload_len = match &payload {
                FinalPayload::None => 0,
                FinalPayload::Text(b) | FinalPayload::Binary(b) => b.len(),
            },
            "Final invocation"
        );

        exchange.state = ExchangeState::Invoked;
        let outcome = catch_unwind(AssertUnwindSafe(
            || match (route_match.route.handler(), &payload) {
                (RouteHandler::NoPayload { func, .. }, FinalPayload::None) => {
                    func(request, params)
                }
                (RouteHandler::Text { func, .. }, FinalPayload::Text(bytes)) => {
                    // The view hands the bytes through untouched; any lossy
                    // string conversion happens inside the handler, on a copy.
                    func(request, TextPayload::new(bytes), params)
                }
                (RouteHandler::Binary { func, .. }, FinalPayload::Binary(bytes)) => {
                    func(request, bytes, params)
                }
                _ => Err(anyhow!("handler shape does not match finished payload")),
            },
        ));

        match outcome {
            Ok(Ok(())) => {
                exchange.state = ExchangeState::Done;
                Ok(())
            }
            Ok(Err(err)) => {
                error!(error = %err, "Handler returned an error");
                exchange.fail();
                Err(DispatchError::HandlerFailure(err))
            }
            Err(panic) => {
                let message = format!("{panic:?}");
                error!(panic_message = %message, "Handler panicked");
                exchange.fail();
                Err(DispatchError::HandlerFailure(anyhow!(
                    "handler panicked: {message}"
                )))
            }
        }
    }
}
