//! # routecore
//!
//! **routecore** is the routing and request-dispatch core of an embeddable HTTP
//! request handler. It does not listen on sockets and it does not write bytes to
//! the wire: a surrounding transport (a daemon built on an event loop, a thread
//! pool, or a test harness) accepts connections, parses the request line, and
//! drives this layer through a fixed three-phase callback protocol. routecore
//! owns everything in between — which handler runs, in what shape it is
//! invoked, and how untrusted body bytes are bounded and buffered on the way
//! there.
//!
//! ## Architecture
//!
//! The library is organized into a handful of small modules, leaf-first:
//!
//! - **[`pattern`]** - compiles a path template into an anchored, matchable
//!   pattern and extracts ordered capture strings from concrete paths
//! - **[`router`]** - the ordered route table: append-only registration with
//!   arity validation, linear first-match lookup
//! - **[`payload`]** - per-request body buffering policy: four payload modes
//!   and a strict maximum-size bound
//! - **[`handler`]** - the four handler callback shapes and the type-erased
//!   continuation slot streaming handlers persist state in
//! - **[`dispatcher`]** - the per-exchange state machine that ties the above
//!   together and performs the final handler invocation
//! - **[`request`]** / **[`response`]** - the data a handler sees and the
//!   opaque response value it enqueues for the transport
//!
//! ## Request Handling Flow
//!
//! One HTTP exchange maps to one [`dispatcher::Exchange`] driven through three
//! phases by the transport:
//!
//! 1. **Begin** — [`Dispatcher::begin`](dispatcher::Dispatcher::begin) asks the
//!    route table for a first match on method + path. No match fails the
//!    exchange fast, before a single body byte is consumed.
//! 2. **Body** — [`Dispatcher::body_chunk`](dispatcher::Dispatcher::body_chunk)
//!    is called zero or more times. Buffered modes accumulate under the route's
//!    size bound; streaming routes see every chunk immediately. The terminal
//!    (zero-length) chunk triggers the final invocation with the captured path
//!    parameters bound positionally.
//! 3. **Complete** — [`Dispatcher::complete`](dispatcher::Dispatcher::complete)
//!    releases per-request state. Always called exactly once, idempotent, never
//!    invokes the handler.
//!
//! ## Quick Start
//!
//! ```no_run
//! use http::Method;
//! use routecore::{Dispatcher, Exchange, Response, RouteTable};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut table = RouteTable::new();
//! table.get("/users/{id}", |req, params| {
//!     req.respond(Response::text(200, format!("user {}", params[0])));
//!     Ok(())
//! })?;
//! let dispatcher = Dispatcher::new(table);
//!
//! // The transport drives each exchange through the three phases:
//! let mut ex = Exchange::new(Method::GET, "/users/42");
//! dispatcher.begin(&mut ex)?;
//! dispatcher.body_chunk(&mut ex, b"", true)?;
//! let response = ex.take_response();
//! dispatcher.complete(&mut ex);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! Every entry point is a plain synchronous function; there are no suspension
//! points and no global mutable state. The [`router::RouteTable`] is frozen
//! into an `Arc` when the [`dispatcher::Dispatcher`] is built and is the only
//! state shared across exchanges — read-only, safe for unsynchronized
//! concurrent reads. An [`dispatcher::Exchange`] is exclusively owned by the
//! transport context driving that one exchange and must never be shared.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod pattern;
pub mod payload;
pub mod request;
pub mod response;
pub mod router;

pub use dispatcher::{Dispatcher, Exchange, ExchangeState};
pub use error::{DispatchError, RegistrationError};
pub use handler::{RouteHandler, StreamState};
pub use pattern::PathPattern;
pub use payload::{FinalPayload, PayloadMode, TextPayload};
pub use request::Request;
pub use response::{Response, ResponseBody};
pub use router::{CaptureVec, Route, RouteMatch, RouteTable};
