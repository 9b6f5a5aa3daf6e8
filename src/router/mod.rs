//! # Router Module
//!
//! The ordered route table: append-only registration with arity validation and
//! linear first-match lookup.
//!
//! ## Overview
//!
//! The route table is responsible for:
//! - Compiling path templates into matchable patterns at registration time
//! - Validating each handler's declared arity against its pattern's capture count
//! - Matching incoming requests (method + path) to the first suitable registration
//! - Extracting ordered path captures for positional parameter binding
//!
//! ## Ordering
//!
//! Registrations are scanned in registration order and the first match wins.
//! Routes need not be mutually exclusive — ambiguity is resolved by position,
//! so register the more specific pattern first.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routecore::router::RouteTable;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut table = RouteTable::new();
//! table.get("/pets/{id}", |req, params| {
//!     println!("pet {}", params[0]);
//!     Ok(())
//! })?;
//!
//! let m = table.find_match(&Method::GET, "/pets/123").unwrap();
//! assert_eq!(&m.captures[0], "123");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The table is build-then-freeze: after the dispatcher wraps it in an `Arc`
//! it is only ever read, so concurrent lookups from transport worker threads
//! need no synchronization.

mod core;

pub use self::core::{Route, RouteMatch, RouteTable};
pub use crate::pattern::{CaptureVec, MAX_INLINE_CAPTURES};
