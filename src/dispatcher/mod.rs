//! # Dispatcher Module
//!
//! The per-exchange state machine that drives one HTTP exchange from route
//! match to handler invocation.
//!
//! ## Overview
//!
//! The dispatcher is the orchestration point of the crate. It:
//! - Resolves the begin phase against the frozen route table
//! - Feeds body chunks to the payload accumulator per the matched route's mode
//! - Forwards chunks immediately to streaming handlers, continuation slot attached
//! - Performs the final invocation with captures bound positionally
//! - Maps every failure to a terminal `Failed` state, reported exactly once
//!
//! ## Lifecycle
//!
//! The transport owns the callback protocol and drives each
//! [`Exchange`] through three strictly sequential phases:
//!
//! ```text
//! Unmatched --begin--> Matched --chunk--> Accumulating --terminal chunk--> Invoked --> Done
//!      \                  \                   |
//!       \                  \                  | bound violation / handler fault / abort
//!        +------------------+-----------------+--> Failed
//! ```
//!
//! `Done` and `Failed` are terminal: further chunk calls produce a lifecycle
//! error and nothing else; `complete` performs cleanup and is idempotent.
//!
//! ## Threading
//!
//! Every method is synchronous and non-blocking. A [`Dispatcher`] is cheap to
//! clone and safe to share across transport worker threads; an [`Exchange`] is
//! exclusively owned by the one connection it belongs to.

mod core;

pub use self::core::{Dispatcher, Exchange, ExchangeState};
