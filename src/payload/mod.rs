//! # Payload Module
//!
//! Per-request body buffering policy: what happens to untrusted request body
//! bytes between the transport handing them over and the handler seeing them.
//!
//! ## Modes
//!
//! Every route declares one of four payload-handling modes:
//!
//! - [`PayloadMode::Ignore`] - chunks are discarded unread (GET-style routes)
//! - [`PayloadMode::BufferedText`] - chunks accumulate; the finished payload is
//!   delivered as a [`TextPayload`] view over the verbatim bytes
//! - [`PayloadMode::BufferedBinary`] - chunks accumulate; the finished payload
//!   is delivered as raw bytes
//! - [`PayloadMode::Streaming`] - nothing accumulates; the dispatcher forwards
//!   each chunk to the handler as it arrives
//!
//! ## Size bound
//!
//! Buffered modes enforce the route's maximum payload size with a strict
//! inequality: a chunk that would make the accumulated size *reach or exceed*
//! the bound is rejected whole and the exchange fails with
//! `PayloadTooLarge`. The buffer is never silently truncated. A bound of 0
//! means unbounded.

mod core;

pub use core::{FinalPayload, PayloadBuffer, PayloadMode, TextPayload};
