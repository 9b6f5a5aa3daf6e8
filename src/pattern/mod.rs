//! # Pattern Module
//!
//! Compiles path templates into anchored, matchable patterns and extracts
//! ordered capture strings from concrete request paths.
//!
//! ## Template dialects
//!
//! Two dialects are accepted, detected at compile time:
//!
//! - **Placeholder templates** - paths like `/users/{id}` where each `{name}`
//!   segment becomes one capturing group matching a single path segment.
//!   Literal segments match themselves exactly.
//! - **Raw regex** - any template without a `{name}` placeholder is treated
//!   as a regex body, e.g. `/users/(\d+)` or `/orders/(\d{4})`. Capturing
//!   groups become captures in left-to-right order; `(?:...)` groups capture
//!   nothing. Counted repetitions like `{4}` do not select the placeholder
//!   dialect because placeholder names start with a letter or underscore.
//!
//! ## Matching semantics
//!
//! Matching is anchored: the whole path string must match the pattern.
//! Partial and prefix matches are rejected. Compilation happens once, at
//! registration time; per-request matching reuses the compiled regex.
//!
//! ## Example
//!
//! ```rust
//! use routecore::pattern::PathPattern;
//!
//! let pattern = PathPattern::compile("/pets/{id}").unwrap();
//! assert_eq!(pattern.capture_count(), 1);
//!
//! let captures = pattern.match_path("/pets/123").unwrap();
//! assert_eq!(&captures[0], "123");
//! assert!(pattern.match_path("/pets/123/toys").is_none());
//! ```

mod core;

pub use core::{CaptureVec, PathPattern, MAX_INLINE_CAPTURES};
