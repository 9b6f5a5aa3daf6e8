//! # Handler Module
//!
//! The four handler callback shapes and the continuation slot streaming
//! handlers persist state in.
//!
//! Handler shapes form an explicit closed set: one [`RouteHandler`] variant
//! per payload-handling mode, each carrying its own invocation contract and
//! its declared parameter arity. URL captures are
//! bound positionally: a handler registered against a pattern with N capture
//! groups declares arity N and receives exactly N ordered strings.

use std::any::Any;
use std::fmt;

use crate::payload::{PayloadMode, TextPayload};
use crate::request::Request;

/// Callback for routes that ignore the request body
pub type NoPayloadFn = dyn Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync;

/// Callback receiving the whole buffered payload as a text view
///
/// The view exposes the accumulated bytes verbatim; no encoding validation is
/// performed on the way in, and converting to `str` is the handler's choice.
pub type TextPayloadFn =
    dyn Fn(&mut Request, TextPayload<'_>, &[String]) -> anyhow::Result<()> + Send + Sync;

/// Callback receiving the whole buffered payload as raw bytes
pub type BinaryPayloadFn =
    dyn Fn(&mut Request, &[u8], &[String]) -> anyhow::Result<()> + Send + Sync;

/// Callback invoked once per body chunk, including a terminal zero-length call
///
/// Returns the number of bytes of the chunk it consumed. Leaving part of a
/// non-terminal chunk unconsumed fails the exchange — the dispatcher neither
/// retries nor drops leftover bytes.
pub type StreamingFn =
    dyn Fn(&mut Request, &[u8], &mut StreamState, &[String]) -> anyhow::Result<usize> + Send + Sync;

/// A registered handler callback, tagged by payload-handling mode
///
/// The variant decides both how body bytes reach the handler (see
/// [`PayloadMode`]) and the callback's invocation contract. The declared
/// arity is validated against the pattern's capture count at registration.
pub enum RouteHandler {
    /// Body is discarded; invoked once with the captures
    NoPayload {
        /// Declared extra-parameter count
        arity: usize,
        /// The user callback
        func: Box<NoPayloadFn>,
    },
    /// Body is buffered; invoked once with a verbatim text view plus captures
    Text {
        /// Declared extra-parameter count
        arity: usize,
        /// The user callback
        func: Box<TextPayloadFn>,
    },
    /// Body is buffered; invoked once with the payload bytes plus captures
    Binary {
        /// Declared extra-parameter count
        arity: usize,
        /// The user callback
        func: Box<BinaryPayloadFn>,
    },
    /// Invoked per chunk with the chunk, the continuation slot, and captures
    Streaming {
        /// Declared extra-parameter count
        arity: usize,
        /// The user callback
        func: Box<StreamingFn>,
    },
}

impl RouteHandler {
    /// Handler that never looks at the request body
    pub fn no_payload<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&mut Request, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        RouteHandler::NoPayload {
            arity,
            func: Box::new(func),
        }
    }

    /// Handler that receives the buffered payload as a verbatim text view
    pub fn text<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&mut Request, TextPayload<'_>, &[String]) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        RouteHandler::Text {
            arity,
            func: Box::new(func),
        }
    }

    /// Handler that receives the buffered payload as raw bytes
    pub fn binary<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&mut Request, &[u8], &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        RouteHandler::Binary {
            arity,
            func: Box::new(func),
        }
    }

    /// Handler invoked chunk by chunk with a per-exchange continuation slot
    pub fn streaming<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&mut Request, &[u8], &mut StreamState, &[String]) -> anyhow::Result<usize>
            + Send
            + Sync
            + 'static,
    {
        RouteHandler::Streaming {
            arity,
            func: Box::new(func),
        }
    }

    /// The payload-handling mode this handler shape implies
    #[inline]
    #[must_use]
    pub fn mode(&self) -> PayloadMode {
        match self {
            RouteHandler::NoPayload { .. } => PayloadMode::Ignore,
            RouteHandler::Text { .. } => PayloadMode::BufferedText,
            RouteHandler::Binary { .. } => PayloadMode::BufferedBinary,
            RouteHandler::Streaming { .. } => PayloadMode::Streaming,
        }
    }

    /// Declared extra-parameter arity
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            RouteHandler::NoPayload { arity, .. }
            | RouteHandler::Text { arity, .. }
            | RouteHandler::Binary { arity, .. }
            | RouteHandler::Streaming { arity, .. } => *arity,
        }
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler")
            .field("mode", &self.mode())
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

/// Type-erased per-exchange state for streaming handlers
///
/// Multiple exchanges may hit the same streaming route concurrently, so the
/// handler cannot keep chunk-to-chunk state in captured variables. Instead
/// each exchange owns one `StreamState` slot, created lazily on first use and
/// destroyed at the complete phase. The dispatcher passes the same slot to
/// every chunk invocation of one exchange.
#[derive(Default)]
pub struct StreamState {
    slot: Option<Box<dyn Any + Send>>,
}

impl StreamState {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the slot holds no state yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Get the state, initializing it on first use
    ///
    /// A streaming handler keeps a single state type per exchange. If the slot
    /// holds a value of a different type it is replaced by a freshly
    /// initialized one.
    pub fn get_or_insert_with<T, F>(&mut self, init: F) -> &mut T
    where
        T: Any + Send,
        F: FnOnce() -> T,
    {
        let needs_init = !matches!(&self.slot, Some(existing) if existing.is::<T>());
        if needs_init {
            self.slot = Some(Box::new(init()));
        }
        // The slot was just verified (or replaced) to hold a T.
        match self.slot.as_mut().and_then(|s| s.downcast_mut::<T>()) {
            Some(state) => state,
            None => unreachable!("stream state slot must hold the requested type"),
        }
    }

    /// Borrow the state if it holds a `T`
    #[must_use]
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.slot.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    /// Mutably borrow the state if it holds a `T`
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.slot.as_mut().and_then(|s| s.downcast_mut::<T>())
    }

    /// Take the state out of the slot, leaving it empty
    pub fn take<T: Any + Send>(&mut self) -> Option<T> {
        if self.get::<T>().is_some() {
            self.slot
                .take()
                .and_then(|s| s.downcast::<T>().ok())
                .map(|b| *b)
        } else {
            None
        }
    }

    /// Drop whatever the slot holds
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl fmt::Debug for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamState")
            .field("occupied", &self.slot.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_state_initializes_lazily() {
        let mut state = StreamState::new();
        assert!(state.is_empty());
        *state.get_or_insert_with(|| 0usize) += 5;
        *state.get_or_insert_with(|| 0usize) += 2;
        assert_eq!(state.get::<usize>(), Some(&7));
    }

    #[test]
    fn stream_state_take_and_clear() {
        let mut state = StreamState::new();
        state.get_or_insert_with(|| String::from("abc"));
        assert_eq!(state.take::<String>().as_deref(), Some("abc"));
        assert!(state.is_empty());

        state.get_or_insert_with(|| 1u32);
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn handler_shape_implies_mode_and_arity() {
        let h = RouteHandler::text(2, |_req, _payload, _params| Ok(()));
        assert_eq!(h.mode(), PayloadMode::BufferedText);
        assert_eq!(h.arity(), 2);
    }
}
