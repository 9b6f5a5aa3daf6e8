//! Payload core - accumulation state and the strict size bound.

use tracing::{debug, warn};

use crate::error::DispatchError;

/// How a route wants request body bytes handled before invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Body bytes are discarded unread; the size bound is not enforced
    Ignore,
    /// Body bytes accumulate and are delivered as a verbatim text view on finish
    BufferedText,
    /// Body bytes accumulate and are delivered as raw bytes on finish
    BufferedBinary,
    /// Body bytes are forwarded to the handler chunk by chunk, unbuffered
    Streaming,
}

impl PayloadMode {
    /// Whether this mode accumulates bytes into the request buffer
    #[inline]
    #[must_use]
    pub fn is_buffered(self) -> bool {
        matches!(self, PayloadMode::BufferedText | PayloadMode::BufferedBinary)
    }
}

impl std::fmt::Display for PayloadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayloadMode::Ignore => "ignore",
            PayloadMode::BufferedText => "buffered_text",
            PayloadMode::BufferedBinary => "buffered_binary",
            PayloadMode::Streaming => "streaming",
        };
        f.write_str(s)
    }
}

/// The finished payload delivered at final invocation
#[derive(Debug, PartialEq, Eq)]
pub enum FinalPayload {
    /// `Ignore` and `Streaming` routes have nothing left to deliver
    None,
    /// Accumulated bytes for a `BufferedText` route, exposed verbatim
    ///
    /// No encoding validation is performed during accumulation; the dispatcher
    /// wraps the bytes in a [`TextPayload`] view at invocation time.
    Text(Vec<u8>),
    /// Accumulated bytes for a `BufferedBinary` route
    Binary(Vec<u8>),
}

/// Borrowed view over a finished `BufferedText` payload
///
/// The accumulated bytes are exposed verbatim — no encoding validation is
/// performed and no byte is ever rewritten. [`TextPayload::as_str`] succeeds
/// only when the bytes happen to be valid UTF-8; [`TextPayload::to_string_lossy`]
/// is the replacement-character convenience for handlers that want a `str`
/// regardless.
#[derive(Debug, Clone, Copy)]
pub struct TextPayload<'a> {
    bytes: &'a [u8],
}

impl<'a> TextPayload<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The payload bytes exactly as fed by the transport
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the body was empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The payload as `&str`, if it is valid UTF-8
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    /// The payload as a string, replacing invalid UTF-8 sequences
    ///
    /// Only this view is lossy; [`TextPayload::as_bytes`] always has the
    /// original bytes.
    #[must_use]
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

impl std::fmt::Display for TextPayload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Per-request payload accumulation state
///
/// Embedded in the exchange's request state; created at begin with the matched
/// route's mode and bound, consumed by `finish` on the terminal chunk.
///
/// Invariant: in buffered modes the accumulated size stays strictly below the
/// bound. The first chunk that would break that invariant fails the exchange;
/// nothing is appended on the failure path.
#[derive(Debug)]
pub struct PayloadBuffer {
    mode: PayloadMode,
    /// Maximum payload size in bytes; 0 = unbounded
    max_size: usize,
    data: Vec<u8>,
}

impl PayloadBuffer {
    /// Create an empty accumulator for one exchange
    #[must_use]
    pub fn new(mode: PayloadMode, max_size: usize) -> Self {
        Self {
            mode,
            max_size,
            data: Vec::new(),
        }
    }

    /// The mode this accumulator was created with
    #[inline]
    #[must_use]
    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Bytes accumulated so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been accumulated yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Feed one non-terminal body chunk
    ///
    /// `Ignore` discards the chunk without inspecting it and always succeeds.
    /// Buffered modes append under the strict size bound. `Streaming` chunks
    /// never reach the accumulator — the dispatcher forwards them directly to
    /// the handler.
    ///
    /// # Errors
    ///
    /// [`DispatchError::PayloadTooLarge`] when appending the chunk would make
    /// the accumulated size reach or exceed the bound.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), DispatchError> {
        match self.mode {
            PayloadMode::Ignore | PayloadMode::Streaming => Ok(()),
            PayloadMode::BufferedText | PayloadMode::BufferedBinary => {
                let attempted = self.data.len() + chunk.len();
                if self.max_size > 0 && attempted >= self.max_size {
                    warn!(
                        limit = self.max_size,
                        attempted = attempted,
                        mode = %self.mode,
                        "Payload size bound exceeded"
                    );
                    return Err(DispatchError::PayloadTooLarge {
                        limit: self.max_size,
                        attempted,
                    });
                }
                self.data.extend_from_slice(chunk);
                debug!(
                    chunk_len = chunk.len(),
                    accumulated = self.data.len(),
                    mode = %self.mode,
                    "Body chunk buffered"
                );
                Ok(())
            }
        }
    }

    /// Consume the accumulator on the terminal zero-length chunk
    #[must_use]
    pub fn finish(self) -> FinalPayload {
        match self.mode {
            PayloadMode::Ignore | PayloadMode::Streaming => FinalPayload::None,
            PayloadMode::BufferedText => FinalPayload::Text(self.data),
            PayloadMode::BufferedBinary => FinalPayload::Binary(self.data),
        }
    }
}
