use core::fmt;
use std::io;

use thiserror::Error;

/// A ring capacity that [`CircularBuffer::new`](crate::CircularBuffer::new)
/// refuses.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// The ring must be able to hold at least one byte.
    #[error("buffer capacity must be greater than zero")]
    Zero,
    /// The ring is backed by `2 * capacity` bytes, which must fit in memory.
    #[error("buffer capacity {requested} exceeds the maximum of {max} bytes")]
    TooLarge {
        /// Capacity asked for.
        requested: usize,
        /// Largest capacity accepted.
        max: usize,
    },
}

/// Which bound an [`Unreader::unread`](crate::Unreader::unread) call crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewindLimit {
    /// The rewind reaches bytes that were never read, i.e. before the start
    /// of the stream.
    NeverWritten,
    /// The rewind reaches bytes the ring can no longer hold.
    Capacity,
}

impl fmt::Display for RewindLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewindLimit::NeverWritten => f.write_str("more than was ever read"),
            RewindLimit::Capacity => f.write_str("more than the buffer can hold"),
        }
    }
}

/// A rewind that would replay bytes the reader no longer has.
///
/// Returned before any state changes, so the caller may retry with a
/// smaller distance.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "cannot unread {requested} bytes at cursor {cursor} with {pending} pending: {limit} \
     ({retained} read, capacity {capacity})"
)]
pub struct RewindError {
    /// Distance passed to `unread`.
    pub requested: usize,
    /// Cursor at the time of the call.
    pub cursor: u64,
    /// Bytes already unread and awaiting replay.
    pub pending: u64,
    /// Total bytes ever recorded by the ring.
    pub retained: u64,
    /// Capacity of the ring.
    pub capacity: usize,
    /// The bound that was crossed.
    pub limit: RewindLimit,
}

/// Errors produced by the reader itself.
///
/// Errors from the wrapped source are never wrapped in this type; `read` and
/// `read_rune` hand them back untouched as [`std::io::Error`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreaderError {
    /// The reader could not be built.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] CapacityError),
    /// An unread reached past what the ring retains.
    #[error("rewind out of range: {0}")]
    RewindRange(#[from] RewindError),
}

impl From<UnreaderError> for io::Error {
    fn from(err: UnreaderError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}
