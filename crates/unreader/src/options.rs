/// Ring capacity used by [`ReaderOptions::default`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// Configuration for an [`Unreader`](crate::Unreader).
///
/// # Examples
///
/// ```rust
/// use unreader::{ReaderOptions, Unreader};
///
/// let options = ReaderOptions::with_capacity(64);
/// let reader = Unreader::with_options(options, &b"input"[..]).unwrap();
/// assert_eq!(reader.capacity(), 64);
/// ```
///
/// # Default
///
/// A ring of [`DEFAULT_CAPACITY`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderOptions {
    /// How many of the most recently read bytes the reader keeps around.
    ///
    /// This is the furthest an `unread` can ever reach back. Must be
    /// non-zero.
    ///
    /// # Default
    ///
    /// `4096`
    pub capacity: usize,
}

impl ReaderOptions {
    /// Options with the given ring capacity.
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
