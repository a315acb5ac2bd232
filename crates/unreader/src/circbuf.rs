//! Fixed-capacity byte ring that remembers the most recent writes.
//!
//! Every byte is stored twice, at `i` and `i + capacity`, so the retained
//! window is always one contiguous slice of the backing store no matter where
//! the write head sits. Writes beyond capacity silently drop the oldest bytes.

use core::fmt;

use bstr::ByteSlice;

use crate::error::CapacityError;

/// Largest capacity [`CircularBuffer::new`] accepts. The mirrored backing
/// store of `2 * capacity` bytes must not exceed `isize::MAX`.
pub const MAX_CAPACITY: usize = isize::MAX.unsigned_abs() / 2;

/// A ring of the last `size()` bytes written, plus a lifetime write count.
#[derive(Clone)]
pub struct CircularBuffer {
    /// Mirrored storage, `2 * capacity` bytes.
    data: Box<[u8]>,
    capacity: usize,
    /// Index in `0..capacity` where the next byte lands.
    head: usize,
    /// Retained bytes, `<= capacity`.
    len: usize,
    total_written: u64,
}

impl CircularBuffer {
    /// Creates an empty ring holding at most `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero or above
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError::Zero);
        }
        if capacity > MAX_CAPACITY {
            return Err(CapacityError::TooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(Self {
            data: vec![0; capacity * 2].into_boxed_slice(),
            capacity,
            head: 0,
            len: 0,
            total_written: 0,
        })
    }

    /// Appends `bytes`, overwriting the oldest retained bytes once full.
    pub fn write(&mut self, bytes: &[u8]) {
        self.total_written += bytes.len() as u64;

        // Only the trailing `capacity` bytes can survive this write.
        let tail = &bytes[bytes.len().saturating_sub(self.capacity)..];
        let cap = self.capacity;

        let first = tail.len().min(cap - self.head);
        let (front, wrapped) = tail.split_at(first);
        self.data[self.head..self.head + first].copy_from_slice(front);
        self.data[self.head + cap..self.head + cap + first].copy_from_slice(front);
        self.data[..wrapped.len()].copy_from_slice(wrapped);
        self.data[cap..cap + wrapped.len()].copy_from_slice(wrapped);

        self.head = (self.head + tail.len()) % cap;
        self.len = (self.len + tail.len()).min(cap);
    }

    /// The retained window, oldest byte first.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        let start = (self.head + self.capacity - self.len) % self.capacity;
        &self.data[start..start + self.len]
    }

    /// Capacity fixed at construction.
    #[must_use]
    pub fn size(&self) -> usize {
        self.capacity
    }

    /// Every byte ever passed to [`write`](Self::write), overwritten or not.
    #[must_use]
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of bytes currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True until the first non-empty write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for CircularBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularBuffer")
            .field("capacity", &self.capacity)
            .field("total_written", &self.total_written)
            .field("window", &self.bytes().as_bstr())
            .finish()
    }
}
