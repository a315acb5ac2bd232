use core::fmt;
use std::io::{self, Read};

use bstr::ByteSlice;

use crate::{
    circbuf::CircularBuffer,
    error::{RewindError, RewindLimit, UnreaderError},
    logger::{debug, trace, trace_enabled},
    options::ReaderOptions,
    rune::{RuneScratch, Step},
};

/// A reader that can rewind over the bytes it has recently returned.
///
/// Positions are counted in bytes since the start of the stream. `fetched`
/// is how far the source has been read; `cursor` is the next byte handed to
/// the caller. The gap between them is the *pending* region: bytes that were
/// unread and will be replayed from the ring before the source is touched
/// again.
///
/// Invariants: `cursor <= fetched`, and the pending region never exceeds
/// either the ring capacity or the bytes the ring has ever recorded.
pub struct Unreader<R> {
    source: R,
    buffer: CircularBuffer,
    fetched: u64,
    cursor: u64,
    scratch: RuneScratch,
}

impl<R> Unreader<R> {
    /// Wraps `source`, remembering up to `capacity` recently read bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UnreaderError::Configuration`] if the ring rejects
    /// `capacity`.
    pub fn new(capacity: usize, source: R) -> Result<Self, UnreaderError> {
        Self::with_options(ReaderOptions::with_capacity(capacity), source)
    }

    /// Wraps `source` using `options`.
    ///
    /// # Errors
    ///
    /// Returns [`UnreaderError::Configuration`] if the ring rejects the
    /// configured capacity.
    pub fn with_options(options: ReaderOptions, source: R) -> Result<Self, UnreaderError> {
        let buffer = CircularBuffer::new(options.capacity)?;
        Ok(Self {
            source,
            buffer,
            fetched: 0,
            cursor: 0,
            scratch: RuneScratch::default(),
        })
    }

    /// Moves the cursor back by `count` bytes so they are read again.
    ///
    /// Only the cursor moves; the source is not consulted and nothing is
    /// fetched. `unread(0)` always succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`UnreaderError::RewindRange`] if the bytes between the new
    /// cursor and the fetch position were never read, or do not fit in the
    /// ring. The reader is unchanged in that case.
    pub fn unread(&mut self, count: usize) -> Result<(), UnreaderError> {
        let span = self.pending().checked_add(count as u64);
        let limit = match span {
            Some(span) if span > self.buffer.total_written() => Some(RewindLimit::NeverWritten),
            Some(span) if span > self.buffer.size() as u64 => Some(RewindLimit::Capacity),
            Some(_) => None,
            None => Some(RewindLimit::NeverWritten),
        };

        if let Some(limit) = limit {
            let err = RewindError {
                requested: count,
                cursor: self.cursor,
                pending: self.pending(),
                retained: self.buffer.total_written(),
                capacity: self.buffer.size(),
                limit,
            };
            debug!("rejected rewind: {err}");
            return Err(err.into());
        }

        // `span <= total_written == fetched`, so `count <= cursor`.
        self.cursor -= count as u64;
        Ok(())
    }

    /// The up to `n` bytes consumed immediately before the cursor.
    ///
    /// Returns fewer bytes when the ring holds fewer than `n` bytes ahead of
    /// the pending region. Never moves the cursor.
    #[must_use]
    pub fn last_bytes(&self, n: usize) -> &[u8] {
        let window = self.buffer.bytes();
        let end = window.len() - self.pending_len();
        &window[end.saturating_sub(n)..end]
    }

    /// Everything the ring currently retains, including pending bytes.
    ///
    /// This is the furthest an unread could reach if nothing were pending.
    #[must_use]
    pub fn window(&self) -> &[u8] {
        self.buffer.bytes()
    }

    /// Total bytes pulled from the source so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.fetched
    }

    /// Stream position of the next byte to be returned.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Bytes that were unread and will be replayed before the source is read
    /// again.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.fetched - self.cursor
    }

    /// Capacity of the ring, i.e. the furthest an unread can reach.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.size()
    }

    /// Gets a reference to the wrapped source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Gets a mutable reference to the wrapped source.
    ///
    /// Reading from it directly bypasses the ring, so those bytes can never
    /// be unread.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Unwraps this reader, returning the source. Pending bytes are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pending_len(&self) -> usize {
        // Bounded by the ring capacity, which is a usize.
        self.pending() as usize
    }

    fn replay(&mut self, buf: &mut [u8]) -> usize {
        let window = self.buffer.bytes();
        let pending = &window[window.len() - self.pending_len()..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.cursor += n as u64;
        trace!(
            "replayed {n} bytes, cursor {} with {} pending",
            self.cursor,
            self.pending()
        );
        n
    }
}

impl<R: Read> Unreader<R> {
    fn fetch(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read(buf)?;
        self.buffer.write(&buf[..n]);
        self.fetched += n as u64;
        self.cursor += n as u64;
        trace!(
            "fetched {n} of {} requested bytes, {} total",
            buf.len(),
            self.fetched
        );
        Ok(n)
    }

    /// Reads one UTF-8 encoded scalar, returning it with its encoded length.
    ///
    /// Bytes are pulled one at a time through [`Read::read`], so pending
    /// bytes are replayed first. Exactly `len` bytes are consumed, and
    /// `unread(len)` puts them all back.
    ///
    /// A malformed sequence decodes to U+FFFD with the length of its longest
    /// invalid prefix, the same substitution [`String::from_utf8_lossy`]
    /// makes. Returns `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Errors from the source are returned as-is and abandon the partial
    /// scalar. A stream that ends inside a multi-byte sequence yields
    /// [`io::ErrorKind::UnexpectedEof`]; the partial bytes stay consumed.
    pub fn read_rune(&mut self) -> io::Result<Option<(char, usize)>> {
        self.scratch.reset();
        loop {
            let mut byte = [0u8; 1];
            if self.read(&mut byte)? == 0 {
                if self.scratch.is_empty() {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a UTF-8 sequence",
                ));
            }

            match self.scratch.push(byte[0]) {
                Step::NeedMore => {}
                Step::Done(ch) => return Ok(Some((ch, ch.len_utf8()))),
                Step::Reject(len) => {
                    // The byte that exposed the error may start the next
                    // scalar; give it back.
                    let surplus = self.scratch.len() - len;
                    if surplus > 0 {
                        self.unread(surplus)?;
                    }
                    if trace_enabled() {
                        trace!("replaced {len} invalid bytes at {}", self.cursor - len as u64);
                    }
                    return Ok(Some((char::REPLACEMENT_CHARACTER, len)));
                }
            }
        }
    }

    /// An iterator over the scalars of the remaining stream.
    pub fn runes(&mut self) -> Runes<'_, R> {
        Runes { reader: self }
    }
}

impl<R: Read> Read for Unreader<R> {
    /// Serves pending bytes from the ring if there are any, otherwise reads
    /// the source once and records what it returned.
    ///
    /// A single call never mixes the two, so it may return fewer bytes than
    /// both together could provide.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.cursor == self.fetched {
            self.fetch(buf)
        } else {
            Ok(self.replay(buf))
        }
    }
}

impl<R> fmt::Debug for Unreader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unreader")
            .field("fetched", &self.fetched)
            .field("cursor", &self.cursor)
            .field("capacity", &self.buffer.size())
            .field("window", &self.window().as_bstr())
            .finish()
    }
}

/// Iterator over the scalars of an [`Unreader`], created by
/// [`Unreader::runes`].
///
/// Yields `(char, len)` pairs until the end of the stream.
pub struct Runes<'a, R> {
    reader: &'a mut Unreader<R>,
}

impl<R: Read> Iterator for Runes<'_, R> {
    type Item = io::Result<(char, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_rune().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::tests::utils::CountingSource;

    fn reader(capacity: usize, data: &[u8]) -> Unreader<CountingSource> {
        Unreader::new(capacity, CountingSource::new(data)).unwrap()
    }

    fn read_n<R: Read>(r: &mut Unreader<R>, n: usize) -> Vec<u8> {
        let mut buf = vec![0; n];
        let got = r.read(&mut buf).unwrap();
        buf.truncate(got);
        buf
    }

    #[test]
    fn empty_read_skips_source() {
        let mut r = reader(4, b"abc");
        assert_eq!(r.read(&mut []).unwrap(), 0);
        assert_eq!(r.get_ref().calls(), 0);
    }

    #[test]
    fn zero_capacity_is_a_configuration_error() {
        let err = Unreader::new(0, CountingSource::new(b"")).unwrap_err();
        assert!(matches!(err, UnreaderError::Configuration(_)));
    }

    #[test]
    fn replay_does_not_mix_with_fetch() {
        let mut r = reader(8, b"abcdef");
        assert_eq!(read_n(&mut r, 3), b"abc");
        r.unread(2).unwrap();
        // Only the two pending bytes come back, even though more were asked.
        assert_eq!(read_n(&mut r, 4), b"bc");
        assert_eq!(read_n(&mut r, 4), b"def");
    }

    #[test]
    fn unread_rejects_without_mutating() {
        let mut r = reader(8, b"abc");
        read_n(&mut r, 3);
        let err = r.unread(4).unwrap_err();
        let UnreaderError::RewindRange(err) = err else {
            panic!("expected a rewind error, got {err:?}");
        };
        assert_eq!(err.limit, RewindLimit::NeverWritten);
        assert_eq!(r.cursor(), 3);
        assert_eq!(r.bytes_read(), 3);
    }

    #[test]
    fn unread_stacks_up_to_capacity() {
        let mut r = reader(4, b"abcdef");
        assert_eq!(read_n(&mut r, 6), b"abcdef");
        r.unread(3).unwrap();
        r.unread(1).unwrap();
        assert_eq!(r.pending(), 4);
        let err = r.unread(1).unwrap_err();
        assert!(matches!(
            err,
            UnreaderError::RewindRange(RewindError {
                limit: RewindLimit::Capacity,
                ..
            })
        ));
        assert_eq!(read_n(&mut r, 8), b"cdef");
    }

    #[test]
    fn huge_unread_does_not_overflow() {
        let mut r = reader(4, b"ab");
        read_n(&mut r, 2);
        r.unread(1).unwrap();
        assert!(r.unread(usize::MAX).is_err());
        assert_eq!(r.cursor(), 1);
    }

    #[test]
    fn last_bytes_stops_at_pending_boundary() {
        let mut r = reader(8, b"abcdef");
        read_n(&mut r, 6);
        r.unread(2).unwrap();
        assert_eq!(r.last_bytes(3), b"bcd");
        assert_eq!(r.last_bytes(100), b"abcd");
        assert_eq!(r.last_bytes(0), b"");
        assert_eq!(r.window(), b"abcdef");
    }

    #[test]
    fn last_bytes_limited_by_ring() {
        let mut r = reader(4, b"abcdefgh");
        read_n(&mut r, 8);
        assert_eq!(r.last_bytes(6), b"efgh");
        r.unread(1).unwrap();
        assert_eq!(r.last_bytes(6), b"efg");
    }

    #[test]
    fn read_rune_consumes_encoded_length() {
        let mut r = reader(8, "aé€𝄞".as_bytes());
        assert_eq!(r.read_rune().unwrap(), Some(('a', 1)));
        assert_eq!(r.read_rune().unwrap(), Some(('é', 2)));
        assert_eq!(r.read_rune().unwrap(), Some(('€', 3)));
        assert_eq!(r.cursor(), 6);
        assert_eq!(r.read_rune().unwrap(), Some(('𝄞', 4)));
        assert_eq!(r.read_rune().unwrap(), None);
    }

    #[test]
    fn read_rune_gives_back_lookahead_byte() {
        // 0xE2 0x82 starts "€" but 'x' cuts it short.
        let mut r = reader(8, b"\xE2\x82x");
        assert_eq!(r.read_rune().unwrap(), Some(('\u{FFFD}', 2)));
        assert_eq!(r.cursor(), 2);
        assert_eq!(r.read_rune().unwrap(), Some(('x', 1)));
    }

    #[test]
    fn read_rune_lookahead_fits_single_byte_ring() {
        let mut r = reader(1, b"\xC3A");
        assert_eq!(r.read_rune().unwrap(), Some(('\u{FFFD}', 1)));
        assert_eq!(r.read_rune().unwrap(), Some(('A', 1)));
    }

    #[test]
    fn read_rune_truncated_at_eof() {
        let mut r = reader(8, b"\xF0\x9F");
        let err = r.read_rune().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(r.cursor(), 2);
        // The scratch starts fresh: the stream is simply over now.
        assert_eq!(r.read_rune().unwrap(), None);
    }

    #[test]
    fn runes_iterates_until_eof() {
        let mut r = reader(4, "héllo".as_bytes());
        let text: String = r.runes().map(|rune| rune.unwrap().0).collect();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn into_inner_returns_source() {
        let mut r = reader(4, b"abc");
        read_n(&mut r, 1);
        let source = r.into_inner();
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn debug_shows_counters() {
        let mut r = reader(16, b"hello");
        read_n(&mut r, 5);
        r.unread(2).unwrap();
        insta::assert_snapshot!(
            format!("{r:?}"),
            @r#"Unreader { fetched: 5, cursor: 3, capacity: 16, window: "hello" }"#
        );
    }
}
