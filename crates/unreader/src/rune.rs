//! Incremental single-scalar UTF-8 decoding, one byte at a time.

/// Longest UTF-8 encoding of a single scalar value.
pub const MAX_RUNE_LEN: usize = 4;

/// What happened after feeding one more byte into the scratch?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// A valid prefix, not finished yet.
    NeedMore,
    /// The bytes so far encode exactly this scalar.
    Done(char),
    /// The first `n` bytes of the scratch can never start a valid scalar.
    /// Any bytes after them belong to whatever comes next.
    Reject(usize),
}

/// Bytes of the scalar being decoded. Owned by one reader and cleared at
/// the start of every decode, so a failed decode leaves nothing behind.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RuneScratch {
    buf: [u8; MAX_RUNE_LEN],
    len: usize,
}

impl RuneScratch {
    pub(crate) fn reset(&mut self) {
        self.len = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `byte` and classifies everything pushed since the last reset.
    pub(crate) fn push(&mut self, byte: u8) -> Step {
        debug_assert!(self.len < MAX_RUNE_LEN, "push after a finished decode");
        self.buf[self.len] = byte;
        self.len += 1;
        classify(&self.buf[..self.len])
    }
}

/// Classifies a byte sequence that holds no complete scalar except possibly
/// as a whole. The completion check and the decode look at the same bytes.
fn classify(bytes: &[u8]) -> Step {
    match core::str::from_utf8(bytes) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Step::Done(ch),
            None => Step::NeedMore,
        },
        Err(err) => {
            // Decoding stops at the first complete scalar, so nothing valid
            // can precede the error.
            debug_assert_eq!(err.valid_up_to(), 0);
            match err.error_len() {
                Some(n) => Step::Reject(n),
                None if bytes.len() < MAX_RUNE_LEN => Step::NeedMore,
                None => Step::Reject(bytes.len()),
            }
        }
    }
}
