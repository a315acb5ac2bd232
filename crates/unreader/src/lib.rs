//! A reader that can take back what it has handed out.
//!
//! [`Unreader`] wraps any [`std::io::Read`] and remembers the most recent
//! bytes it delivered in a fixed-size ring. A lexer can read ahead, decide it
//! went too far, and [`unread`](Unreader::unread) the surplus. The following
//! reads replay those bytes from the ring without asking the source again.
//!
//! ```rust
//! use std::io::Read;
//! use unreader::Unreader;
//!
//! let mut reader = Unreader::new(16, "hello world".as_bytes()).unwrap();
//!
//! let mut word = [0; 5];
//! reader.read_exact(&mut word).unwrap();
//! assert_eq!(&word, b"hello");
//!
//! // Put the word back and read it again.
//! reader.unread(5).unwrap();
//! let mut again = [0; 5];
//! reader.read_exact(&mut again).unwrap();
//! assert_eq!(&again, b"hello");
//! assert_eq!(reader.last_bytes(3), b"llo");
//! ```
//!
//! Rewinding is bounded by the ring: you can never unread more bytes than
//! its capacity, nor more than were ever read.
//!
//! ```rust
//! use std::io::Read;
//! use unreader::{Unreader, UnreaderError};
//!
//! let mut reader = Unreader::new(4, &b"abcdef"[..]).unwrap();
//! let mut buf = [0; 5];
//! reader.read_exact(&mut buf).unwrap();
//!
//! assert!(matches!(reader.unread(5), Err(UnreaderError::RewindRange(_))));
//! assert_eq!(reader.cursor(), 5);
//! ```

pub mod circbuf;
mod error;
mod logger;
mod options;
mod reader;
mod rune;

#[cfg(test)]
mod tests;

pub use circbuf::CircularBuffer;
pub use error::{CapacityError, RewindError, RewindLimit, UnreaderError};
pub use options::{DEFAULT_CAPACITY, ReaderOptions};
pub use reader::{Runes, Unreader};
pub use rune::MAX_RUNE_LEN;
