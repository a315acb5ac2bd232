#![no_main]
use std::io::{self, Read};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use unreader::Unreader;

#[derive(Debug, Arbitrary)]
enum Op {
    Read(u8),
    Unread(u8),
    Rune,
    LastBytes(u8),
}

#[derive(Debug, Arbitrary)]
struct Script {
    capacity: u8,
    chunk_seed: u64,
    data: Vec<u8>,
    ops: Vec<Op>,
}

/// Hands out `data` in randomly sized pieces, one to `max` bytes per call.
struct ChunkedSource<'a> {
    data: &'a [u8],
    rng: SmallRng,
    max: usize,
}

impl Read for ChunkedSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = self.rng.random_range(1..=self.max);
        let n = want.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn run(script: Script) {
    let capacity = usize::from(script.capacity) + 1;
    let data = &script.data[..];
    let source = ChunkedSource {
        data,
        rng: SmallRng::seed_from_u64(script.chunk_seed),
        max: 1 + (script.chunk_seed % 32) as usize,
    };
    let mut reader = Unreader::new(capacity, source).unwrap();

    for op in script.ops {
        let cursor = reader.cursor() as usize;
        let fetched = reader.bytes_read() as usize;
        let pending = fetched - cursor;

        match op {
            Op::Read(n) => {
                let mut buf = vec![0; usize::from(n)];
                let got = reader.read(&mut buf).unwrap();
                assert_eq!(&buf[..got], &data[cursor..cursor + got]);
                if pending > 0 {
                    assert!(got <= pending, "replay mixed with a fresh fetch");
                    assert_eq!(reader.bytes_read() as usize, fetched);
                }
            }
            Op::Unread(n) => {
                let n = usize::from(n);
                let allowed = pending + n <= fetched.min(capacity);
                assert_eq!(reader.unread(n).is_ok(), allowed);
                let expected = if allowed { cursor - n } else { cursor };
                assert_eq!(reader.cursor() as usize, expected);
                assert_eq!(reader.bytes_read() as usize, fetched);
            }
            Op::Rune => match reader.read_rune() {
                Ok(Some((ch, len))) => {
                    let consumed = &data[cursor..cursor + len];
                    assert_eq!(reader.cursor() as usize, cursor + len);
                    let lossy = String::from_utf8_lossy(consumed);
                    assert_eq!(lossy.chars().next(), Some(ch));
                    assert_eq!(lossy.chars().count(), 1);
                }
                Ok(None) => assert_eq!(cursor, data.len()),
                Err(e) => {
                    assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
                    assert_eq!(reader.cursor() as usize, data.len());
                }
            },
            Op::LastBytes(n) => {
                let n = usize::from(n);
                let available = fetched.min(capacity) - pending;
                let expected = &data[cursor - n.min(available)..cursor];
                assert_eq!(reader.last_bytes(n), expected);
                assert_eq!(reader.cursor() as usize, cursor);
            }
        }

        assert!(reader.cursor() <= reader.bytes_read());
        assert!(reader.pending() as usize <= capacity);
    }
}

fuzz_target!(|script: Script| run(script));
