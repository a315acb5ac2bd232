use std::{
    collections::VecDeque,
    io::{self, Read},
};

/// A source over a fixed byte string that counts how often it is asked for
/// data and can cap how much each call returns.
#[derive(Debug, Clone)]
pub(crate) struct CountingSource {
    data: Vec<u8>,
    pos: usize,
    calls: usize,
    max_chunk: usize,
}

impl CountingSource {
    pub(crate) fn new(data: &[u8]) -> Self {
        Self::chunked(data, usize::MAX)
    }

    /// Like `new`, but no call returns more than `max_chunk` bytes.
    pub(crate) fn chunked(data: &[u8], max_chunk: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            calls: 0,
            max_chunk: max_chunk.max(1),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls
    }
}

impl Read for CountingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len()).min(self.max_chunk);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// A source that fails every read with the given kind.
#[derive(Debug)]
pub(crate) struct FailingSource(pub(crate) io::ErrorKind);

impl Read for FailingSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(self.0, "source failed"))
    }
}

/// A source that plays back a fixed sequence of chunks and errors, then
/// reports end of stream. A chunk larger than the caller's buffer is split
/// across calls.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    steps: VecDeque<io::Result<Vec<u8>>>,
}

impl ScriptedSource {
    pub(crate) fn chunk(mut self, bytes: &[u8]) -> Self {
        self.steps.push_back(Ok(bytes.to_vec()));
        self
    }

    pub(crate) fn error(mut self, kind: io::ErrorKind, msg: &'static str) -> Self {
        self.steps.push_back(Err(io::Error::new(kind, msg)));
        self
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(step) = self.steps.pop_front() else {
            return Ok(0);
        };
        let mut chunk = step?;
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.steps.push_front(Ok(chunk.split_off(n)));
        }
        Ok(n)
    }
}
