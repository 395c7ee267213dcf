//! Append-only byte sink abstraction (component C1).
//!
//! A [`ByteSink`] is the writer engine's only I/O dependency: "append exactly
//! N bytes", nothing more. No buffering is guaranteed to the caller; an
//! implementation is free to buffer internally as long as `write_exact`
//! observes the bytes in order. `close` flushes and releases the underlying
//! resource.

use std::io;

use crate::{Error, Result};

/// An append-only binary sink. Implementations exist for files, pipes, and
/// anything else that implements [`std::io::Write`] (via [`IoSink`]), and
/// for in-memory buffers (via [`MemSink`]).
pub trait ByteSink {
    /// Writes all of `buf` to the sink, or fails. Partial writes are not
    /// observable by callers: either the whole buffer lands or an error is
    /// returned.
    fn write_exact(&mut self, buf: &[u8]) -> Result<()>;

    /// Flushes and releases the sink. No further writes are valid afterward.
    fn close(&mut self) -> Result<()>;
}

/// Adapts any [`std::io::Write`] (a file, a pipe, a `TcpStream`, ...) into a
/// [`ByteSink`].
pub struct IoSink<W> {
    inner: W,
}

impl<W: io::Write> IoSink<W> {
    /// Wraps `inner` as a byte sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: io::Write> ByteSink for IoSink<W> {
    fn write_exact(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf).map_err(Error::SinkIoError)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::SinkIoError)
    }
}

/// An in-memory byte sink backed by a growable `Vec<u8>`.
#[derive(Debug, Default)]
pub struct MemSink {
    buf: Vec<u8>,
}

impl MemSink {
    /// Creates an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the sink, returning the accumulated bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl ByteSink for MemSink {
    fn write_exact(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_sink_accumulates() {
        let mut sink = MemSink::new();
        sink.write_exact(&[1, 2, 3]).unwrap();
        sink.write_exact(&[4, 5]).unwrap();
        assert_eq!(sink.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn io_sink_writes_through() {
        let mut buf = Vec::new();
        {
            let mut sink = IoSink::new(&mut buf);
            sink.write_exact(b"hello").unwrap();
            sink.close().unwrap();
        }
        assert_eq!(buf, b"hello");
    }
}
