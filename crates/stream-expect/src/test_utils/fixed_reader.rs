//! Reader that never returns more than a fixed number of bytes per read.

use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};

/// Wraps a reader so each read yields at most `chunk` bytes.
///
/// Useful to show that matching does not depend on how the output is split
/// across reads. Works as both [`Read`] and [`AsyncRead`].
#[derive(Debug)]
pub struct FixedReader<R> {
    inner: R,
    chunk: usize,
    scratch: Vec<u8>,
}

impl<R> FixedReader<R> {
    /// Create a reader returning at most `chunk` bytes per read.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    #[must_use]
    pub fn new(inner: R, chunk: usize) -> Self {
        assert!(chunk > 0, "FixedReader chunk size must be positive");
        Self {
            inner,
            chunk,
            scratch: vec![0; chunk],
        }
    }

    /// Reader yielding one byte per read.
    #[must_use]
    pub fn one_byte(inner: R) -> Self {
        Self::new(inner, 1)
    }

    /// Take the wrapped reader back.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for FixedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = self.chunk.min(buf.len());
        self.inner.read(&mut buf[..limit])
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for FixedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let limit = this.chunk.min(buf.remaining());
        let mut limited = ReadBuf::new(&mut this.scratch[..limit]);
        ready!(Pin::new(&mut this.inner).poll_read(cx, &mut limited))?;
        buf.put_slice(limited.filled());
        Poll::Ready(Ok(()))
    }
}
