//! Async adapters over blocking `std::io` endpoints.
//!
//! Anonymous OS pipes and plain files offer no read timeout and no way to
//! cancel a blocked `read(2)`. [`BlockingReader`] moves the blocking call to
//! a dedicated worker thread and exposes it as [`AsyncRead`], so the session
//! can race it against a deadline.
//!
//! # Reads left in flight
//!
//! When the deadline wins, the worker is *not* stopped: it stays blocked in
//! `read` until the writer produces data or closes its end. Its result waits
//! in a single-slot channel and is delivered to the next read on the same
//! `BlockingReader`, so no bytes are lost between expect calls. If the
//! `BlockingReader` is dropped instead, the worker exits as soon as the
//! blocked read returns and the result is discarded. Sessions are meant to be
//! short-lived and test-scoped, which is what makes this thread leak
//! acceptable.

use std::io::{self, Read, Write};
use std::pin::Pin;
use std::sync::mpsc as std_mpsc;
use std::task::{Context, Poll, ready};
use std::thread;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::mpsc;

fn worker_gone() -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        "blocking I/O worker thread exited",
    )
}

/// [`AsyncRead`] over a blocking reader, serviced by a worker thread.
pub struct BlockingReader {
    /// Read requests: how many bytes the caller can accept.
    requests: std_mpsc::Sender<usize>,
    /// Results of completed reads, at most one pending.
    results: mpsc::Receiver<io::Result<Vec<u8>>>,
    /// A request was sent and its result not yet received.
    in_flight: bool,
    /// Bytes of the last result that did not fit the caller's buffer.
    spill: Vec<u8>,
    /// Read position in `spill`.
    spill_pos: usize,
}

impl BlockingReader {
    /// Spawn a worker thread that owns `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn new<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (requests, request_rx) = std_mpsc::channel();
        let (result_tx, results) = mpsc::channel(1);

        thread::Builder::new()
            .name("stream-expect-reader".into())
            .spawn(move || read_worker(reader, &request_rx, &result_tx))?;

        Ok(Self {
            requests,
            results,
            in_flight: false,
            spill: Vec::new(),
            spill_pos: 0,
        })
    }

    /// Whether a read is still running on the worker thread.
    ///
    /// True after a timed-out expect call until the blocked read completes
    /// and its result is picked up.
    #[must_use]
    pub const fn has_read_in_flight(&self) -> bool {
        self.in_flight
    }

    fn drain_spill(&mut self, buf: &mut ReadBuf<'_>) {
        let n = (self.spill.len() - self.spill_pos).min(buf.remaining());
        buf.put_slice(&self.spill[self.spill_pos..self.spill_pos + n]);
        self.spill_pos += n;
        if self.spill_pos == self.spill.len() {
            self.spill.clear();
            self.spill_pos = 0;
        }
    }
}

fn read_worker<R: Read>(
    mut reader: R,
    requests: &std_mpsc::Receiver<usize>,
    results: &mpsc::Sender<io::Result<Vec<u8>>>,
) {
    while let Ok(len) = requests.recv() {
        let mut buf = vec![0u8; len];
        let result = loop {
            match reader.read(&mut buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                other => break other,
            }
        };
        let result = result.map(|n| {
            buf.truncate(n);
            buf
        });
        if results.blocking_send(result).is_err() {
            break;
        }
    }
    tracing::trace!("blocking reader worker exiting");
}

impl AsyncRead for BlockingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }
        if !this.spill.is_empty() {
            this.drain_spill(buf);
            return Poll::Ready(Ok(()));
        }

        if !this.in_flight {
            this.requests
                .send(buf.remaining())
                .map_err(|_| worker_gone())?;
            this.in_flight = true;
        }

        let result = ready!(this.results.poll_recv(cx));
        this.in_flight = false;
        let data = result.ok_or_else(worker_gone)??;

        // A request issued by an earlier, larger read may return more than
        // fits; keep the rest for the next call.
        let n = data.len().min(buf.remaining());
        buf.put_slice(&data[..n]);
        if n < data.len() {
            this.spill = data;
            this.spill_pos = n;
        }
        Poll::Ready(Ok(()))
    }
}

impl Drop for BlockingReader {
    fn drop(&mut self) {
        if self.in_flight {
            tracing::debug!(
                "blocking reader dropped with a read in flight; \
                 its worker exits once the stream produces data or closes"
            );
        }
    }
}

impl std::fmt::Debug for BlockingReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingReader")
            .field("in_flight", &self.in_flight)
            .field("spilled", &(self.spill.len() - self.spill_pos))
            .finish()
    }
}

enum WriteOp {
    Write(Vec<u8>),
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Idle,
    Write,
    Flush,
}

/// [`AsyncWrite`] over a blocking writer, serviced by a worker thread.
///
/// A write is accepted as soon as it is handed to the worker; its outcome is
/// reported by the next write or flush. Dropping the writer lets the worker
/// finish the operation in flight and then closes the underlying writer.
pub struct BlockingWriter {
    requests: std_mpsc::Sender<WriteOp>,
    results: mpsc::Receiver<io::Result<()>>,
    in_flight: InFlight,
}

impl BlockingWriter {
    /// Spawn a worker thread that owns `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn new<W>(writer: W) -> io::Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (requests, request_rx) = std_mpsc::channel();
        let (result_tx, results) = mpsc::channel(1);

        thread::Builder::new()
            .name("stream-expect-writer".into())
            .spawn(move || write_worker(writer, &request_rx, &result_tx))?;

        Ok(Self {
            requests,
            results,
            in_flight: InFlight::Idle,
        })
    }

    fn submit(&mut self, op: WriteOp) -> io::Result<()> {
        let kind = match op {
            WriteOp::Write(_) => InFlight::Write,
            WriteOp::Flush => InFlight::Flush,
        };
        self.requests.send(op).map_err(|_| worker_gone())?;
        self.in_flight = kind;
        Ok(())
    }

    /// Wait for the operation in flight, if any.
    fn poll_complete(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.in_flight == InFlight::Idle {
            return Poll::Ready(Ok(()));
        }
        let result = ready!(self.results.poll_recv(cx));
        self.in_flight = InFlight::Idle;
        Poll::Ready(result.unwrap_or_else(|| Err(worker_gone())))
    }
}

fn write_worker<W: Write>(
    mut writer: W,
    requests: &std_mpsc::Receiver<WriteOp>,
    results: &mpsc::Sender<io::Result<()>>,
) {
    while let Ok(op) = requests.recv() {
        let result = match op {
            WriteOp::Write(data) => writer.write_all(&data),
            WriteOp::Flush => writer.flush(),
        };
        if results.blocking_send(result).is_err() {
            break;
        }
    }
    tracing::trace!("blocking writer worker exiting");
}

impl AsyncWrite for BlockingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_complete(cx))?;
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }
        this.submit(WriteOp::Write(buf.to_vec()))?;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            match this.in_flight {
                InFlight::Idle => this.submit(WriteOp::Flush)?,
                InFlight::Write => ready!(this.poll_complete(cx))?,
                InFlight::Flush => return this.poll_complete(cx),
            }
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_flush(cx)
    }
}

impl std::fmt::Debug for BlockingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingWriter")
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Yields its chunks one per read, sleeping before each.
    struct SlowReader {
        chunks: Vec<(Duration, &'static [u8])>,
    }

    impl Read for SlowReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let (delay, chunk) = self.chunks.remove(0);
            thread::sleep(delay);
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn reads_until_eof() {
        let mut reader = BlockingReader::new(&b"hello world"[..]).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello world");
    }

    #[tokio::test]
    async fn oversized_result_spills_into_next_read() {
        let mut reader = BlockingReader::new(SlowReader {
            chunks: vec![(Duration::from_millis(50), &b"abcdef"[..])],
        })
        .unwrap();
        let mut big = [0u8; 16];
        // Start a 16-byte read and abandon it before it can complete.
        let _ = tokio::time::timeout(Duration::ZERO, reader.read(&mut big)).await;

        let mut small = [0u8; 4];
        let n = reader.read(&mut small).await.unwrap();
        assert_eq!(&small[..n], b"abcd");
        let n = reader.read(&mut small).await.unwrap();
        assert_eq!(&small[..n], b"ef");
        assert_eq!(reader.read(&mut small).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn abandoned_read_result_is_delivered_later() {
        let mut reader = BlockingReader::new(SlowReader {
            chunks: vec![(Duration::from_millis(200), &b"late"[..])],
        })
        .unwrap();

        let mut buf = [0u8; 8];
        let first = tokio::time::timeout(Duration::from_millis(20), reader.read(&mut buf)).await;
        assert!(first.is_err());
        assert!(reader.has_read_in_flight());

        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"late");
        assert!(!reader.has_read_in_flight());
    }

    #[tokio::test]
    async fn writes_reach_the_sink_after_flush() {
        let sink = SharedSink::default();
        let mut writer = BlockingWriter::new(sink.clone()).unwrap();
        writer.write_all(b"hello ").await.unwrap();
        writer.write_all(b"world").await.unwrap();
        writer.flush().await.unwrap();
        assert_eq!(&*sink.0.lock().unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn write_error_surfaces_on_flush() {
        let mut writer = BlockingWriter::new(FailingSink).unwrap();
        writer.write_all(b"data").await.unwrap();
        let err = writer.flush().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
