//! Timeout utilities.
//!
//! One [`Deadline`] covers a whole expect call; every read inside the call
//! races against whatever time is left on it.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{Instant, Timeout, timeout};

/// A deadline tracker for operations with multiple steps.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    deadline: Instant,
}

impl Deadline {
    /// Create a new deadline from now.
    #[must_use]
    pub fn from_now(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    /// Check if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Get the remaining time until the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Apply this deadline to a future.
    pub fn apply<F: Future>(&self, future: F) -> Timeout<F> {
        timeout(self.remaining(), future)
    }
}

/// Outcome of one timed read attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The read returned this many bytes (never zero).
    Data(usize),
    /// The source reported end-of-stream.
    Eof,
    /// The source failed.
    Failed(io::Error),
    /// The deadline passed before the read completed.
    TimedOut,
}

/// Perform one read into `buf`, giving up when `deadline` passes.
///
/// A read that loses the race is dropped, not aborted: tokio reads are
/// cancel-safe, so no bytes are lost, and a [`BlockingReader`] keeps the
/// underlying blocking call running and hands its result to the next read.
/// `Interrupted` errors are retried.
///
/// An expired deadline is reported before reading, so a source that never
/// stops producing data cannot hold the caller past the deadline.
///
/// [`BlockingReader`]: crate::blocking::BlockingReader
pub async fn read_before<R>(reader: &mut R, buf: &mut [u8], deadline: &Deadline) -> ReadOutcome
where
    R: AsyncRead + Unpin + ?Sized,
{
    debug_assert!(!buf.is_empty(), "read_before needs room to read into");

    loop {
        if deadline.is_expired() {
            return ReadOutcome::TimedOut;
        }
        match deadline.apply(reader.read(buf)).await {
            Err(_) => return ReadOutcome::TimedOut,
            Ok(Ok(0)) => return ReadOutcome::Eof,
            Ok(Ok(n)) => return ReadOutcome::Data(n),
            Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
            Ok(Err(e)) => return ReadOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn deadline_remaining() {
        let deadline = Deadline::from_now(Duration::from_secs(10));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() > Duration::from_secs(9));
    }

    #[tokio::test]
    async fn read_before_returns_data() {
        let mut source: &[u8] = b"hello";
        let mut buf = [0u8; 16];
        let deadline = Deadline::from_now(Duration::from_secs(1));
        match read_before(&mut source, &mut buf, &deadline).await {
            ReadOutcome::Data(n) => assert_eq!(&buf[..n], b"hello"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            read_before(&mut source, &mut buf, &deadline).await,
            ReadOutcome::Eof
        ));
    }

    #[tokio::test]
    async fn read_before_times_out_on_silent_source() {
        let (mut driver, _target) = tokio::io::duplex(64);
        let mut buf = [0u8; 16];
        let deadline = Deadline::from_now(Duration::from_millis(50));
        assert!(matches!(
            read_before(&mut driver, &mut buf, &deadline).await,
            ReadOutcome::TimedOut
        ));
    }

    #[tokio::test]
    async fn timed_out_read_loses_nothing() {
        let (mut driver, mut target) = tokio::io::duplex(64);
        let mut buf = [0u8; 16];
        let expired = Deadline::from_now(Duration::from_millis(10));
        assert!(matches!(
            read_before(&mut driver, &mut buf, &expired).await,
            ReadOutcome::TimedOut
        ));

        target.write_all(b"late").await.unwrap();
        let deadline = Deadline::from_now(Duration::from_secs(1));
        match read_before(&mut driver, &mut buf, &deadline).await {
            ReadOutcome::Data(n) => assert_eq!(&buf[..n], b"late"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
