//! Session handle for scripting a program over a stream pair.
//!
//! This module provides the main `Session` type: it reads the target's
//! output until a pattern matches and writes input back to it.

use std::time::Duration;

use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::config::ExpectConfig;
use crate::error::{ExpectError, Result};
use crate::expect::{MatchBuffer, Matcher};
use crate::types::Match;
use crate::util::{Deadline, ReadOutcome, read_before};

/// One scripted interaction over a reader/writer pair.
///
/// `R` is the stream the target writes its output to; `W` is the stream the
/// target reads its input from. The session does not own the target and
/// never spawns anything: it is handed already-connected endpoints.
///
/// A session is driven from one task at a time; calls are strictly ordered.
pub struct Session<R, W> {
    /// Target output.
    reader: R,
    /// Target input.
    writer: W,
    /// Session configuration.
    config: ExpectConfig,
    /// Bytes read but not yet consumed by a match.
    buffer: MatchBuffer,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a session over `reader` and `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Config`] if the configuration is invalid.
    pub fn new(reader: R, writer: W, config: ExpectConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            writer,
            buffer: MatchBuffer::new(config.capacity),
            config,
        })
    }

    /// Create a session with the default configuration.
    #[must_use]
    pub fn with_defaults(reader: R, writer: W) -> Self {
        let config = ExpectConfig::default();
        Self {
            reader,
            writer,
            buffer: MatchBuffer::new(config.capacity),
            config,
        }
    }

    /// Get the session configuration.
    #[must_use]
    pub const fn config(&self) -> &ExpectConfig {
        &self.config
    }

    /// Bytes read from the target but not consumed by a match yet.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Total bytes dropped by sliding-window evictions.
    #[must_use]
    pub const fn bytes_evicted(&self) -> u64 {
        self.buffer.bytes_evicted()
    }

    /// Discard the buffered bytes.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Wait until `pattern` matches the target's output.
    ///
    /// The pattern is a regular expression searched anywhere in the bytes
    /// received since the previous match; everything up to the end of the
    /// leftmost match is consumed and the match returned. Bytes after the
    /// match stay buffered for the next call.
    ///
    /// # Errors
    ///
    /// - [`ExpectError::Regex`]: malformed pattern, nothing consumed.
    /// - [`ExpectError::Timeout`]: the configured deadline passed; the
    ///   unmatched bytes are in the error and stay buffered.
    /// - [`ExpectError::Eof`]: the target closed its output first.
    /// - [`ExpectError::Read`]: the read failed.
    pub async fn expect(&mut self, pattern: &str) -> Result<Match> {
        let timeout = self.config.timeout;
        self.expect_timeout(pattern, timeout).await
    }

    /// Like [`expect`](Self::expect) with an explicit deadline for this call.
    pub async fn expect_timeout(&mut self, pattern: &str, timeout: Duration) -> Result<Match> {
        let matcher = Matcher::new(pattern)?;
        self.run(&matcher, timeout).await
    }

    /// Like [`expect`](Self::expect) with a precompiled pattern.
    pub async fn expect_regex(&mut self, regex: &Regex) -> Result<Match> {
        let matcher = Matcher::from_regex(regex.clone());
        let timeout = self.config.timeout;
        self.run(&matcher, timeout).await
    }

    async fn run(&mut self, matcher: &Matcher, timeout: Duration) -> Result<Match> {
        let deadline = Deadline::from_now(timeout);
        tracing::debug!(
            pattern = matcher.as_str(),
            buffered = self.buffer.len(),
            ?timeout,
            "expect"
        );

        loop {
            if let Some(found) = matcher.consume(&mut self.buffer) {
                tracing::debug!(
                    pattern = matcher.as_str(),
                    matched = found.len(),
                    remaining = self.buffer.len(),
                    "expect matched"
                );
                return Ok(found);
            }

            if self.buffer.is_full() {
                self.buffer.evict();
            }

            match read_before(&mut self.reader, self.buffer.spare_mut(), &deadline).await {
                ReadOutcome::Data(n) => {
                    tracing::trace!(bytes = n, "read from target");
                    self.buffer.commit(n);
                }
                ReadOutcome::TimedOut => {
                    tracing::debug!(
                        pattern = matcher.as_str(),
                        buffered = self.buffer.len(),
                        "expect timed out"
                    );
                    return Err(ExpectError::timeout(
                        timeout,
                        matcher.as_str(),
                        self.buffer.as_slice(),
                    ));
                }
                ReadOutcome::Eof => {
                    tracing::debug!(
                        pattern = matcher.as_str(),
                        buffered = self.buffer.len(),
                        "end of stream before match"
                    );
                    return Err(ExpectError::eof(matcher.as_str(), self.buffer.as_slice()));
                }
                ReadOutcome::Failed(source) => {
                    tracing::debug!(pattern = matcher.as_str(), error = %source, "read failed");
                    return Err(ExpectError::read(
                        matcher.as_str(),
                        source,
                        self.buffer.as_slice(),
                    ));
                }
            }
        }
    }

    /// Send bytes to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        tracing::trace!(bytes = data.len(), "send");
        self.writer
            .write_all(data)
            .await
            .map_err(|e| ExpectError::io_context("writing to target", e))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ExpectError::io_context("flushing target input", e))?;
        Ok(())
    }

    /// Send a string to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send_str(&mut self, s: &str) -> Result<()> {
        self.send(s.as_bytes()).await
    }

    /// Send a line, appending the configured line ending.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(self.config.line_ending.as_bytes());
        self.send(&data).await
    }

    /// Discard all remaining output until the target closes its stream.
    ///
    /// Counts and drops the buffered bytes, then reads and drops everything
    /// the source still produces. Reaching end-of-stream is the successful
    /// outcome. Unlike [`expect`](Self::expect), there is no deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn drain(&mut self) -> Result<u64> {
        let buffered = self.buffer.len() as u64;
        self.buffer.clear();

        let read = tokio::io::copy(&mut self.reader, &mut tokio::io::sink())
            .await
            .map_err(|e| ExpectError::io_context("draining target output", e))?;

        tracing::debug!(buffered, read, "drained target output");
        Ok(buffered + read)
    }

    /// Shut down the writer, signalling end-of-input to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn close_input(&mut self) -> Result<()> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| ExpectError::io_context("closing target input", e))
    }
}

impl<R, W> Session<R, W> {
    /// Get a reference to the reader.
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Get a reference to the writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Take the streams back, dropping any buffered bytes.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> std::fmt::Debug for Session<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
