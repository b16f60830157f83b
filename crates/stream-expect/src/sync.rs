//! Synchronous wrapper for async expect operations.
//!
//! This module provides a blocking API for tests that are not async
//! themselves. Each [`SyncSession`] owns a current-thread runtime.

use std::time::Duration;

use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::runtime::{Builder, Runtime};

use crate::config::ExpectConfig;
use crate::error::{ExpectError, Result};
use crate::session::Session;
use crate::types::Match;

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExpectError::io_context("creating tokio runtime", e))
}

/// A synchronous session wrapper.
///
/// This wraps an async [`Session`] and provides blocking methods for use in
/// synchronous contexts. Must not be used from inside an async runtime.
pub struct SyncSession<R, W> {
    /// The tokio runtime.
    runtime: Runtime,
    /// The inner async session.
    inner: Session<R, W>,
}

impl<R, W> SyncSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a synchronous session over `reader` and `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the runtime
    /// cannot be created.
    pub fn new(reader: R, writer: W, config: ExpectConfig) -> Result<Self> {
        Self::from_session(Session::new(reader, writer, config)?)
    }

    /// Wrap an existing async session.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be created.
    pub fn from_session(inner: Session<R, W>) -> Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            inner,
        })
    }

    /// Get the session configuration.
    #[must_use]
    pub const fn config(&self) -> &ExpectConfig {
        self.inner.config()
    }

    /// Bytes read but not yet consumed by a match.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        self.inner.buffered()
    }

    /// Clear the buffer.
    pub fn clear_buffer(&mut self) {
        self.inner.clear_buffer();
    }

    /// Send bytes to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        self.runtime.block_on(self.inner.send(data))
    }

    /// Send a string to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn send_str(&mut self, s: &str) -> Result<()> {
        self.runtime.block_on(self.inner.send_str(s))
    }

    /// Send a line to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.runtime.block_on(self.inner.send_line(line))
    }

    /// Expect a pattern in the output.
    ///
    /// # Errors
    ///
    /// Returns an error on a bad pattern, timeout, EOF or read failure.
    pub fn expect(&mut self, pattern: &str) -> Result<Match> {
        self.runtime.block_on(self.inner.expect(pattern))
    }

    /// Expect a pattern with a specific timeout.
    ///
    /// # Errors
    ///
    /// Returns an error on a bad pattern, timeout, EOF or read failure.
    pub fn expect_timeout(&mut self, pattern: &str, timeout: Duration) -> Result<Match> {
        self.runtime
            .block_on(self.inner.expect_timeout(pattern, timeout))
    }

    /// Expect a precompiled pattern.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, EOF or read failure.
    pub fn expect_regex(&mut self, regex: &Regex) -> Result<Match> {
        self.runtime.block_on(self.inner.expect_regex(regex))
    }

    /// Discard all remaining output until end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub fn drain(&mut self) -> Result<u64> {
        self.runtime.block_on(self.inner.drain())
    }

    /// Run an async operation on this session's runtime.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime.block_on(future)
    }

    /// Unwrap the async session.
    pub fn into_inner(self) -> Session<R, W> {
        self.inner
    }
}

#[cfg(unix)]
impl SyncSession<crate::blocking::BlockingReader, crate::blocking::BlockingWriter> {
    /// Build a synchronous session over two OS pipes.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipes, worker threads or runtime cannot be
    /// created.
    pub fn file_pipe(config: ExpectConfig) -> Result<crate::session::pipe::FilePipe<Self>> {
        let pipe = crate::session::pipe::file_pipe(config)?;
        let runtime = runtime()?;
        Ok(pipe.map_session(|inner| Self { runtime, inner }))
    }
}

impl<R, W> std::fmt::Debug for SyncSession<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Run async code synchronously.
///
/// This is a convenience function for running a single async operation
/// without managing a runtime.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = T>,
{
    Ok(runtime()?.block_on(future))
}
