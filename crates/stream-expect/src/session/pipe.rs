//! Connected endpoint pairs for a session and its target.
//!
//! Each constructor returns the target's two endpoints (`stdin` to read the
//! session's input from, `stdout` to write output to) together with a
//! [`Session`] wired to the opposite ends.

use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

use super::Session;
use crate::config::ExpectConfig;
use crate::error::Result;

/// Capacity of each direction of the in-process duplex stream.
const DUPLEX_CAPACITY: usize = 64 * 1024;

/// Session driving a target through an in-memory duplex stream.
pub type InProcessSession = Session<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// A target's endpoints plus the session connected to them, all in memory.
#[derive(Debug)]
pub struct InProcessPipe {
    /// Where the target reads the session's input.
    pub stdin: ReadHalf<DuplexStream>,
    /// Where the target writes its output.
    ///
    /// The session sees end-of-stream once this is shut down, or once both
    /// `stdin` and `stdout` are dropped.
    pub stdout: WriteHalf<DuplexStream>,
    /// The driving session.
    pub session: InProcessSession,
}

/// Build an in-process pipe for a target that accepts stream handles.
///
/// # Errors
///
/// Returns [`ExpectError::Config`](crate::ExpectError::Config) if the
/// configuration is invalid.
pub fn in_process(config: ExpectConfig) -> Result<InProcessPipe> {
    let (driver, target) = tokio::io::duplex(DUPLEX_CAPACITY);
    let (reader, writer) = tokio::io::split(driver);
    let (stdin, stdout) = tokio::io::split(target);
    let session = Session::new(reader, writer, config)?;
    tracing::debug!("created in-process pipe");
    Ok(InProcessPipe {
        stdin,
        stdout,
        session,
    })
}

#[cfg(unix)]
pub use os::{FilePipe, FileSession, file_pipe};

#[cfg(unix)]
mod os {
    use std::fs::File;

    use crate::blocking::{BlockingReader, BlockingWriter};
    use crate::config::ExpectConfig;
    use crate::error::{ExpectError, Result};
    use crate::session::Session;

    /// Session driving a target through OS pipes.
    pub type FileSession = Session<BlockingReader, BlockingWriter>;

    /// A target's OS pipe ends plus the session connected to them.
    ///
    /// The descriptors are released when the parts are dropped. The target
    /// ends are plain [`File`]s, so they can be handed to code that reads and
    /// writes blocking standard streams.
    #[derive(Debug)]
    pub struct FilePipe<S = FileSession> {
        /// Read end of the target's input pipe.
        pub stdin: File,
        /// Write end of the target's output pipe. Dropping it signals
        /// end-of-stream to the session.
        pub stdout: File,
        /// The driving session.
        pub session: S,
    }

    impl<S> FilePipe<S> {
        /// Release every descriptor held by this pipe.
        pub fn close(self) {
            tracing::debug!("closing file pipe");
            drop(self);
        }

        /// Replace the session with `f(session)`, keeping the target ends.
        pub fn map_session<T>(self, f: impl FnOnce(S) -> T) -> FilePipe<T> {
            FilePipe {
                stdin: self.stdin,
                stdout: self.stdout,
                session: f(self.session),
            }
        }
    }

    fn os_pipe() -> Result<(File, File)> {
        let (read, write) = rustix::pipe::pipe()
            .map_err(|errno| ExpectError::io_context("creating OS pipe", errno.into()))?;
        Ok((File::from(read), File::from(write)))
    }

    /// Build a session over two OS pipes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a pipe cannot be
    /// created, or a worker thread cannot be spawned.
    pub fn file_pipe(config: ExpectConfig) -> Result<FilePipe> {
        config.validate()?;

        let (stdin, input) = os_pipe()?;
        let (output, stdout) = os_pipe()?;

        let reader = ExpectError::with_io_context(
            BlockingReader::new(output),
            "spawning pipe reader thread",
        )?;
        let writer = ExpectError::with_io_context(
            BlockingWriter::new(input),
            "spawning pipe writer thread",
        )?;
        let session = Session::new(reader, writer, config)?;

        tracing::debug!("created file pipe");
        Ok(FilePipe {
            stdin,
            stdout,
            session,
        })
    }
}
