//! Blocking reader that replays a script of chunks, pauses and failures.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
enum Step {
    Data(Vec<u8>),
    Pause(Duration),
    Fail(io::ErrorKind),
}

/// A blocking [`Read`] that plays back a fixed script.
///
/// Each read blocks through any pauses at the front of the script, then
/// returns bytes from the next chunk (never more than one chunk per read).
/// An exhausted script reads as end-of-stream. Wrap it in a
/// [`BlockingReader`](crate::blocking::BlockingReader) to drive a session.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    steps: VecDeque<Step>,
}

impl ScriptedReader {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of output.
    #[must_use]
    pub fn data(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.steps.push_back(Step::Data(bytes.as_ref().to_vec()));
        self
    }

    /// Append a pause before the next step.
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push_back(Step::Pause(duration));
        self
    }

    /// Append a read failure of the given kind.
    #[must_use]
    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.steps.push_back(Step::Fail(kind));
        self
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.steps.pop_front() {
                None => return Ok(0),
                Some(Step::Pause(duration)) => thread::sleep(duration),
                Some(Step::Fail(kind)) => return Err(io::Error::new(kind, "scripted failure")),
                Some(Step::Data(mut chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.steps.push_front(Step::Data(chunk.split_off(n)));
                    }
                    return Ok(n);
                }
            }
        }
    }
}
