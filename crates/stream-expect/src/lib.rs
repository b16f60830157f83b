//! stream-expect: expect-style scripting over byte streams
//!
//! This crate lets a test drive an interactive program through its output
//! and input streams: wait until the output matches a pattern, consume
//! exactly up to the match, send input, repeat.
//!
//! # Features
//!
//! - **Async-first design** with Tokio runtime, plus a blocking [`SyncSession`]
//! - **Bounded memory**: unmatched output is kept in a fixed-capacity
//!   sliding window, however much the target produces
//! - **Blocking sources** such as anonymous pipes are bridged through a
//!   worker thread so every expect call still honors its deadline
//! - **Byte-oriented regex matching** via `regex::bytes`
//!
//! # Example
//!
//! ```
//! use stream_expect::prelude::*;
//! use tokio::io::AsyncWriteExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let InProcessPipe { stdin: _stdin, mut stdout, mut session } =
//!     in_process(ExpectConfig::default())?;
//!
//! stdout.write_all(b"Password: ").await.unwrap();
//! session.expect("Password: ").await?;
//! session.send_line("hunter2").await?;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod config;
pub mod error;
pub mod expect;
pub mod prelude;
pub mod session;
pub mod sync;
pub mod types;
pub mod util;

/// Test utilities: readers with controlled behavior and assertion helpers.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use blocking::{BlockingReader, BlockingWriter};
pub use config::{ExpectConfig, LineEnding};
pub use error::{ExpectError, Result};
pub use expect::{MatchBuffer, Matcher};
pub use session::{Session, pipe};
pub use sync::{SyncSession, block_on};
pub use types::Match;
