//! Session module for driving a target over a pair of byte streams.
//!
//! The [`Session`] type is the main entry point. It provides methods for:
//!
//! - Waiting for output with [`Session::expect`] and [`Session::expect_timeout`]
//! - Sending input with [`Session::send`] and [`Session::send_line`]
//! - Discarding the rest of the output with [`Session::drain`]
//!
//! [`pipe`] builds connected endpoint pairs for targets running in the same
//! process (or, on Unix, reachable through OS pipes).
//!
//! # Examples
//!
//! ```
//! use stream_expect::{ExpectConfig, pipe};
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> stream_expect::Result<()> {
//! let pipe::InProcessPipe { mut stdin, mut stdout, mut session } =
//!     pipe::in_process(ExpectConfig::default())?;
//!
//! tokio::spawn(async move {
//!     stdout.write_all(b"name? ").await.unwrap();
//!     let mut name = [0u8; 4];
//!     stdin.read_exact(&mut name).await.unwrap();
//!     stdout.write_all(b"hi bob\n").await.unwrap();
//! });
//!
//! session.expect(r"name\? ").await?;
//! session.send_line("bob").await?;
//! session.expect("hi bob").await?;
//! # Ok(())
//! # }
//! ```

mod handle;
pub mod pipe;

pub use handle::Session;
