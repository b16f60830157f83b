//! Convenient re-exports for common stream-expect usage.
//!
//! This module provides a single import to access the most commonly used
//! types from stream-expect.

// Configuration
pub use crate::config::{ExpectConfig, LineEnding};

// Error handling
pub use crate::error::{ExpectError, Result};

// Common types
pub use crate::types::Match;

// Session types
pub use crate::session::Session;
pub use crate::session::pipe::{InProcessPipe, in_process};
#[cfg(unix)]
pub use crate::session::pipe::{FilePipe, file_pipe};

// Blocking adapters
pub use crate::blocking::{BlockingReader, BlockingWriter};

// Sync wrapper
pub use crate::sync::{SyncSession, block_on};
