//! Configuration types for stream-expect.
//!
//! A session is configured once, at construction, with an [`ExpectConfig`].
//! The capacity bounds how many unmatched bytes are retained and therefore
//! also sets the guaranteed look-back window (`capacity / 2`) after an
//! eviction; the timeout is the deadline applied to each expect call.

pub mod env;
pub mod file;

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ExpectError, Result};

/// Default maximum number of buffered-but-unmatched bytes.
pub const DEFAULT_CAPACITY: usize = 2_000;

/// Default deadline for one expect call (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectConfig {
    /// Maximum number of unmatched bytes held in the match buffer.
    pub capacity: usize,

    /// Deadline covering one whole expect call.
    pub timeout: Duration,

    /// Line ending appended by `send_line`.
    pub line_ending: LineEnding,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
            line_ending: LineEnding::default(),
        }
    }
}

impl ExpectConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer capacity.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the per-call deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the line ending used by `send_line`.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Check that the configuration can drive a session.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ExpectError::config("capacity must be at least 1 byte"));
        }
        if self.timeout.is_zero() {
            return Err(ExpectError::config("timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Build a configuration from `STREAM_EXPECT_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        env::load(&env::EnvConfig::default())
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        file::parse_toml(content)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        file::load(path.as_ref())
    }
}

/// Line ending styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix-style line ending (LF).
    #[default]
    Lf,

    /// Windows-style line ending (CRLF).
    CrLf,

    /// Classic Mac line ending (CR).
    Cr,
}

impl LineEnding {
    /// Get the line ending as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Get the line ending as bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl std::str::FromStr for LineEnding {
    type Err = ExpectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::CrLf),
            "cr" => Ok(Self::Cr),
            other => Err(ExpectError::config(format!(
                "unknown line ending '{other}' (expected lf, crlf or cr)"
            ))),
        }
    }
}
