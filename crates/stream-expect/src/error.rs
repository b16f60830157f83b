//! Error types for stream-expect.
//!
//! Errors that end an expect call carry the bytes that were buffered but not
//! matched at that point, so callers can inspect trailing output for
//! diagnostics.

use std::borrow::Cow;
use std::time::Duration;

use thiserror::Error;

/// Maximum length of buffer content to display in error messages.
const MAX_BUFFER_DISPLAY: usize = 500;

/// Context lines to show before/after truncation point.
const CONTEXT_LINES: usize = 3;

/// Format buffer content for display, truncating if necessary.
fn format_buffer_snippet(buffer: &[u8]) -> String {
    if buffer.is_empty() {
        return "(empty buffer)".to_string();
    }

    let text = String::from_utf8_lossy(buffer);
    let buffer_len = buffer.len();

    if buffer_len <= MAX_BUFFER_DISPLAY {
        return format!(
            "┌─ buffer ({} bytes) ──────────────────────\n│ {}\n└────────────────────────────────────────",
            buffer_len,
            text.lines().collect::<Vec<_>>().join("\n│ ")
        );
    }

    let lines: Vec<&str> = text.lines().collect();
    let total_lines = lines.len();

    if total_lines <= CONTEXT_LINES * 2 {
        // A few very long lines: keep the tail of the text instead.
        let tail = tail_chars(&text, MAX_BUFFER_DISPLAY);
        return format!(
            "┌─ buffer ({buffer_len} bytes, {total_lines} lines) ─────────────\n│ ...{tail}\n└────────────────────────────────────────"
        );
    }

    let tail_lines = &lines[lines.len().saturating_sub(CONTEXT_LINES * 2)..];
    let hidden = total_lines - tail_lines.len();

    format!(
        "┌─ buffer ({} bytes, {} lines) ─────────────\n│ ... ({} lines hidden)\n│ {}\n└────────────────────────────────────────",
        buffer_len,
        total_lines,
        hidden,
        tail_lines.join("\n│ ")
    )
}

/// Last `max` characters of `text`, on a char boundary.
fn tail_chars(text: &Cow<'_, str>, max: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max)).collect()
}

fn format_timeout_error(duration: Duration, pattern: &str, buffer: &[u8]) -> String {
    let buffer_snippet = format_buffer_snippet(buffer);

    format!(
        "timeout after {duration:?} waiting for pattern\n\
         \n\
         Pattern: '{pattern}'\n\
         \n\
         {buffer_snippet}\n\
         \n\
         Tip: the unmatched bytes above stay buffered for the next expect call."
    )
}

fn format_eof_error(pattern: &str, buffer: &[u8]) -> String {
    let buffer_snippet = format_buffer_snippet(buffer);

    format!(
        "end of stream before pattern matched\n\
         \n\
         Pattern: '{pattern}'\n\
         \n\
         {buffer_snippet}"
    )
}

fn format_read_error(pattern: &str, source: &std::io::Error, buffer: &[u8]) -> String {
    let buffer_snippet = format_buffer_snippet(buffer);

    format!(
        "read error while waiting for pattern: {source}\n\
         \n\
         Pattern: '{pattern}'\n\
         \n\
         {buffer_snippet}"
    )
}

/// The main error type for stream-expect operations.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// The pattern text is not a valid regular expression.
    ///
    /// Returned before any byte is read; the session is unchanged.
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The deadline elapsed before the pattern matched.
    #[error("{}", format_timeout_error(*duration, pattern, buffer))]
    Timeout {
        /// The deadline that elapsed.
        duration: Duration,
        /// The pattern that was being searched for.
        pattern: String,
        /// Unmatched bytes buffered at the time of the timeout.
        buffer: Vec<u8>,
    },

    /// The source reached end-of-stream before the pattern matched.
    #[error("{}", format_eof_error(pattern, buffer))]
    Eof {
        /// The pattern that was being searched for.
        pattern: String,
        /// Trailing unmatched bytes.
        buffer: Vec<u8>,
    },

    /// The source returned an I/O error before the pattern matched.
    #[error("{}", format_read_error(pattern, source, buffer))]
    Read {
        /// The pattern that was being searched for.
        pattern: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
        /// Trailing unmatched bytes.
        buffer: Vec<u8>,
    },

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for stream-expect operations.
pub type Result<T> = std::result::Result<T, ExpectError>;

impl ExpectError {
    /// Create a timeout error with the given details.
    pub fn timeout(duration: Duration, pattern: impl Into<String>, buffer: impl Into<Vec<u8>>) -> Self {
        Self::Timeout {
            duration,
            pattern: pattern.into(),
            buffer: buffer.into(),
        }
    }

    /// Create an end-of-stream error.
    pub fn eof(pattern: impl Into<String>, buffer: impl Into<Vec<u8>>) -> Self {
        Self::Eof {
            pattern: pattern.into(),
            buffer: buffer.into(),
        }
    }

    /// Create a read error carrying the trailing bytes.
    pub fn read(
        pattern: impl Into<String>,
        source: std::io::Error,
        buffer: impl Into<Vec<u8>>,
    ) -> Self {
        Self::Read {
            pattern: pattern.into(),
            source,
            buffer: buffer.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O result with context.
    pub fn with_io_context<T>(result: std::io::Result<T>, context: impl Into<String>) -> Result<T> {
        result.map_err(|e| Self::io_context(context, e))
    }

    /// Check if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is an end-of-stream error.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof { .. })
    }

    /// Check if this is a pattern compilation error.
    #[must_use]
    pub const fn is_pattern_error(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    /// Get the unmatched bytes if this error carries them.
    #[must_use]
    pub fn buffer(&self) -> Option<&[u8]> {
        match self {
            Self::Timeout { buffer, .. } | Self::Eof { buffer, .. } | Self::Read { buffer, .. } => {
                Some(buffer)
            }
            _ => None,
        }
    }

    /// Get the unmatched bytes as lossy UTF-8, if this error carries them.
    #[must_use]
    pub fn buffer_str(&self) -> Option<Cow<'_, str>> {
        self.buffer().map(String::from_utf8_lossy)
    }

    /// Take the unmatched bytes out of this error.
    #[must_use]
    pub fn into_buffer(self) -> Option<Vec<u8>> {
        match self {
            Self::Timeout { buffer, .. } | Self::Eof { buffer, .. } | Self::Read { buffer, .. } => {
                Some(buffer)
            }
            _ => None,
        }
    }
}
