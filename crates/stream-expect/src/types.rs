//! Common types used throughout stream-expect.

use std::borrow::Cow;
use std::fmt;

/// The result of a successful expect call.
///
/// Holds the bytes of the leftmost match. Bytes before the match were
/// consumed and dropped; bytes after it stay buffered in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The bytes that matched.
    pub matched: Vec<u8>,

    /// Capture groups of the pattern; group 0 is the whole match.
    /// `None` marks a group that did not participate.
    pub captures: Vec<Option<Vec<u8>>>,
}

impl Match {
    /// Create a match without capture groups.
    #[must_use]
    pub fn new(matched: impl Into<Vec<u8>>) -> Self {
        Self {
            matched: matched.into(),
            captures: Vec::new(),
        }
    }

    /// Attach capture groups.
    #[must_use]
    pub fn with_captures(mut self, captures: Vec<Option<Vec<u8>>>) -> Self {
        self.captures = captures;
        self
    }

    /// Get a capture group by index.
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&[u8]> {
        self.captures.get(index).and_then(Option::as_deref)
    }

    /// Get a capture group as lossy UTF-8.
    #[must_use]
    pub fn capture_str(&self, index: usize) -> Option<Cow<'_, str>> {
        self.capture(index).map(String::from_utf8_lossy)
    }

    /// The matched bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.matched
    }

    /// The matched bytes as lossy UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.matched)
    }

    /// Length of the match in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matched.len()
    }

    /// Whether the pattern matched the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    /// Consume the match, returning the matched bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.matched
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialEq<str> for Match {
    fn eq(&self, other: &str) -> bool {
        self.matched == other.as_bytes()
    }
}

impl PartialEq<&str> for Match {
    fn eq(&self, other: &&str) -> bool {
        self.matched == other.as_bytes()
    }
}
