//! Pattern matcher.
//!
//! Patterns are regular expressions searched anywhere in the buffered bytes,
//! not anchored to the whole buffer. The classic expect idiom `.*prompt`
//! therefore means "everything up to and including `prompt`".
//!
//! Patterns compile with Unicode mode off: `.` matches any byte except
//! `\n` (including bytes that are not valid UTF-8), and the Perl classes
//! `\d`, `\w` and `\s` are ASCII-only. Non-ASCII literals in a pattern
//! still match their UTF-8 encoding. `(?u)` turns Unicode mode back on for
//! a group.

use std::ops::Range;

use regex::bytes::{Regex, RegexBuilder};

use super::buffer::MatchBuffer;
use crate::error::Result;
use crate::types::Match;

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Regex`](crate::ExpectError::Regex) if the
    /// pattern is malformed.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).unicode(false).build()?;
        Ok(Self { regex })
    }

    /// Wrap an already compiled regex.
    ///
    /// The regex keeps whatever Unicode mode it was built with.
    #[must_use]
    pub const fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    /// The pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte range of the leftmost match in `haystack`.
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<Range<usize>> {
        self.regex.find(haystack).map(|m| m.range())
    }

    /// Search the buffered bytes and consume through the end of the match.
    ///
    /// On a match, bytes before the match start are discarded, the match is
    /// returned, and bytes after the match end are shifted to the front of
    /// the buffer for the next call. On no match the buffer is untouched.
    pub fn consume(&self, buffer: &mut MatchBuffer) -> Option<Match> {
        let haystack = buffer.as_slice();

        let (range, captures) = if self.regex.captures_len() > 1 {
            let caps = self.regex.captures(haystack)?;
            let captures = caps
                .iter()
                .map(|group| group.map(|g| g.as_bytes().to_vec()))
                .collect();
            (caps.get(0)?.range(), captures)
        } else {
            (self.find(haystack)?, Vec::new())
        };

        let found = Match::new(&haystack[range.clone()]).with_captures(captures);
        buffer.consume(range.end);
        Some(found)
    }
}

impl From<Regex> for Matcher {
    fn from(regex: Regex) -> Self {
        Self::from_regex(regex)
    }
}
