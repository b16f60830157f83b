//! Expect pattern matching module.
//!
//! The two leaves of an expect call: the bounded buffer that accumulates
//! unmatched output and the matcher that searches and consumes it.

mod buffer;
mod matcher;

pub use buffer::MatchBuffer;
pub use matcher::Matcher;
