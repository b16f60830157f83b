//! Test utilities for stream-expect.
//!
//! Readers that control how output arrives (short reads, delays, failures)
//! and assertion helpers that fail the test with the unmatched output.

mod assertions;
mod fixed_reader;
mod scripted_reader;

pub use assertions::{assert_expect, assert_sync_expect, expect_ok, send_ok};
pub use fixed_reader::FixedReader;
pub use scripted_reader::ScriptedReader;
