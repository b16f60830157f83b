//! Assertion helpers that fail the test on expect or send errors.
//!
//! The failure message carries the unmatched output, which is usually all
//! that is needed to see why a script went off the rails.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::session::Session;
use crate::sync::SyncSession;
use crate::types::Match;

/// Expect `pattern` or fail the test.
///
/// # Panics
///
/// Panics with the error and the unmatched output if the expect fails.
pub async fn expect_ok<R, W>(session: &mut Session<R, W>, pattern: &str) -> Match
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match session.expect(pattern).await {
        Ok(found) => found,
        Err(e) => panic!("expect {pattern:?} failed: {e}"),
    }
}

/// Expect `pattern` and assert the consumed text equals `want`.
///
/// # Panics
///
/// Panics if the expect fails or the match differs from `want`.
pub async fn assert_expect<R, W>(session: &mut Session<R, W>, pattern: &str, want: &str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let found = expect_ok(session, pattern).await;
    assert_eq!(
        found.as_str(),
        want,
        "expect {pattern:?} matched {:?}, wanted {want:?}",
        found.as_str()
    );
}

/// Send `data` or fail the test.
///
/// # Panics
///
/// Panics if the write fails.
pub async fn send_ok<R, W>(session: &mut Session<R, W>, data: impl AsRef<[u8]>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = session.send(data.as_ref()).await {
        panic!("send failed: {e}");
    }
}

/// Blocking variant of [`assert_expect`].
///
/// # Panics
///
/// Panics if the expect fails or the match differs from `want`.
pub fn assert_sync_expect<R, W>(session: &mut SyncSession<R, W>, pattern: &str, want: &str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match session.expect(pattern) {
        Ok(found) => assert_eq!(
            found.as_str(),
            want,
            "expect {pattern:?} matched {:?}, wanted {want:?}",
            found.as_str()
        ),
        Err(e) => panic!("expect {pattern:?} failed: {e}"),
    }
}
