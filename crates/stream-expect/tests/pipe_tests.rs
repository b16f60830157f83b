//! Integration tests driving targets through in-process and OS pipes.

mod common;

use std::io;
use std::time::Duration;

use stream_expect::pipe::{self, InProcessPipe};
use stream_expect::test_utils::{ScriptedReader, assert_expect, send_ok};
use stream_expect::{BlockingReader, ExpectConfig, ExpectError, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

// =============================================================================
// In-process pipe
// =============================================================================

#[tokio::test]
async fn in_process_round_trip() {
    common::init_tracing();
    let InProcessPipe {
        stdin,
        mut stdout,
        mut session,
    } = pipe::in_process(common::config(100)).unwrap();

    let target = tokio::spawn(async move {
        let mut stdin = BufReader::new(stdin);
        stdout.write_all(b"1234567").await.unwrap();
        let mut line = String::new();
        stdin.read_line(&mut line).await.unwrap();
        assert_eq!(line, "hello\n");
        stdout.write_all(b"890cafefa").await.unwrap();
        stdout.shutdown().await.unwrap();
    });

    assert_expect(&mut session, ".*7", "1234567").await;
    send_ok(&mut session, "hello\n").await;
    assert_expect(&mut session, ".*fa", "890cafefa").await;
    target.await.unwrap();

    assert!(session.expect("more").await.unwrap_err().is_eof());
}

#[tokio::test]
async fn timeout_keeps_prefix_for_next_expect() {
    common::init_tracing();
    let InProcessPipe {
        stdin: _stdin,
        mut stdout,
        mut session,
    } = pipe::in_process(common::config(100)).unwrap();

    stdout.write_all(b"partial").await.unwrap();
    let err = session
        .expect_timeout("done", Duration::from_millis(50))
        .await
        .unwrap_err();
    match &err {
        ExpectError::Timeout {
            duration, pattern, ..
        } => {
            assert_eq!(*duration, Duration::from_millis(50));
            assert_eq!(pattern, "done");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(err.buffer(), Some(&b"partial"[..]));
    assert_eq!(session.buffered(), b"partial");

    stdout.write_all(b" done tail").await.unwrap();
    assert_expect(&mut session, "done", "done").await;

    stdout.shutdown().await.unwrap();
    assert_eq!(session.drain().await.unwrap(), 5);
}

#[tokio::test]
async fn send_line_reaches_target() {
    let InProcessPipe {
        stdin,
        stdout: _stdout,
        mut session,
    } = pipe::in_process(ExpectConfig::default()).unwrap();

    session.send_line("first").await.unwrap();
    session.send_str("second\n").await.unwrap();

    let mut lines = BufReader::new(stdin).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
}

// =============================================================================
// Blocking sources
// =============================================================================

fn scripted_session(reader: ScriptedReader) -> Session<BlockingReader, tokio::io::Sink> {
    common::init_tracing();
    let reader = BlockingReader::new(reader).unwrap();
    Session::new(reader, tokio::io::sink(), common::config(100)).unwrap()
}

#[tokio::test]
async fn blocked_read_survives_timeout() {
    let mut session = scripted_session(
        ScriptedReader::new()
            .data("boot")
            .pause(Duration::from_millis(300))
            .data(" ready"),
    );

    let err = session
        .expect_timeout("ready", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.buffer(), Some(&b"boot"[..]));
    assert!(session.reader().has_read_in_flight());

    assert_expect(&mut session, "ready", "ready").await;
}

#[tokio::test]
async fn read_error_is_passed_through() {
    let mut session = scripted_session(
        ScriptedReader::new()
            .data("abc")
            .fail(io::ErrorKind::ConnectionReset),
    );

    match session.expect("xyz").await {
        Err(ExpectError::Read {
            pattern,
            source,
            buffer,
        }) => {
            assert_eq!(pattern, "xyz");
            assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            assert_eq!(buffer, b"abc");
        }
        other => panic!("expected read error, got {other:?}"),
    }
}

#[tokio::test]
async fn drain_fails_on_read_error() {
    let mut session = scripted_session(
        ScriptedReader::new()
            .data("abc")
            .fail(io::ErrorKind::ConnectionReset),
    );
    let err = session.drain().await.unwrap_err();
    assert!(matches!(err, ExpectError::IoWithContext { .. }));
}

// =============================================================================
// OS pipes
// =============================================================================

#[cfg(unix)]
mod file_pipe {
    use std::io::{BufRead, BufReader, Write};
    use std::thread;

    use super::*;

    #[tokio::test]
    async fn file_pipe_round_trip() {
        common::init_tracing();
        let pipe::FilePipe {
            stdin,
            mut stdout,
            mut session,
        } = pipe::file_pipe(common::config(16)).unwrap();

        let target = thread::spawn(move || {
            stdout.write_all(b"1234567").unwrap();
            let mut line = String::new();
            BufReader::new(stdin).read_line(&mut line).unwrap();
            stdout.write_all(line.trim_end().as_bytes()).unwrap();
            stdout.write_all(b" ok\n").unwrap();
        });

        let m = session.expect("7").await.unwrap();
        assert!(m.as_str().ends_with('7'));
        session.send_line("echo").await.unwrap();
        assert_expect(&mut session, "echo ok", "echo ok").await;
        target.join().unwrap();
        assert_eq!(session.drain().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn file_pipe_timeout_then_recover() {
        common::init_tracing();
        let pipe::FilePipe {
            stdin: _stdin,
            mut stdout,
            mut session,
        } = pipe::file_pipe(common::config(100)).unwrap();

        stdout.write_all(b"waiting").unwrap();
        let err = session
            .expect_timeout("go", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(session.buffered(), b"waiting");

        stdout.write_all(b" go").unwrap();
        assert_expect(&mut session, "go", "go").await;
    }

    #[tokio::test]
    async fn drain_counts_everything_until_close() {
        common::init_tracing();
        let pipe::FilePipe {
            stdin: _stdin,
            mut stdout,
            mut session,
        } = pipe::file_pipe(common::config(1024)).unwrap();

        let target = thread::spawn(move || {
            stdout.write_all(b"header\n").unwrap();
            stdout.write_all(&vec![b'z'; 100_000]).unwrap();
        });

        assert_expect(&mut session, "header\n", "header\n").await;
        assert_eq!(session.drain().await.unwrap(), 100_000);
        target.join().unwrap();
    }

    #[test]
    fn close_releases_target_ends() {
        let pipe = pipe::file_pipe(ExpectConfig::default()).unwrap();
        pipe.close();
    }
}
