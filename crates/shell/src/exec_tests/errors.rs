// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for guard rejections, failures, timeouts and cancellation.

use std::time::Duration;

use super::script;
use crate::exec::{ExecError, Invocation, ProcessRunner, ProcessSpawner};
use crate::GuardError;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn disallowed_command_never_spawns() {
    let err = ProcessRunner::new()
        .execute(&Invocation::new("rm").args("-rf nothing"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Guard(GuardError::CommandRejected { .. })));
    assert!(err.to_string().contains("not in the allowed commands list"));
}

#[tokio::test]
async fn chained_arguments_rejected() {
    let err = ProcessRunner::new()
        .execute(&Invocation::new("git").args("status && rm -rf /"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Guard(GuardError::ArgumentRejected { separator: "&&" })));
}

#[tokio::test]
async fn missing_working_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProcessRunner::new()
        .execute(&script("pwd").cwd(dir.path().join("nope")), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Working directory does not exist"));
}

#[tokio::test]
async fn non_zero_exit_is_process_failed() {
    let err = ProcessRunner::new()
        .execute(&script("echo error CS0103: missing name 1>/dev/stderr\nexit 1"), &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        ExecError::ProcessFailed { exit_code, stderr, command, .. } => {
            assert_eq!(*exit_code, 1);
            assert!(command.starts_with("sh"));
            assert_eq!(stderr, "error CS0103: missing name");
        }
        other => panic!("expected ProcessFailed, got: {other:?}"),
    }
    assert!(err.to_string().contains("exit code 1"));
    assert_eq!(err.exit_code(), Some(1));
    assert_eq!(err.diagnostic(), "error CS0103: missing name");
}

#[tokio::test]
async fn diagnostic_joins_both_streams() {
    let err = ProcessRunner::new()
        .execute(&script("echo out\necho err 1>/dev/stderr\nexit 2"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.diagnostic(), "out\nerr");
}

#[tokio::test]
async fn slow_process_times_out() {
    let started = std::time::Instant::now();
    let err = ProcessRunner::new()
        .execute(
            &script("sleep 10").timeout(Duration::from_millis(100)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::TimedOut { .. }));
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[cfg(not(windows))]
#[tokio::test]
async fn timeout_covers_pipes_held_by_background_process() {
    // The shell exits at once; its coprocess keeps stdout open.
    let started = std::time::Instant::now();
    let err = ProcessRunner::new()
        .execute(
            &Invocation::new("bash").args("-c 'coproc sleep 3'").timeout(Duration::from_millis(500)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::TimedOut { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn zero_timeout_fails_without_spawning() {
    let err = ProcessRunner::new()
        .execute(&script("echo hi").timeout(Duration::ZERO), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::TimedOut { .. }));
}

#[tokio::test]
async fn pre_cancelled_token_is_cancelled() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = ProcessRunner::new().execute(&script("echo hi"), &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn cancellation_kills_running_process() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = ProcessRunner::new().execute(&script("sleep 5"), &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn unknown_binary_is_spawn_failure() {
    // `tsp` is allowed but usually not installed in test environments.
    let dir = tempfile::tempdir().unwrap();
    let result = ProcessRunner::new()
        .execute(&Invocation::new("tsp").args("--version").cwd(dir.path()), &CancellationToken::new())
        .await;

    if let Err(err) = result {
        assert!(
            matches!(err, ExecError::SpawnFailed { .. } | ExecError::ProcessFailed { .. }),
            "{err}"
        );
    }
}
