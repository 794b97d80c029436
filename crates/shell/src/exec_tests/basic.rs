// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for successful process execution.

use super::{run_async, script};
use crate::exec::{Invocation, ProcessRunner, ProcessSpawner};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn captures_stdout_trimmed() {
    let output = ProcessRunner::new()
        .execute(&script("printf \"hello\\n\\n\""), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout, "hello");
}

#[tokio::test]
async fn captures_stderr_separately() {
    let output = ProcessRunner::new()
        .execute(&script("echo warn 1>/dev/stderr"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.stdout, "");
    assert_eq!(output.stderr, "warn");
}

#[tokio::test]
async fn runs_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    let output = ProcessRunner::new()
        .execute(&script("pwd").cwd(dir.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.stdout, canonical.to_str().unwrap());
}

#[tokio::test]
async fn git_version_when_installed() {
    let dir = tempfile::tempdir().unwrap();
    let output = ProcessRunner::new()
        .execute(&Invocation::new("git").args("--version").cwd(dir.path()), &CancellationToken::new())
        .await;

    // git may be absent on minimal hosts; only a spawn failure is acceptable then.
    match output {
        Ok(out) => assert!(out.stdout.starts_with("git version")),
        Err(e) => assert!(matches!(e, crate::exec::ExecError::SpawnFailed { .. }), "{e}"),
    }
}

#[yare::parameterized(
    plain = { "echo one", "one" },
    quoted_words = { "echo \"two words\"", "two words" },
    multi_line = { "printf \"a\\nb\\n\"", "a\nb" },
)]
fn stdout_cases(body: &str, expected: &str) {
    let output = run_async(ProcessRunner::new().execute(&script(body), &CancellationToken::new()))
        .unwrap();
    assert_eq!(output.stdout, expected);
}

#[test]
fn display_joins_command_and_arguments() {
    assert_eq!(Invocation::new("dotnet").args("build").to_string(), "dotnet build");
    assert_eq!(Invocation::new("dotnet").to_string(), "dotnet");
    assert_eq!(Invocation::new("dotnet").args("").to_string(), "dotnet");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_keep_their_own_output() {
    let handles: Vec<_> = (0..5)
        .map(|i| {
            let runner = ProcessRunner::new();
            let invocation = script(&format!("sleep 0.1\necho payload-{i}"));
            tokio::spawn(async move { runner.execute(&invocation, &CancellationToken::new()).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let output = handle.await.unwrap().unwrap();
        assert_eq!(output.stdout, format!("payload-{i}"));
    }
}
