// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the scripted spawner.

use crate::exec::{ExecError, FakeOutcome, FakeProcessSpawner, Invocation, ProcessSpawner};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn replays_outcomes_in_order() {
    let fake = FakeProcessSpawner::new();
    fake.push("dotnet", FakeOutcome::failure(1, "error CS0103: boom"));
    fake.push("dotnet", FakeOutcome::success("Build succeeded"));
    let cancel = CancellationToken::new();
    let build = Invocation::new("dotnet").args("build");

    let first = fake.execute(&build, &cancel).await.unwrap_err();
    assert_eq!(first.diagnostic(), "error CS0103: boom");

    let second = fake.execute(&build, &cancel).await.unwrap();
    assert_eq!(second.stdout, "Build succeeded");

    // Queue drained: default success.
    let third = fake.execute(&build, &cancel).await.unwrap();
    assert_eq!(third.stdout, "");
    assert_eq!(fake.calls_to("dotnet"), 3);
}

#[tokio::test]
async fn still_applies_guard() {
    let fake = FakeProcessSpawner::new();
    let err = fake
        .execute(&Invocation::new("curl"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Guard(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn honours_cancellation() {
    let fake = FakeProcessSpawner::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = fake.execute(&Invocation::new("pwsh"), &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
}
