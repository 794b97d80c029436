// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{CapturedOutput, ExecError, Invocation, ProcessSpawner};
use crate::guard;

/// Scripted result for one fake invocation.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Success { stdout: String },
    Failure { exit_code: i32, stdout: String, stderr: String },
    TimedOut,
}

impl FakeOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        FakeOutcome::Success { stdout: stdout.into() }
    }

    /// Non-zero exit whose output lands on stdout, the way build tools report.
    pub fn failure(exit_code: i32, stdout: impl Into<String>) -> Self {
        FakeOutcome::Failure { exit_code, stdout: stdout.into(), stderr: String::new() }
    }
}

#[derive(Default)]
struct FakeSpawnerState {
    scripted: HashMap<String, VecDeque<FakeOutcome>>,
    calls: Vec<Invocation>,
}

/// Process spawner that never spawns; replays scripted outcomes per command.
///
/// Unscripted invocations succeed with empty output. The guard's command
/// and argument checks still run so rejected invocations behave as they
/// would for real.
#[derive(Clone, Default)]
pub struct FakeProcessSpawner {
    inner: Arc<Mutex<FakeSpawnerState>>,
}

impl FakeProcessSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next invocation of `command`.
    pub fn push(&self, command: &str, outcome: FakeOutcome) {
        self.inner.lock().scripted.entry(command.to_string()).or_default().push_back(outcome);
    }

    /// Every invocation that passed the guard, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_to(&self, command: &str) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.command() == command).count()
    }
}

#[async_trait]
impl ProcessSpawner for FakeProcessSpawner {
    async fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError> {
        guard::validate_command(invocation.command())?;
        guard::validate_arguments(invocation.arguments())?;
        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled);
        }

        let outcome = {
            let mut state = self.inner.lock();
            state.calls.push(invocation.clone());
            state.scripted.get_mut(invocation.command()).and_then(VecDeque::pop_front)
        };
        let command = invocation.to_string();
        match outcome.unwrap_or_else(|| FakeOutcome::success("")) {
            FakeOutcome::Success { stdout } => Ok(CapturedOutput {
                command,
                exit_code: 0,
                stdout,
                stderr: String::new(),
                duration: Duration::ZERO,
            }),
            FakeOutcome::Failure { exit_code, stdout, stderr } => {
                Err(ExecError::ProcessFailed { command, exit_code, stdout, stderr })
            }
            FakeOutcome::TimedOut => {
                Err(ExecError::TimedOut { command, elapsed: invocation.time_limit() })
            }
        }
    }
}
