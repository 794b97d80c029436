// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guarded process spawning with timeout and cancellation.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::args::split_arguments;
use super::error::ExecError;
use super::result::{CapturedOutput, Invocation};
use super::ProcessSpawner;
use crate::guard;

/// Spawns real processes after the guard checks pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for ProcessRunner {
    async fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError> {
        let span = tracing::info_span!(
            "shell.exec",
            cmd = %invocation,
            exit_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        run(invocation, cancel).instrument(span).await
    }
}

enum Waited {
    Exited(std::io::Result<ExitStatus>, (String, String)),
    Cancelled,
    TimedOut,
}

async fn run(invocation: &Invocation, cancel: &CancellationToken) -> Result<CapturedOutput, ExecError> {
    let command = guard::validate_command(invocation.command())?;
    let arguments = guard::validate_arguments(invocation.arguments())?;
    let cwd = guard::validate_working_directory(invocation.working_dir())?;
    let display = invocation.to_string();

    if cancel.is_cancelled() {
        tracing::info!("Command execution was cancelled");
        return Err(ExecError::Cancelled);
    }
    let timeout = invocation.time_limit();
    if timeout.is_zero() {
        tracing::error!(timeout_secs = 0, "Command timed out before it could start");
        return Err(ExecError::TimedOut { command: display, elapsed: Duration::ZERO });
    }

    let start = Instant::now();
    let mut process = tokio::process::Command::new(command);
    process
        .args(split_arguments(&arguments))
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = process
        .spawn()
        .map_err(|source| ExecError::SpawnFailed { command: display.clone(), source })?;
    let mut readers = Readers::spawn(&mut child);

    // The deadline covers draining the pipes too: a background process
    // that inherited them keeps them open after the child exits.
    let finished = async {
        let status = child.wait().await;
        (status, readers.collect().await)
    };
    let waited = tokio::select! {
        biased;
        _ = cancel.cancelled() => Waited::Cancelled,
        (status, output) = finished => Waited::Exited(status, output),
        _ = tokio::time::sleep(timeout) => Waited::TimedOut,
    };

    let current = tracing::Span::current();
    current.record("duration_ms", start.elapsed().as_millis() as u64);

    match waited {
        Waited::Cancelled => {
            terminate(&mut child, readers).await;
            tracing::info!("Command execution was cancelled");
            Err(ExecError::Cancelled)
        }
        Waited::TimedOut => {
            terminate(&mut child, readers).await;
            tracing::error!(timeout_secs = timeout.as_secs(), "Command timed out");
            Err(ExecError::TimedOut { command: display, elapsed: start.elapsed() })
        }
        Waited::Exited(status, (stdout, stderr)) => {
            let status =
                status.map_err(|source| ExecError::SpawnFailed { command: display.clone(), source })?;
            let exit_code = status.code().unwrap_or(-1);
            current.record("exit_code", exit_code);

            if status.success() {
                tracing::debug!("Command succeeded");
                Ok(CapturedOutput {
                    command: display,
                    exit_code,
                    stdout,
                    stderr,
                    duration: start.elapsed(),
                })
            } else {
                tracing::error!(exit_code, "Command failed with exit code {exit_code}");
                Err(ExecError::ProcessFailed { command: display, exit_code, stdout, stderr })
            }
        }
    }
}

/// Kill a child that is still running and discard its output.
async fn terminate(child: &mut Child, readers: Readers) {
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "kill after exit");
    }
    let _ = child.wait().await;
    readers.abort();
}

/// Background tasks draining the child's pipes so it never blocks on a
/// full buffer.
struct Readers {
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

impl Readers {
    fn spawn(child: &mut Child) -> Self {
        Self {
            stdout: child.stdout.take().map(|pipe| tokio::spawn(drain(pipe))),
            stderr: child.stderr.take().map(|pipe| tokio::spawn(drain(pipe))),
        }
    }

    async fn collect(&mut self) -> (String, String) {
        (join(&mut self.stdout).await, join(&mut self.stderr).await)
    }

    fn abort(&self) {
        for handle in [&self.stdout, &self.stderr].into_iter().flatten() {
            handle.abort();
        }
    }
}

async fn join(handle: &mut Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "pipe read ended early");
    }
    String::from_utf8_lossy(&buf).trim_end().to_string()
}
