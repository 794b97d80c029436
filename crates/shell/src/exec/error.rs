// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process execution error types.

use std::time::Duration;

use crate::GuardError;

/// Errors that can occur while running an external process.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The invocation failed a pre-spawn check; nothing was spawned.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// Command not found or could not be spawned.
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    /// The process ran to completion with a non-zero status.
    #[error("command `{command}` failed with exit code {exit_code}")]
    ProcessFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The process outlived its timeout and was killed.
    #[error("command `{command}` timed out after {}ms", elapsed.as_millis())]
    TimedOut { command: String, elapsed: Duration },

    /// The caller's cancellation token fired.
    #[error("command execution was cancelled")]
    Cancelled,
}

impl ExecError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::ProcessFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Text a diagnostics scanner should look at.
    ///
    /// For a failed process this is stdout followed by stderr; compilers
    /// write errors to either stream. Other variants yield their message.
    pub fn diagnostic(&self) -> String {
        match self {
            ExecError::ProcessFailed { stdout, stderr, .. } => match (stdout.is_empty(), stderr.is_empty()) {
                (false, false) => format!("{stdout}\n{stderr}"),
                (false, true) => stdout.clone(),
                (true, _) => stderr.clone(),
            },
            other => other.to_string(),
        }
    }
}
