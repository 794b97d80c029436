// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation descriptions and captured process output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout applied when an invocation does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single external process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: String,
    arguments: Option<String>,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

impl Invocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), arguments: None, cwd: None, timeout: DEFAULT_TIMEOUT }
    }

    /// Argument string, split on whitespace with quote grouping at spawn time.
    pub fn args(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn arguments(&self) -> Option<&str> {
        self.arguments.as_deref()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn time_limit(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arguments.as_deref() {
            Some(args) if !args.is_empty() => write!(f, "{} {}", self.command, args),
            _ => f.write_str(&self.command),
        }
    }
}

/// Output of a process that exited successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Full command line as displayed in logs.
    pub command: String,
    pub exit_code: i32,
    /// Captured stdout with trailing whitespace removed.
    pub stdout: String,
    /// Captured stderr with trailing whitespace removed.
    pub stderr: String,
    pub duration: Duration,
}
