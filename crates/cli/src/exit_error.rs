// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` (inside `anyhow::Error`) instead of calling
//! `std::process::exit()`, so `main()` owns process termination.

use std::fmt;

/// Repair ran and could not produce a clean build, or a runtime failure.
pub const EXIT_FAILURE: i32 = 1;
/// Arguments, settings or inputs were rejected before any work started.
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Interrupted by ctrl-c.
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_INPUT, message)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(EXIT_FAILURE, message)
    }

    pub fn cancelled() -> Self {
        Self::new(EXIT_CANCELLED, "cancelled")
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code for a command error: an [`ExitError`] anywhere in the chain
/// decides, anything else is a plain failure.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ExitError>())
        .map_or(EXIT_FAILURE, |exit| exit.code)
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
