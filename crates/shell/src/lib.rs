// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Guarded execution of external build tools.
//!
//! [`guard`] holds the pure allow-list and path checks; [`exec`] runs
//! processes only after those checks pass.

pub mod exec;
pub mod guard;

pub use exec::{
    split_arguments, CapturedOutput, ExecError, Invocation, ProcessRunner, ProcessSpawner,
    DEFAULT_TIMEOUT,
};
pub use guard::{
    validate_arguments, validate_command, validate_path, validate_working_directory, GuardError,
    PathKind, ALLOWED_COMMANDS, DANGEROUS_SEPARATORS, PLATFORM_SHELL,
};

#[cfg(any(test, feature = "test-support"))]
pub use exec::{FakeOutcome, FakeProcessSpawner};
