// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the process runner and its fake.

use super::*;

mod basic;
mod errors;
mod fake;

/// Invocation of the platform shell running `script`.
pub(crate) fn script(script: &str) -> Invocation {
    Invocation::new(crate::PLATFORM_SHELL).args(format!("-c '{script}'"))
}

/// Sync wrapper for async execution in parameterized tests.
pub(crate) fn run_async<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(f)
}
