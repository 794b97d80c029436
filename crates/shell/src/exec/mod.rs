// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running external tools.
//!
//! [`ProcessSpawner`] is the seam the generation steps depend on;
//! [`ProcessRunner`] is the real implementation and `FakeProcessSpawner`
//! the scripted one used in tests.

mod args;
mod error;
mod result;
mod run;

#[cfg(any(test, feature = "test-support"))]
mod fake;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use args::split_arguments;
pub use error::ExecError;
pub use result::{CapturedOutput, Invocation, DEFAULT_TIMEOUT};
pub use run::ProcessRunner;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeOutcome, FakeProcessSpawner};

/// Runs an [`Invocation`] to completion.
///
/// Implementations must not spawn anything unless every guard check passes,
/// and must surface a fired token as [`ExecError::Cancelled`].
#[async_trait]
pub trait ProcessSpawner: Clone + Send + Sync + 'static {
    async fn execute(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError>;
}

#[cfg(test)]
#[path = "../exec_tests/mod.rs"]
mod tests;
