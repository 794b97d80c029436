// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded status polling with cancellation.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::AgentError;

/// Floor on the sleep between checks so a zero interval cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) enum Polled<T> {
    Ready(T),
    TimedOut(Duration),
}

/// Call `check` until it yields a value or `max_wait` elapses.
///
/// Sleeps `interval` between checks (never past the deadline). The first
/// check runs immediately.
pub(crate) async fn poll_until<T, F, Fut>(
    interval: Duration,
    max_wait: Duration,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<Polled<T>, AgentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, AgentError>>,
{
    let start = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        if let Some(value) = check().await? {
            return Ok(Polled::Ready(value));
        }
        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            return Ok(Polled::TimedOut(elapsed));
        }
        let nap = interval.max(MIN_INTERVAL).min(max_wait - elapsed);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            _ = tokio::time::sleep(nap) => {}
        }
    }
}
