// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    backend = { AgentError::backend("upload", "HTTP 500"), "agent service upload failed: HTTP 500" },
    upload = { AgentError::UploadFailed { attempted: 3 }, "no TypeSpec files could be uploaded (3 attempted)" },
    indexing_timeout = { AgentError::IndexingTimedOut { waited: Duration::from_secs(180) }, "vector store indexing timed out after 180s" },
    run_timeout = { AgentError::RunTimedOut { waited: Duration::from_millis(300_500) }, "agent run timed out after 300s" },
    cancelled = { AgentError::Cancelled, "agent operation was cancelled" },
)]
fn error_messages(err: AgentError, expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn parse_errors_pass_through_transparently() {
    let err = AgentError::from(ParseError::Empty);
    assert_eq!(err.to_string(), "Agent response is empty");
    assert!(!err.is_cancelled());
}

#[test]
fn only_cancelled_is_cancelled() {
    assert!(AgentError::Cancelled.is_cancelled());
    assert!(!AgentError::Disposed.is_cancelled());
    assert!(!AgentError::RunFailed { reason: "x".into() }.is_cancelled());
}
