// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for everything outside the process: the AI agent service,
//! GitHub, and the TypeSpec files on disk.

pub mod agent;
pub mod github;
pub mod response;
pub mod store;

pub use agent::{
    AgentBackend, AgentError, AgentSession, AgentSpec, HttpAgentBackend, IndexingStatus,
    RunStatus, SessionConfig, SessionPhase, DEFAULT_INSTRUCTIONS,
};
pub use github::{GitHubError, GitHubSource};
pub use response::{parse_errors, parse_patch_request, ParseError};
pub use store::{FileStoreError, TypeSpecFileStore};

#[cfg(any(test, feature = "test-support"))]
pub use agent::{BackendCall, FakeAgentBackend};
