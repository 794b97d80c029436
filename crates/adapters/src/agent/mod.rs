// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AI agent fallback: the remote backend capability and the session that
//! drives it.

mod http;
mod instructions;
mod poll;
mod session;

#[cfg(any(test, feature = "test-support"))]
mod fake;

use std::time::Duration;

use async_trait::async_trait;
use sg_core::{AgentId, FileId, RunId, ThreadId, VectorStoreId};
use thiserror::Error;

use crate::response::ParseError;

pub use http::HttpAgentBackend;
pub use instructions::DEFAULT_INSTRUCTIONS;
pub use session::{AgentSession, SessionConfig, SessionPhase};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeAgentBackend};

/// Errors from the agent fallback path.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A remote call failed or returned an unexpected payload.
    #[error("agent service {operation} failed: {message}")]
    Backend { operation: &'static str, message: String },

    #[error("no TypeSpec files could be uploaded ({attempted} attempted)")]
    UploadFailed { attempted: usize },

    #[error("vector store indexing failed: {reason}")]
    IndexingFailed { reason: String },

    #[error("vector store indexing timed out after {}s", waited.as_secs())]
    IndexingTimedOut { waited: Duration },

    #[error("agent run failed: {reason}")]
    RunFailed { reason: String },

    #[error("agent run timed out after {}s", waited.as_secs())]
    RunTimedOut { waited: Duration },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no .tsp files provided for agent context")]
    NoTypeSpecFiles,

    #[error("agent session has not been initialized with file context")]
    NotInitialized,

    #[error("agent operation was cancelled")]
    Cancelled,

    #[error("agent session has been disposed")]
    Disposed,
}

impl AgentError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        AgentError::Backend { operation, message: message.into() }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }
}

/// Remote indexing state of a vector store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingStatus {
    InProgress,
    Completed,
    Failed(String),
}

/// Remote state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Queued or executing.
    Pending,
    Completed,
    /// Failed, cancelled or expired remotely.
    Failed(String),
}

/// What the agent is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub model: String,
    pub name: String,
    pub instructions: String,
}

/// The agent service as a narrow capability.
///
/// Calls map one-to-one onto service requests; polling, retries and
/// lifecycle live in [`AgentSession`].
#[async_trait]
pub trait AgentBackend: Clone + Send + Sync + 'static {
    async fn upload_file(&self, name: &str, content: &str) -> Result<FileId, AgentError>;

    async fn create_vector_store(
        &self,
        name: &str,
        files: &[FileId],
    ) -> Result<VectorStoreId, AgentError>;

    async fn vector_store_status(&self, store: &VectorStoreId)
        -> Result<IndexingStatus, AgentError>;

    async fn create_agent(
        &self,
        spec: &AgentSpec,
        store: &VectorStoreId,
    ) -> Result<AgentId, AgentError>;

    async fn create_thread(&self) -> Result<ThreadId, AgentError>;

    async fn add_message(&self, thread: &ThreadId, content: &str) -> Result<(), AgentError>;

    async fn start_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<RunId, AgentError>;

    async fn run_status(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AgentError>;

    /// Text of the newest assistant message on the thread.
    async fn latest_reply(&self, thread: &ThreadId) -> Result<String, AgentError>;

    async fn delete_agent(&self, agent: &AgentId) -> Result<(), AgentError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
