// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sg_core::{AgentId, FileId, RunId, ThreadId, VectorStoreId};

use super::{AgentBackend, AgentError, AgentSpec, IndexingStatus, RunStatus};

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    UploadFile { name: String },
    CreateVectorStore { files: Vec<FileId> },
    VectorStoreStatus,
    CreateAgent { spec: AgentSpec },
    CreateThread,
    AddMessage { thread: ThreadId, content: String },
    StartRun { thread: ThreadId },
    RunStatus,
    LatestReply,
    DeleteAgent { agent: AgentId },
}

#[derive(Default)]
struct FakeBackendState {
    next_id: u32,
    failing_uploads: HashSet<String>,
    indexing: VecDeque<IndexingStatus>,
    run_statuses: VecDeque<RunStatus>,
    replies: VecDeque<String>,
    fail_delete: bool,
    calls: Vec<BackendCall>,
}

impl FakeBackendState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

/// Scripted agent backend for tests.
///
/// Queued statuses and replies are consumed in order. Once a queue is
/// empty, indexing and runs complete immediately and replies are `{}`.
#[derive(Clone, Default)]
pub struct FakeAgentBackend {
    inner: Arc<Mutex<FakeBackendState>>,
}

impl FakeAgentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads of `name` fail.
    pub fn fail_upload(&self, name: &str) {
        self.inner.lock().failing_uploads.insert(name.to_string());
    }

    pub fn push_indexing(&self, status: IndexingStatus) {
        self.inner.lock().indexing.push_back(status);
    }

    pub fn push_run_status(&self, status: RunStatus) {
        self.inner.lock().run_statuses.push_back(status);
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.inner.lock().replies.push_back(reply.into());
    }

    pub fn fail_delete_agent(&self) {
        self.inner.lock().fail_delete = true;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&BackendCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches(c)).count()
    }

    /// Contents of every message added to any thread.
    pub fn messages(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::AddMessage { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl AgentBackend for FakeAgentBackend {
    async fn upload_file(&self, name: &str, _content: &str) -> Result<FileId, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::UploadFile { name: name.to_string() });
        if state.failing_uploads.contains(name) {
            return Err(AgentError::backend("upload", format!("rejected {name}")));
        }
        Ok(FileId::new(state.id("file")))
    }

    async fn create_vector_store(
        &self,
        _name: &str,
        files: &[FileId],
    ) -> Result<VectorStoreId, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::CreateVectorStore { files: files.to_vec() });
        Ok(VectorStoreId::new(state.id("vs")))
    }

    async fn vector_store_status(
        &self,
        _store: &VectorStoreId,
    ) -> Result<IndexingStatus, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::VectorStoreStatus);
        Ok(state.indexing.pop_front().unwrap_or(IndexingStatus::Completed))
    }

    async fn create_agent(
        &self,
        spec: &AgentSpec,
        _store: &VectorStoreId,
    ) -> Result<AgentId, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::CreateAgent { spec: spec.clone() });
        Ok(AgentId::new(state.id("asst")))
    }

    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::CreateThread);
        Ok(ThreadId::new(state.id("thread")))
    }

    async fn add_message(&self, thread: &ThreadId, content: &str) -> Result<(), AgentError> {
        self.inner
            .lock()
            .calls
            .push(BackendCall::AddMessage { thread: thread.clone(), content: content.to_string() });
        Ok(())
    }

    async fn start_run(&self, thread: &ThreadId, _agent: &AgentId) -> Result<RunId, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::StartRun { thread: thread.clone() });
        Ok(RunId::new(state.id("run")))
    }

    async fn run_status(&self, _thread: &ThreadId, _run: &RunId) -> Result<RunStatus, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::RunStatus);
        Ok(state.run_statuses.pop_front().unwrap_or(RunStatus::Completed))
    }

    async fn latest_reply(&self, _thread: &ThreadId) -> Result<String, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::LatestReply);
        Ok(state.replies.pop_front().unwrap_or_else(|| "{}".to_string()))
    }

    async fn delete_agent(&self, agent: &AgentId) -> Result<(), AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::DeleteAgent { agent: agent.clone() });
        if state.fail_delete {
            return Err(AgentError::backend("delete agent", "service unavailable"));
        }
        Ok(())
    }
}
