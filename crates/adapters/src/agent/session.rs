// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One conversation with the repair agent.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use sg_core::{AgentId, FileId, PatchRequest, RuleError, ThreadId, VectorStoreId};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use super::instructions::{error_analysis_prompt, DEFAULT_INSTRUCTIONS};
use super::poll::{poll_until, Polled};
use super::{AgentBackend, AgentError, AgentSpec, IndexingStatus, RunStatus};
use crate::response;

/// Timing and identity of the agent a session creates.
///
/// Run and indexing phases are tuned separately: indexing a vector store
/// takes far longer than a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    model: String,
    name: String,
    instructions: String,
    run_polling_interval: Duration,
    run_max_wait: Duration,
    indexing_polling_interval: Duration,
    indexing_max_wait: Duration,
    max_concurrent_uploads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            name: "AZC Fixer".to_string(),
            instructions: String::new(),
            run_polling_interval: Duration::from_secs(2),
            run_max_wait: Duration::from_secs(300),
            indexing_polling_interval: Duration::from_secs(5),
            indexing_max_wait: Duration::from_secs(180),
            max_concurrent_uploads: 10,
        }
    }
}

impl SessionConfig {
    sg_core::setters! {
        into {
            model: String,
            name: String,
            instructions: String,
        }
        set {
            run_polling_interval: Duration,
            run_max_wait: Duration,
            indexing_polling_interval: Duration,
            indexing_max_wait: Duration,
            max_concurrent_uploads: usize,
        }
    }

    fn agent_spec(&self) -> AgentSpec {
        let instructions = if self.instructions.trim().is_empty() {
            DEFAULT_INSTRUCTIONS.to_string()
        } else {
            self.instructions.clone()
        };
        AgentSpec { model: self.model.clone(), name: self.name.clone(), instructions }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    FilesUploaded,
    VectorStoreReady,
    ThreadCreated,
    RunInProgress,
    RunCompleted,
    RunFailed,
    RunTimedOut,
}

sg_core::simple_display! {
    SessionPhase {
        Uninitialized => "uninitialized",
        FilesUploaded => "files_uploaded",
        VectorStoreReady => "vector_store_ready",
        ThreadCreated => "thread_created",
        RunInProgress => "run_in_progress",
        RunCompleted => "run_completed",
        RunFailed => "run_failed",
        RunTimedOut => "run_timed_out",
    }
}

/// A single agent conversation: uploaded context, one thread, sequential runs.
///
/// Methods take `&mut self`, so one session serves one caller at a time.
/// The agent and thread are created on first use and reused until
/// [`dispose`](Self::dispose).
pub struct AgentSession<B: AgentBackend> {
    backend: B,
    config: SessionConfig,
    phase: SessionPhase,
    uploaded: Vec<FileId>,
    vector_store: Option<VectorStoreId>,
    agent: OnceCell<AgentId>,
    thread: OnceCell<ThreadId>,
    last_response: Option<String>,
    disposed: bool,
}

impl<B: AgentBackend> AgentSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            phase: SessionPhase::Uninitialized,
            uploaded: Vec::new(),
            vector_store: None,
            agent: OnceCell::new(),
            thread: OnceCell::new(),
            last_response: None,
            disposed: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.vector_store.is_some()
    }

    pub fn uploaded_files(&self) -> &[FileId] {
        &self.uploaded
    }

    pub fn vector_store_id(&self) -> Option<&VectorStoreId> {
        self.vector_store.as_ref()
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread.get()
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Upload the `.tsp` files among `files` and wait for them to be indexed.
    ///
    /// Individual upload failures are logged and skipped; the session fails
    /// only when nothing at all could be uploaded.
    pub async fn initialize(
        &mut self,
        files: &BTreeMap<String, String>,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        self.ensure_live()?;
        let typespec: Vec<(&String, &String)> =
            files.iter().filter(|(name, _)| is_typespec_file(name)).collect();
        if typespec.is_empty() {
            return Err(AgentError::NoTypeSpecFiles);
        }

        let attempted = typespec.len();
        let uploaded = self.upload_all(typespec, cancel).await?;
        if uploaded.is_empty() {
            return Err(AgentError::UploadFailed { attempted });
        }
        tracing::info!(uploaded = uploaded.len(), attempted, "uploaded TypeSpec files");
        self.uploaded = uploaded;
        self.phase = SessionPhase::FilesUploaded;

        let store = self.backend.create_vector_store("typespec-files", &self.uploaded).await?;
        self.wait_for_indexing(&store, cancel).await?;
        tracing::info!(vector_store = %store, "vector store ready");
        self.vector_store = Some(store);
        self.phase = SessionPhase::VectorStoreReady;
        Ok(())
    }

    /// Ask the agent to extract diagnostics from a raw compile/build log.
    pub async fn analyze_errors(
        &mut self,
        log: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RuleError>, AgentError> {
        let reply = self.send(&error_analysis_prompt(log), cancel).await?;
        Ok(response::parse_errors(&reply)?)
    }

    /// Send a fix prompt and parse the agent's patch for one file.
    pub async fn request_patch(
        &mut self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<PatchRequest, AgentError> {
        let reply = self.send(prompt, cancel).await?;
        Ok(response::parse_patch_request(&reply)?)
    }

    /// Best-effort remote cleanup. Safe to call any number of times.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(agent) = self.agent.get() {
            match self.backend.delete_agent(agent).await {
                Ok(()) => tracing::debug!(agent = %agent, "deleted agent"),
                Err(e) => tracing::warn!(agent = %agent, error = %e, "failed to delete agent"),
            }
        }
    }

    fn ensure_live(&self) -> Result<(), AgentError> {
        if self.disposed {
            Err(AgentError::Disposed)
        } else {
            Ok(())
        }
    }

    async fn upload_all(
        &self,
        files: Vec<(&String, &String)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileId>, AgentError> {
        let backend = &self.backend;
        let uploads = stream::iter(files)
            .map(|(name, content)| async move { (name, backend.upload_file(name, content).await) })
            .buffer_unordered(self.config.max_concurrent_uploads.max(1))
            .filter_map(|(name, result)| async move {
                match result {
                    Ok(id) => Some(id),
                    Err(e) => {
                        tracing::warn!(file = %name, error = %e, "skipping file that failed to upload");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            ids = uploads => Ok(ids),
        }
    }

    async fn wait_for_indexing(
        &self,
        store: &VectorStoreId,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        let backend = &self.backend;
        let polled = poll_until(
            self.config.indexing_polling_interval,
            self.config.indexing_max_wait,
            cancel,
            || async move {
                match backend.vector_store_status(store).await? {
                    IndexingStatus::InProgress => Ok(None),
                    done => Ok(Some(done)),
                }
            },
        )
        .await?;

        match polled {
            Polled::Ready(IndexingStatus::Failed(reason)) => {
                Err(AgentError::IndexingFailed { reason })
            }
            Polled::Ready(_) => Ok(()),
            Polled::TimedOut(waited) => {
                tracing::error!(vector_store = %store, waited_secs = waited.as_secs(), "indexing timed out");
                Err(AgentError::IndexingTimedOut { waited })
            }
        }
    }

    async fn ensure_thread(&mut self) -> Result<(AgentId, ThreadId), AgentError> {
        let store = self.vector_store.as_ref().ok_or(AgentError::NotInitialized)?;
        let backend = &self.backend;
        let spec = self.config.agent_spec();
        let fresh = self.thread.get().is_none();
        let agent =
            self.agent.get_or_try_init(|| async { backend.create_agent(&spec, store).await }).await?;
        let thread = self.thread.get_or_try_init(|| backend.create_thread()).await?;
        if fresh {
            tracing::info!(agent = %agent, thread = %thread, "agent thread created");
        }
        let ids = (agent.clone(), thread.clone());
        self.phase = SessionPhase::ThreadCreated;
        Ok(ids)
    }

    /// Append `prompt` to the thread, run it, and return the reply text.
    async fn send(&mut self, prompt: &str, cancel: &CancellationToken) -> Result<String, AgentError> {
        self.ensure_live()?;
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        let (agent, thread) = self.ensure_thread().await?;

        self.backend.add_message(&thread, prompt).await?;
        let run = self.backend.start_run(&thread, &agent).await?;
        self.phase = SessionPhase::RunInProgress;
        tracing::debug!(thread = %thread, run = %run, "run started");

        let backend = &self.backend;
        let polled = poll_until(
            self.config.run_polling_interval,
            self.config.run_max_wait,
            cancel,
            || {
                let (thread, run) = (&thread, &run);
                async move {
                    match backend.run_status(thread, run).await? {
                        RunStatus::Pending => Ok(None),
                        done => Ok(Some(done)),
                    }
                }
            },
        )
        .await;

        match polled {
            Ok(Polled::Ready(RunStatus::Failed(reason))) => {
                self.phase = SessionPhase::RunFailed;
                tracing::error!(thread = %thread, run = %run, %reason, "agent run failed");
                Err(AgentError::RunFailed { reason })
            }
            Ok(Polled::Ready(_)) => {
                self.phase = SessionPhase::RunCompleted;
                let reply = self.backend.latest_reply(&thread).await?;
                self.last_response = Some(reply.clone());
                Ok(reply)
            }
            Ok(Polled::TimedOut(waited)) => {
                self.phase = SessionPhase::RunTimedOut;
                tracing::error!(thread = %thread, run = %run, waited_secs = waited.as_secs(), "agent run timed out");
                Err(AgentError::RunTimedOut { waited })
            }
            Err(e) => Err(e),
        }
    }
}

/// Case-insensitive `.tsp` extension check.
fn is_typespec_file(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsp"))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
