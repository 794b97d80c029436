// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent backend over an assistants-style REST API (files, vector stores,
//! assistants, threads and runs).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sg_core::{AgentId, FileId, RunId, ThreadId, VectorStoreId};

use super::{AgentBackend, AgentError, AgentSpec, IndexingStatus, RunStatus};

/// Per-request timeout; long waits happen in the session's polling loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error bodies are truncated to this many characters.
const MAX_ERROR_BODY_LEN: usize = 200;

#[derive(Clone)]
pub struct HttpAgentBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpAgentBackend {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::backend("client setup", e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, AgentError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| AgentError::backend(operation, e.to_string()))?;
        let status = response.status();
        let body =
            response.text().await.map_err(|e| AgentError::backend(operation, e.to_string()))?;
        if !status.is_success() {
            return Err(AgentError::backend(
                operation,
                format!("HTTP {}: {}", status, sg_core::short(&body, MAX_ERROR_BODY_LEN)),
            ));
        }
        serde_json::from_str(&body)
            .map_err(|e| AgentError::backend(operation, format!("unexpected response: {e}")))
    }
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LastError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl LastError {
    fn describe(&self, fallback: &str) -> String {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.to_string(),
            (Some(code), None) => code.to_string(),
            (None, None) => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VectorStoreObject {
    status: String,
    #[serde(default)]
    file_counts: Option<FileCounts>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileCounts {
    #[serde(default)]
    in_progress: u64,
    #[serde(default)]
    failed: u64,
    #[serde(default)]
    completed: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunObject {
    status: String,
    #[serde(default)]
    last_error: Option<LastError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextValue {
    value: String,
}

/// A store is done only when every file finished indexing; any failed file
/// fails the whole store.
pub(crate) fn indexing_status(store: &VectorStoreObject) -> IndexingStatus {
    let counts = store.file_counts.as_ref();
    match store.status.as_str() {
        "in_progress" => IndexingStatus::InProgress,
        "completed" => match counts {
            Some(c) if c.failed > 0 => IndexingStatus::Failed(format!(
                "{} of {} files failed to index",
                c.failed,
                c.failed + c.completed + c.in_progress
            )),
            Some(c) if c.in_progress > 0 => IndexingStatus::InProgress,
            _ => IndexingStatus::Completed,
        },
        other => IndexingStatus::Failed(format!("vector store is {other}")),
    }
}

pub(crate) fn run_status(run: &RunObject) -> RunStatus {
    match run.status.as_str() {
        "queued" | "in_progress" | "cancelling" => RunStatus::Pending,
        "completed" => RunStatus::Completed,
        other => {
            let fallback = format!("run ended with status {other}");
            let reason = run.last_error.as_ref().map_or(fallback.clone(), |e| e.describe(&fallback));
            RunStatus::Failed(reason)
        }
    }
}

/// Concatenated text blocks of the newest assistant message.
pub(crate) fn reply_text(messages: &MessageList) -> Option<String> {
    let message = messages.data.iter().find(|m| m.role == "assistant")?;
    let parts: Vec<&str> = message
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_ref().map(|t| t.value.as_str()))
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

#[async_trait]
impl AgentBackend for HttpAgentBackend {
    async fn upload_file(&self, name: &str, content: &str) -> Result<FileId, AgentError> {
        let part = Part::bytes(content.as_bytes().to_vec()).file_name(name.to_string());
        let form = Form::new().text("purpose", "assistants").part("file", part);
        let created: Created =
            self.call("upload", self.client.post(self.url("files")).multipart(form)).await?;
        tracing::debug!(file = %name, id = %created.id, "uploaded file");
        Ok(FileId::new(created.id))
    }

    async fn create_vector_store(
        &self,
        name: &str,
        files: &[FileId],
    ) -> Result<VectorStoreId, AgentError> {
        let ids: Vec<&str> = files.iter().map(FileId::as_str).collect();
        let body = json!({ "name": name, "file_ids": ids });
        let created: Created = self
            .call("create vector store", self.client.post(self.url("vector_stores")).json(&body))
            .await?;
        Ok(VectorStoreId::new(created.id))
    }

    async fn vector_store_status(
        &self,
        store: &VectorStoreId,
    ) -> Result<IndexingStatus, AgentError> {
        let object: VectorStoreObject = self
            .call(
                "get vector store",
                self.client.get(self.url(&format!("vector_stores/{store}"))),
            )
            .await?;
        Ok(indexing_status(&object))
    }

    async fn create_agent(
        &self,
        spec: &AgentSpec,
        store: &VectorStoreId,
    ) -> Result<AgentId, AgentError> {
        let body = json!({
            "model": spec.model,
            "name": spec.name,
            "instructions": spec.instructions,
            "tools": [{ "type": "file_search" }],
            "tool_resources": { "file_search": { "vector_store_ids": [store.as_str()] } },
        });
        let created: Created =
            self.call("create agent", self.client.post(self.url("assistants")).json(&body)).await?;
        Ok(AgentId::new(created.id))
    }

    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let created: Created = self
            .call("create thread", self.client.post(self.url("threads")).json(&json!({})))
            .await?;
        Ok(ThreadId::new(created.id))
    }

    async fn add_message(&self, thread: &ThreadId, content: &str) -> Result<(), AgentError> {
        let body = json!({ "role": "user", "content": content });
        let _: Created = self
            .call(
                "add message",
                self.client.post(self.url(&format!("threads/{thread}/messages"))).json(&body),
            )
            .await?;
        Ok(())
    }

    async fn start_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<RunId, AgentError> {
        let body = json!({ "assistant_id": agent.as_str() });
        let created: Created = self
            .call(
                "start run",
                self.client.post(self.url(&format!("threads/{thread}/runs"))).json(&body),
            )
            .await?;
        Ok(RunId::new(created.id))
    }

    async fn run_status(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AgentError> {
        let object: RunObject = self
            .call("get run", self.client.get(self.url(&format!("threads/{thread}/runs/{run}"))))
            .await?;
        Ok(run_status(&object))
    }

    async fn latest_reply(&self, thread: &ThreadId) -> Result<String, AgentError> {
        let request = self
            .client
            .get(self.url(&format!("threads/{thread}/messages")))
            .query(&[("order", "desc"), ("limit", "1")]);
        let messages: MessageList = self.call("list messages", request).await?;
        reply_text(&messages)
            .ok_or_else(|| AgentError::backend("list messages", "no assistant reply on thread"))
    }

    async fn delete_agent(&self, agent: &AgentId) -> Result<(), AgentError> {
        let _: serde_json::Value = self
            .call("delete agent", self.client.delete(self.url(&format!("assistants/{agent}"))))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
