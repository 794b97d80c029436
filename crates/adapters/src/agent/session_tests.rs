// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::{BackendCall, FakeAgentBackend};
use yare::parameterized;

fn files(names: &[&str]) -> BTreeMap<String, String> {
    names.iter().map(|n| (n.to_string(), format!("// {n}"))).collect()
}

fn config() -> SessionConfig {
    SessionConfig::default()
        .run_polling_interval(Duration::from_secs(1))
        .run_max_wait(Duration::from_secs(10))
        .indexing_polling_interval(Duration::from_secs(1))
        .indexing_max_wait(Duration::from_secs(10))
}

async fn ready_session(backend: &FakeAgentBackend) -> AgentSession<FakeAgentBackend> {
    let mut session = AgentSession::new(backend.clone(), config());
    session.initialize(&files(&["main.tsp", "client.tsp"]), &CancellationToken::new()).await.unwrap();
    session
}

const PATCH_REPLY: &str = r#"```json
{"file": "client.tsp", "from_version": 1, "reason": "rename",
 "changes": [{"type": "modify", "start_line": 2, "end_line": 2, "new_content": "model Foo {}"}]}
```"#;

#[parameterized(
    lower = { "client.tsp", true },
    upper = { "MAIN.TSP", true },
    nested = { "specs/models.Tsp", true },
    yaml = { "tspconfig.yaml", false },
    no_extension = { "tsp", false },
    suffix_only = { "client.tspx", false },
)]
fn typespec_extension(name: &str, expected: bool) {
    assert_eq!(is_typespec_file(name), expected);
}

#[test]
fn default_config_values() {
    let config = SessionConfig::default();
    let spec = config.agent_spec();
    assert_eq!(spec.model, "gpt-4o");
    assert_eq!(spec.name, "AZC Fixer");
    assert_eq!(spec.instructions, DEFAULT_INSTRUCTIONS);
    assert_eq!(config.run_max_wait, Duration::from_secs(300));
    assert_eq!(config.indexing_max_wait, Duration::from_secs(180));
}

#[test]
fn custom_instructions_replace_defaults() {
    let spec = SessionConfig::default().instructions("be brief").agent_spec();
    assert_eq!(spec.instructions, "be brief");
}

#[tokio::test]
async fn initialize_uploads_only_typespec_files() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend.clone(), config());
    let input = files(&["main.tsp", "tspconfig.yaml", "client.TSP"]);

    session.initialize(&input, &CancellationToken::new()).await.unwrap();

    assert!(session.is_initialized());
    assert_eq!(session.phase(), SessionPhase::VectorStoreReady);
    assert_eq!(session.uploaded_files().len(), 2);
    assert_eq!(backend.count(|c| matches!(c, BackendCall::UploadFile { .. })), 2);
    assert!(!backend.calls().contains(&BackendCall::UploadFile { name: "tspconfig.yaml".into() }));
}

#[tokio::test]
async fn initialize_without_typespec_files_fails() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend.clone(), config());

    let err = session.initialize(&files(&["readme.md"]), &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::NoTypeSpecFiles)));
    assert!(backend.calls().is_empty());
    assert!(!session.is_initialized());
}

#[tokio::test]
async fn failed_uploads_are_skipped() {
    let backend = FakeAgentBackend::new();
    backend.fail_upload("main.tsp");
    let mut session = AgentSession::new(backend.clone(), config());

    session.initialize(&files(&["main.tsp", "client.tsp"]), &CancellationToken::new()).await.unwrap();

    assert_eq!(session.uploaded_files().len(), 1);
    let stores: Vec<_> = backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            BackendCall::CreateVectorStore { files } => Some(files),
            _ => None,
        })
        .collect();
    assert_eq!(stores, vec![session.uploaded_files().to_vec()]);
}

#[tokio::test]
async fn all_uploads_failing_is_an_error() {
    let backend = FakeAgentBackend::new();
    backend.fail_upload("main.tsp");
    backend.fail_upload("client.tsp");
    let mut session = AgentSession::new(backend.clone(), config());

    let err = session.initialize(&files(&["main.tsp", "client.tsp"]), &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::UploadFailed { attempted: 2 })));
    assert_eq!(backend.count(|c| matches!(c, BackendCall::CreateVectorStore { .. })), 0);
}

#[tokio::test(start_paused = true)]
async fn initialize_waits_for_indexing() {
    let backend = FakeAgentBackend::new();
    backend.push_indexing(IndexingStatus::InProgress);
    backend.push_indexing(IndexingStatus::InProgress);
    let mut session = AgentSession::new(backend.clone(), config());

    session.initialize(&files(&["main.tsp"]), &CancellationToken::new()).await.unwrap();

    assert_eq!(backend.count(|c| *c == BackendCall::VectorStoreStatus), 3);
}

#[tokio::test]
async fn indexing_failure_is_reported() {
    let backend = FakeAgentBackend::new();
    backend.push_indexing(IndexingStatus::Failed("quota".into()));
    let mut session = AgentSession::new(backend.clone(), config());

    let err = session.initialize(&files(&["main.tsp"]), &CancellationToken::new()).await;

    match err {
        Err(AgentError::IndexingFailed { reason }) => assert_eq!(reason, "quota"),
        other => panic!("expected IndexingFailed, got {other:?}"),
    }
    assert!(!session.is_initialized());
}

#[tokio::test(start_paused = true)]
async fn indexing_times_out() {
    let backend = FakeAgentBackend::new();
    for _ in 0..100 {
        backend.push_indexing(IndexingStatus::InProgress);
    }
    let mut session = AgentSession::new(backend.clone(), config());

    let err = session.initialize(&files(&["main.tsp"]), &CancellationToken::new()).await;

    match err {
        Err(AgentError::IndexingTimedOut { waited }) => {
            assert!(waited >= Duration::from_secs(10));
        }
        other => panic!("expected IndexingTimedOut, got {other:?}"),
    }
}

#[tokio::test]
async fn initialize_respects_cancellation() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend, config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session.initialize(&files(&["main.tsp"]), &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
}

#[tokio::test]
async fn analyze_before_initialize_fails() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend.clone(), config());

    let err = session.analyze_errors("error AZC0012: bad", &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::NotInitialized)));
    assert_eq!(backend.count(|c| *c == BackendCall::CreateThread), 0);
}

#[tokio::test]
async fn analyze_errors_parses_reply() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    backend.push_reply(r#"{"errors": [{"type": "AZC0012", "message": "Bad name"}]}"#);

    let errors = session.analyze_errors("raw log", &CancellationToken::new()).await.unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type(), "AZC0012");
    assert_eq!(errors[0].message(), "Bad name");
    assert_eq!(session.phase(), SessionPhase::RunCompleted);
    assert!(backend.messages()[0].contains("### LOG\nraw log"));
}

#[tokio::test]
async fn thread_is_reused_across_requests() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    let cancel = CancellationToken::new();
    backend.push_reply(r#"{"errors": []}"#);
    backend.push_reply(PATCH_REPLY);

    session.analyze_errors("log", &cancel).await.unwrap();
    let first_thread = session.thread_id().cloned();
    let patch = session.request_patch("fix it", &cancel).await.unwrap();

    assert_eq!(patch.file, "client.tsp");
    assert_eq!(patch.changes.len(), 1);
    assert_eq!(session.thread_id().cloned(), first_thread);
    assert_eq!(backend.count(|c| *c == BackendCall::CreateThread), 1);
    assert_eq!(backend.count(|c| matches!(c, BackendCall::CreateAgent { .. })), 1);
    assert_eq!(backend.count(|c| matches!(c, BackendCall::StartRun { .. })), 2);
    assert_eq!(session.last_response(), Some(PATCH_REPLY));
}

#[tokio::test]
async fn agent_is_created_with_configured_spec() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend.clone(), config().model("gpt-test").name("fixer"));
    session.initialize(&files(&["main.tsp"]), &CancellationToken::new()).await.unwrap();
    backend.push_reply(r#"{"errors": []}"#);

    session.analyze_errors("log", &CancellationToken::new()).await.unwrap();

    let spec = backend
        .calls()
        .into_iter()
        .find_map(|c| match c {
            BackendCall::CreateAgent { spec } => Some(spec),
            _ => None,
        })
        .unwrap();
    assert_eq!(spec.model, "gpt-test");
    assert_eq!(spec.name, "fixer");
}

#[tokio::test(start_paused = true)]
async fn pending_runs_are_polled_until_done() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    backend.push_run_status(RunStatus::Pending);
    backend.push_run_status(RunStatus::Pending);
    backend.push_reply(r#"{"errors": []}"#);

    let errors = session.analyze_errors("log", &CancellationToken::new()).await.unwrap();

    assert!(errors.is_empty());
    assert_eq!(backend.count(|c| *c == BackendCall::RunStatus), 3);
}

#[tokio::test]
async fn failed_run_is_reported() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    backend.push_run_status(RunStatus::Failed("server_error".into()));

    let err = session.request_patch("fix", &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::RunFailed { reason }) if reason == "server_error"));
    assert_eq!(session.phase(), SessionPhase::RunFailed);
    assert_eq!(backend.count(|c| *c == BackendCall::LatestReply), 0);
}

#[tokio::test(start_paused = true)]
async fn run_times_out() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    for _ in 0..100 {
        backend.push_run_status(RunStatus::Pending);
    }

    let err = session.request_patch("fix", &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::RunTimedOut { .. })));
    assert_eq!(session.phase(), SessionPhase::RunTimedOut);
}

#[tokio::test(start_paused = true)]
async fn run_polling_stops_on_cancel() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    for _ in 0..100 {
        backend.push_run_status(RunStatus::Pending);
    }
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let err = session.request_patch("fix", &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(backend.count(|c| *c == BackendCall::RunStatus) < 10);
}

#[tokio::test]
async fn unparseable_reply_is_a_parse_error() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    backend.push_reply("I could not find anything to fix.");

    let err = session.request_patch("fix", &CancellationToken::new()).await;

    assert!(matches!(err, Err(AgentError::Parse(_))));
    assert_eq!(session.last_response(), Some("I could not find anything to fix."));
}

#[tokio::test]
async fn dispose_deletes_agent_once() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    backend.push_reply(r#"{"errors": []}"#);
    session.analyze_errors("log", &CancellationToken::new()).await.unwrap();

    session.dispose().await;
    session.dispose().await;

    assert_eq!(backend.count(|c| matches!(c, BackendCall::DeleteAgent { .. })), 1);
}

#[tokio::test]
async fn dispose_without_agent_makes_no_calls() {
    let backend = FakeAgentBackend::new();
    let mut session = AgentSession::new(backend.clone(), config());

    session.dispose().await;

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn dispose_tolerates_delete_failure() {
    let backend = FakeAgentBackend::new();
    backend.fail_delete_agent();
    let mut session = ready_session(&backend).await;
    backend.push_reply(r#"{"errors": []}"#);
    session.analyze_errors("log", &CancellationToken::new()).await.unwrap();

    session.dispose().await;

    assert_eq!(backend.count(|c| matches!(c, BackendCall::DeleteAgent { .. })), 1);
}

#[tokio::test]
async fn disposed_session_rejects_requests() {
    let backend = FakeAgentBackend::new();
    let mut session = ready_session(&backend).await;
    session.dispose().await;

    let cancel = CancellationToken::new();
    assert!(matches!(session.request_patch("fix", &cancel).await, Err(AgentError::Disposed)));
    assert!(matches!(
        session.initialize(&files(&["main.tsp"]), &cancel).await,
        Err(AgentError::Disposed)
    ));
}
