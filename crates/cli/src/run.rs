// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sg` and `sg validate`.

use anyhow::{Context, Result};
use sg_adapters::{AgentSession, GitHubSource, HttpAgentBackend, TypeSpecFileStore};
use sg_core::ValidationContext;
use sg_engine::{
    FixProviderRegistry, GenerationSteps, RepairDeps, RepairError, RepairOrchestrator,
    RepairOutcome,
};
use sg_shell::ProcessRunner;
use tokio_util::sync::CancellationToken;

use crate::args::{InputArgs, RepairArgs};
use crate::config::AppSettings;
use crate::exit_error::ExitError;

pub fn validate_inputs(input: &InputArgs) -> Result<ValidationContext, ExitError> {
    ValidationContext::try_new(
        input.typespec_dir.as_deref().unwrap_or_default(),
        input.commit_id.as_deref(),
        input.output_dir.as_deref().unwrap_or_default(),
    )
    .map_err(|e| ExitError::invalid_input(e.to_string()))
}

/// Print the resolved context without touching anything.
pub fn validate(input: &InputArgs) -> Result<()> {
    let context = validate_inputs(input)?;
    print!("{}", describe(&context));
    Ok(())
}

pub(crate) fn describe(context: &ValidationContext) -> String {
    let mode = if context.is_github() { "github" } else { "local" };
    let mut out = format!("mode: {mode}\ntypespec: {}\n", context.typespec_location());
    if let Some(commit) = context.commit_id() {
        out.push_str(&format!("commit: {commit}\n"));
    }
    out.push_str(&format!("output: {}\n", context.sdk_dir().display()));
    out
}

/// Validate, stage the TypeSpec files, then run the repair loop.
pub async fn repair(args: &RepairArgs, settings: &AppSettings, cancel: CancellationToken) -> Result<()> {
    let context = validate_inputs(&args.input)?;

    let endpoint = settings.agent.endpoint.as_deref().ok_or_else(|| {
        ExitError::invalid_input(
            "agent endpoint is not configured (set SG_AGENT_ENDPOINT or agent.endpoint)",
        )
    })?;
    let backend = HttpAgentBackend::new(endpoint, settings.agent.api_key.as_deref().unwrap_or_default())
        .map_err(|e| ExitError::invalid_input(e.to_string()))?;

    let spawner = ProcessRunner::new();
    let (context, mut store) = stage_files(context, settings, &spawner, &cancel).await?;

    let deps = RepairDeps {
        spawner,
        session: AgentSession::new(backend, settings.session_config()),
        providers: FixProviderRegistry::with_defaults(),
    };
    let mut orchestrator =
        RepairOrchestrator::new(deps, settings.generation_config(), settings.repair_config());

    match orchestrator.run(&context, &mut store, &cancel).await {
        Ok(RepairOutcome::Succeeded { attempts }) => {
            println!("Compile and build succeeded after {attempts} attempt(s)");
            Ok(())
        }
        Ok(RepairOutcome::Failed { attempts, reason, failure }) => {
            if let Some(failure) = failure {
                eprintln!("{failure}");
                let diagnostic = failure.diagnostic();
                if !diagnostic.trim().is_empty() {
                    eprintln!("{}", diagnostic.trim_end());
                }
            }
            Err(ExitError::failure(format!("repair failed after {attempts} attempt(s): {reason}")).into())
        }
        Err(RepairError::Cancelled) => Err(ExitError::cancelled().into()),
        Err(e) => Err(anyhow::Error::new(e).context("repair aborted")),
    }
}

/// GitHub runs download the remote files into a temporary working
/// directory; local runs install the toolchain and edit files in place.
async fn stage_files(
    context: ValidationContext,
    settings: &AppSettings,
    spawner: &ProcessRunner,
    cancel: &CancellationToken,
) -> Result<(ValidationContext, TypeSpecFileStore)> {
    if let Some(commit) = context.commit_id() {
        let github = &settings.github;
        let source =
            GitHubSource::with_api_url(&github.api_url, &github.spec_repository, github.token.clone())?;
        let files = source
            .fetch_typespec_files(commit, context.typespec_location(), cancel)
            .await
            .map_err(|e| match e {
                sg_adapters::GitHubError::Cancelled => anyhow::Error::new(ExitError::cancelled()),
                e => anyhow::Error::new(e).context("fetching TypeSpec files"),
            })?;
        if files.is_empty() {
            return Err(ExitError::invalid_input(format!(
                "no .tsp files found in {} at {commit}",
                context.typespec_location()
            ))
            .into());
        }
        let store =
            TypeSpecFileStore::materialize(context.sdk_dir(), context.typespec_location(), files).await?;
        let context = context.with_working_typespec_dir(store.root());
        return Ok((context, store));
    }

    let steps = GenerationSteps::new(*spawner, settings.generation_config());
    steps.install_dependencies(cancel).await.map_err(|e| {
        if e.is_cancelled() {
            anyhow::Error::new(ExitError::cancelled())
        } else {
            anyhow::Error::new(e).context("installing TypeSpec dependencies")
        }
    })?;

    let dir = context.current_typespec_dir().context("local run without a TypeSpec directory")?;
    let store = TypeSpecFileStore::load(dir).await?;
    Ok((context, store))
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
