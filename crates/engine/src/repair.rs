// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bounded compile → build → analyze → fix loop.

use std::collections::BTreeMap;

use sg_adapters::{AgentBackend, AgentError, AgentSession, FileStoreError, TypeSpecFileStore};
use sg_core::{Fix, RuleError, ValidationContext};
use sg_shell::{ExecError, ProcessSpawner};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::classifier::ErrorClassifier;
use crate::generation::{has_build_target, GenerationConfig, GenerationSteps};
use crate::patch::{apply_patch, PatchError};
use crate::prompt::fix_prompt;
use crate::provider::FixProviderSet;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Log tail handed to the agent as context for an agent-derived fix.
const MAX_CONTEXT_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum RepairError {
    /// Rejected or unspawnable invocation; never retried.
    #[error(transparent)]
    Exec(ExecError),

    #[error(transparent)]
    Store(#[from] FileStoreError),

    #[error("repair was cancelled")]
    Cancelled,
}

impl RepairError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RepairError::Cancelled)
    }
}

/// Why a repair run gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Neither the providers nor the agent produced a fix.
    NoFixes,
    /// Fixes existed but none could be turned into an applied patch.
    NothingApplied,
    RetryBudgetExhausted,
}

sg_core::simple_display! {
    FailureReason {
        NoFixes => "no fixes could be generated",
        NothingApplied => "no fix could be applied",
        RetryBudgetExhausted => "retry budget exhausted",
    }
}

#[derive(Debug)]
pub enum RepairOutcome {
    Succeeded { attempts: u32 },
    /// `failure` is the last compile or build failure, kept verbatim.
    Failed { attempts: u32, reason: FailureReason, failure: Option<ExecError> },
}

impl RepairOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RepairOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairConfig {
    max_attempts: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl RepairConfig {
    sg_core::setters! {
        set {
            max_attempts: u32,
        }
    }
}

/// Collaborators of the repair loop.
pub struct RepairDeps<P: ProcessSpawner, B: AgentBackend, F: FixProviderSet> {
    pub spawner: P,
    pub session: AgentSession<B>,
    pub providers: F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Compile,
    Build,
}

sg_core::simple_display! {
    Phase {
        Compile => "compile",
        Build => "build",
    }
}

pub struct RepairOrchestrator<P: ProcessSpawner, B: AgentBackend, F: FixProviderSet> {
    steps: GenerationSteps<P>,
    session: AgentSession<B>,
    providers: F,
    classifier: ErrorClassifier,
    config: RepairConfig,
}

impl<P, B, F> RepairOrchestrator<P, B, F>
where
    P: ProcessSpawner,
    B: AgentBackend,
    F: FixProviderSet,
{
    pub fn new(deps: RepairDeps<P, B, F>, generation: GenerationConfig, config: RepairConfig) -> Self {
        Self {
            steps: GenerationSteps::new(deps.spawner, generation),
            session: deps.session,
            providers: deps.providers,
            classifier: ErrorClassifier::new(),
            config,
        }
    }

    pub fn session(&self) -> &AgentSession<B> {
        &self.session
    }

    /// Run attempts until compile and build both succeed or the budget is
    /// spent. The agent session is disposed before returning.
    pub async fn run(
        &mut self,
        context: &ValidationContext,
        store: &mut TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<RepairOutcome, RepairError> {
        let result = self.run_attempts(context, store, cancel).await;
        self.session.dispose().await;
        result
    }

    async fn run_attempts(
        &mut self,
        context: &ValidationContext,
        store: &mut TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<RepairOutcome, RepairError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            let span = tracing::info_span!("repair.attempt", attempt, max_attempts);
            let step = self.attempt(context, store, cancel).instrument(span).await?;
            match step {
                AttemptResult::Passed => {
                    tracing::info!(attempts = attempt, "compile and build succeeded");
                    return Ok(RepairOutcome::Succeeded { attempts: attempt });
                }
                AttemptResult::GaveUp { reason, failure } => {
                    return Ok(RepairOutcome::Failed {
                        attempts: attempt,
                        reason,
                        failure: Some(failure),
                    });
                }
                AttemptResult::Patched { failure } => last_failure = Some(failure),
            }
        }

        tracing::error!(max_attempts, "repair budget exhausted");
        Ok(RepairOutcome::Failed {
            attempts: max_attempts,
            reason: FailureReason::RetryBudgetExhausted,
            failure: last_failure,
        })
    }

    async fn attempt(
        &mut self,
        context: &ValidationContext,
        store: &mut TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<AttemptResult, RepairError> {
        let compile_failure = match self.steps.compile(context, cancel).await {
            Ok(_) => None,
            Err(e) => Some(expected_failure(e)?),
        };
        // After a failed compile the build still runs against the output of
        // an earlier generation, if there is one.
        let build_failure = if compile_failure.is_none() || has_build_target(context.sdk_dir()) {
            self.steps.build(context, cancel).await.err().map(expected_failure).transpose()?
        } else {
            None
        };

        let failures: Vec<(Phase, ExecError)> = [
            compile_failure.map(|e| (Phase::Compile, e)),
            build_failure.map(|e| (Phase::Build, e)),
        ]
        .into_iter()
        .flatten()
        .collect();

        // Compile fixes come first.
        let mut fixes = Vec::new();
        for (phase, error) in &failures {
            tracing::warn!(%phase, error = %error, "generation step failed");
            fixes.extend(self.fixes_for(*phase, error, store, cancel).await?);
        }
        let Some((_, failure)) = failures.into_iter().next() else {
            return Ok(AttemptResult::Passed);
        };

        if fixes.is_empty() {
            tracing::error!("No fixable error, skipping error analysis");
            return Ok(AttemptResult::GaveUp { reason: FailureReason::NoFixes, failure });
        }
        tracing::info!("Total fixes generated: {}", fixes.len());

        let applied = self.apply_fixes(&fixes, store, cancel).await?;
        if applied == 0 {
            return Ok(AttemptResult::GaveUp { reason: FailureReason::NothingApplied, failure });
        }
        tracing::info!(applied, total = fixes.len(), "applied fixes");
        Ok(AttemptResult::Patched { failure })
    }

    /// Registry fixes for the diagnostics in `error`; agent-derived fixes
    /// when the registry has none.
    async fn fixes_for(
        &mut self,
        phase: Phase,
        error: &ExecError,
        store: &TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<Vec<Fix>, RepairError> {
        let log = error.diagnostic();
        let mut errors = self.classifier.classify_failure(error);
        if errors.is_empty() {
            tracing::info!(%phase, "Falling back to AI agent analysis");
            errors = self.agent_errors(&log, store, cancel).await?;
        }

        let fixes = self.providers.fixes_for(&errors);
        if !fixes.is_empty() {
            return Ok(fixes);
        }
        let context = log_excerpt(&log);
        Ok(errors.iter().map(|e| agent_fix(e, &context)).collect())
    }

    async fn agent_errors(
        &mut self,
        log: &str,
        store: &TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<Vec<RuleError>, RepairError> {
        let result: Result<Vec<RuleError>, AgentError> = async {
            if !self.session.is_initialized() {
                self.session.initialize(&store.contents(), cancel).await?;
            }
            self.session.analyze_errors(log, cancel).await
        }
        .await;
        agent_result(result, "agent error analysis failed").map(Option::unwrap_or_default)
    }

    /// Returns how many fixes were applied.
    async fn apply_fixes(
        &mut self,
        fixes: &[Fix],
        store: &mut TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<usize, RepairError> {
        if !self.session.is_initialized() {
            let result = self.session.initialize(&store.contents(), cancel).await;
            if agent_result(result, "agent initialization failed")?.is_none() {
                return Ok(0);
            }
        }

        let mut applied = 0;
        for fix in fixes {
            if self.apply_fix(fix, store, cancel).await? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Ask the agent for a patch implementing `fix` and apply it. A patch
    /// based on an outdated file is re-requested once.
    async fn apply_fix(
        &mut self,
        fix: &Fix,
        store: &mut TypeSpecFileStore,
        cancel: &CancellationToken,
    ) -> Result<bool, RepairError> {
        for retry in [false, true] {
            let prompt = match fix_prompt(fix, &versions(store)) {
                Ok(prompt) => prompt,
                Err(e) => {
                    tracing::warn!(fix = fix.summary(), error = %e, "skipping fix");
                    return Ok(false);
                }
            };
            let result = self.session.request_patch(&prompt, cancel).await;
            let Some(patch) = agent_result(result, "agent patch request failed")? else {
                return Ok(false);
            };
            match apply_patch(store, &patch).await {
                Ok(_) => return Ok(true),
                Err(e) if e.is_stale() && !retry => {
                    tracing::info!(file = %patch.file, "patch was based on an old version, requesting again");
                }
                Err(PatchError::Store(e @ FileStoreError::Io { .. })) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(fix = fix.summary(), error = %e, "could not apply patch");
                    return Ok(false);
                }
            }
        }
        Ok(false)
    }
}

enum AttemptResult {
    Passed,
    Patched { failure: ExecError },
    GaveUp { reason: FailureReason, failure: ExecError },
}

/// Keep failures the repair loop can act on; cancellation and rejected
/// invocations end the run.
fn expected_failure(error: ExecError) -> Result<ExecError, RepairError> {
    match error {
        ExecError::Cancelled => Err(RepairError::Cancelled),
        e @ (ExecError::ProcessFailed { .. } | ExecError::TimedOut { .. }) => Ok(e),
        e => Err(RepairError::Exec(e)),
    }
}

/// Agent failures end only the current fallback; cancellation ends the run.
fn agent_result<T>(result: Result<T, AgentError>, what: &str) -> Result<Option<T>, RepairError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_cancelled() => Err(RepairError::Cancelled),
        Err(e) => {
            tracing::warn!(error = %e, "{what}");
            Ok(None)
        }
    }
}

fn agent_fix(error: &RuleError, context: &str) -> Fix {
    Fix::agent_prompt(
        format!("Resolve {}: {}", error.error_type(), error.message()),
        Some(context.to_string()),
    )
}

fn versions(store: &TypeSpecFileStore) -> BTreeMap<String, u64> {
    store
        .file_names()
        .filter_map(|name| store.version(name).map(|v| (name.to_string(), v)))
        .collect()
}

/// Last [`MAX_CONTEXT_CHARS`] characters of `log`.
fn log_excerpt(log: &str) -> String {
    let total = log.chars().count();
    if total <= MAX_CONTEXT_CHARS {
        return log.to_string();
    }
    log.chars().skip(total - MAX_CONTEXT_CHARS).collect()
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
