// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The validate-and-repair engine.
//!
//! [`RepairOrchestrator`] drives bounded attempts of compile then build.
//! Failures are classified into rule errors, mapped to fixes by the
//! [`FixProviderRegistry`] (or handed to the agent when no provider knows
//! them), turned into agent patch requests and applied to the file store.

mod classifier;
mod generation;
mod patch;
mod prompt;
pub mod provider;
mod repair;

pub use classifier::{Diagnostics, ErrorClassifier};
pub use generation::{
    GenerationConfig, GenerationSteps, DEFAULT_EMITTER_PACKAGE, DEFAULT_GENERATION_SCRIPT,
};
pub use patch::{apply_changes, apply_patch, PatchError};
pub use prompt::{fix_prompt, PromptError};
pub use provider::{
    client_analyzer_provider, compiler_error_provider, management_analyzer_provider, FixProvider,
    FixProviderRegistry, FixProviderSet, RuleTableProvider,
};
pub use repair::{
    FailureReason, RepairConfig, RepairDeps, RepairError, RepairOrchestrator, RepairOutcome,
    DEFAULT_MAX_ATTEMPTS,
};
