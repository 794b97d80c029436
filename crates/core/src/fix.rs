// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remediations produced from diagnostics.

use serde::{Deserialize, Serialize};

/// An actionable remediation for one diagnostic.
///
/// Batches keep insertion order: compile-phase fixes come before
/// build-phase fixes and are never reprioritized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fix {
    /// Deterministic remediation from a registered provider.
    RuleBased { error_type: String, patch_description: String },
    /// Free-form instruction for the agent, with optional supporting context.
    AgentPrompt { prompt: String, context: Option<String> },
}

impl Fix {
    pub fn rule_based(error_type: impl Into<String>, patch_description: impl Into<String>) -> Self {
        Fix::RuleBased { error_type: error_type.into(), patch_description: patch_description.into() }
    }

    pub fn agent_prompt(prompt: impl Into<String>, context: Option<String>) -> Self {
        Fix::AgentPrompt { prompt: prompt.into(), context }
    }

    /// Short label for logs.
    pub fn summary(&self) -> &str {
        match self {
            Fix::RuleBased { error_type, .. } => error_type,
            Fix::AgentPrompt { prompt, .. } => prompt,
        }
    }
}
