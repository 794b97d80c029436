// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning a [`Fix`] into the prompt that asks the agent for a patch.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sg_core::Fix;
use thiserror::Error;

const NO_CONTEXT: &str = "No additional context provided";

const SYSTEM_INSTRUCTIONS: &str = "\
### SYSTEM INSTRUCTIONS
You are fixing TypeSpec files and produce a valid, compilable result that follows Azure SDK guidelines.
- All files are available via the FileSearchTool. Retrieve a file's content by name before editing it.
- Prefer changes to client.tsp. Only edit main.tsp when the error is inside it.
- Make the smallest change that resolves the error.";

const RESPONSE_FORMAT: &str = r#"### RESPONSE FORMAT
You MUST respond with ONLY a JSON object in the following exact format:
{
    "file": "client.tsp",
    "from_version": 1,
    "reason": "why the change resolves the error",
    "changes": [
        {"type": "modify", "start_line": 10, "end_line": 12, "old_content": "current lines", "new_content": "replacement lines"}
    ]
}
"type" is one of "modify", "add" or "delete". Line numbers are 1-based and inclusive.
"from_version" must be the version listed for the file below.
Do not include explanations or any text outside of this JSON object."#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("agent prompt fix has an empty prompt")]
    EmptyPrompt,
}

/// Build the patch-request prompt for `fix`.
///
/// `versions` lists the current version of every editable file so the
/// agent can quote it back in `from_version`.
pub fn fix_prompt(fix: &Fix, versions: &BTreeMap<String, u64>) -> Result<String, PromptError> {
    let (instruction, context) = match fix {
        Fix::AgentPrompt { prompt, context } => {
            if prompt.trim().is_empty() {
                return Err(PromptError::EmptyPrompt);
            }
            (prompt.as_str(), context.as_deref())
        }
        Fix::RuleBased { patch_description, .. } => (patch_description.as_str(), None),
    };
    let context = context.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(NO_CONTEXT);

    let mut prompt = String::with_capacity(2048);
    prompt.push_str(SYSTEM_INSTRUCTIONS);
    let _ = write!(prompt, "\n\n### SPECIFIC FIX TO APPLY\n{}\n\n### CONTEXT\n{}\n\n", instruction.trim(), context);
    prompt.push_str(RESPONSE_FORMAT);
    if !versions.is_empty() {
        prompt.push_str("\n\n### FILE VERSIONS\n");
        for (file, version) in versions {
            let _ = writeln!(prompt, "- {file}: {version}");
        }
    }
    prompt.push_str("\nNow apply this fix following the system instructions above.");
    Ok(prompt)
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
