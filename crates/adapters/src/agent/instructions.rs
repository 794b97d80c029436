// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in prompt text for the repair agent.

/// Agent instructions used when configuration leaves them empty.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You repair TypeSpec projects that fail to compile or whose generated C# SDK fails to build.
Your goal is to resolve analyzer (AZC) and TypeSpec compilation errors in the TypeSpec files and produce a valid, compilable result that follows Azure SDK and TypeSpec guidelines.

### SYSTEM INSTRUCTIONS
- Every TypeSpec file is available through the FileSearchTool. Retrieve file content by file name before editing.
- Prefer changes to client.tsp; leave main.tsp untouched unless the error is inside it.
- Make the smallest change that resolves the error.";

/// Prompt asking the agent to extract diagnostics from a raw log.
pub(crate) fn error_analysis_prompt(log: &str) -> String {
    format!(
        "Analyze the following compile or build log and list every distinct error.\n\
         You MUST respond with ONLY a JSON object of the form \
         {{\"errors\": [{{\"type\": \"<error code>\", \"message\": \"<error message>\"}}]}}.\n\
         Respond with {{\"errors\": []}} if the log contains no errors.\n\n\
         ### LOG\n{log}"
    )
}
