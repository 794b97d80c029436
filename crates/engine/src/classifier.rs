// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extracting `error <TYPE>: <MESSAGE>` diagnostics from tool output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};
use sg_core::RuleError;
use sg_shell::ExecError;

/// `error <TYPE>: <MESSAGE>`, case-insensitive on the word "error". A match
/// never crosses a line break; the message runs to the end of the line.
#[allow(clippy::expect_used)]
static ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\berror[ \t]+([A-Za-z0-9_]*)[ \t]*:[ \t]*([^\r\n]*)")
        .expect("constant regex pattern is valid")
});

/// Stateless diagnostic extractor. Cheap to copy and safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Lazily scan `text` for diagnostics, skipping malformed matches and
    /// repeats. Blank input yields nothing.
    pub fn parse<'t>(&self, text: &'t str) -> Diagnostics<'t> {
        if text.trim().is_empty() {
            tracing::warn!("No error output to analyze, nothing to parse");
        }
        Diagnostics { matches: ERROR_PATTERN.captures_iter(text), seen: HashSet::new() }
    }

    /// Collected, deduplicated diagnostics of `text`.
    pub fn classify(&self, text: &str) -> Vec<RuleError> {
        let errors: Vec<RuleError> = self.parse(text).collect();
        if !errors.is_empty() {
            tracing::info!("Found {} potential error matches", errors.len());
        }
        errors
    }

    /// Diagnostics carried by a failed tool invocation, scanning stdout
    /// and stderr. Failures without captured output yield nothing.
    pub fn classify_failure(&self, error: &ExecError) -> Vec<RuleError> {
        match error {
            ExecError::ProcessFailed { .. } => self.classify(&error.diagnostic()),
            _ => Vec::new(),
        }
    }
}

/// Iterator over the distinct diagnostics of one text, in first-seen order.
pub struct Diagnostics<'t> {
    matches: CaptureMatches<'static, 't>,
    seen: HashSet<RuleError>,
}

impl Iterator for Diagnostics<'_> {
    type Item = RuleError;

    fn next(&mut self) -> Option<RuleError> {
        for caps in self.matches.by_ref() {
            let error_type = caps.get(1).map_or("", |m| m.as_str());
            let message = caps.get(2).map_or("", |m| m.as_str());
            let Some(error) = RuleError::try_new(error_type, message) else { continue };
            if self.seen.insert(error.clone()) {
                return Some(error);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
