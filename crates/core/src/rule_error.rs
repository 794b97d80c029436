// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured diagnostics extracted from tool output.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stand-in type for agent-reported errors that arrive without one.
pub const UNSPECIFIED_ERROR_TYPE: &str = "UnspecifiedError";

/// Stand-in message for agent-reported errors that arrive without one.
pub const NO_MESSAGE_PROVIDED: &str = "No message provided";

/// A `(type, message)` diagnostic such as `AZC0012: Type name 'Client' is too generic`.
///
/// Both fields are trimmed and non-empty. Equality is structural, which is
/// what deduplication relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl RuleError {
    /// Build from raw fields, or `None` when either is blank after trimming.
    pub fn try_new(error_type: &str, message: &str) -> Option<Self> {
        let error_type = error_type.trim();
        let message = message.trim();
        if error_type.is_empty() || message.is_empty() {
            return None;
        }
        Some(Self { error_type: error_type.to_string(), message: message.to_string() })
    }

    /// Build from agent-reported fields, replacing blanks with sentinels.
    pub fn new_or_sentinel(error_type: Option<&str>, message: Option<&str>) -> Self {
        let pick = |value: Option<&str>, fallback: &str| match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => fallback.to_string(),
        };
        Self {
            error_type: pick(error_type, UNSPECIFIED_ERROR_TYPE),
            message: pick(message, NO_MESSAGE_PROVIDED),
        }
    }

    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

#[cfg(test)]
#[path = "rule_error_tests.rs"]
mod tests;
