// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::RuleError;

/// Proptest strategies for diagnostics.
pub mod strategies {
    use crate::RuleError;
    use proptest::prelude::*;

    /// Diagnostic codes shaped like analyzer and compiler ids.
    pub fn arb_error_type() -> impl Strategy<Value = String> {
        prop_oneof!["AZC[0-9]{4}", "CS[0-9]{4}", "[A-Z][a-zA-Z]{2,12}"]
    }

    /// Single-line messages without leading or trailing whitespace.
    pub fn arb_message() -> impl Strategy<Value = String> {
        "[A-Za-z0-9'][A-Za-z0-9 '.,()]{0,40}[A-Za-z0-9'.)]"
    }

    pub fn arb_rule_error() -> impl Strategy<Value = RuleError> {
        (arb_error_type(), arb_message()).prop_filter_map("blank field", |(ty, msg)| {
            RuleError::try_new(&ty, &msg)
        })
    }
}

/// Build a diagnostic from known-good literals.
#[allow(clippy::expect_used)]
pub fn rule_error(error_type: &str, message: &str) -> RuleError {
    RuleError::try_new(error_type, message).expect("test diagnostic fields are non-blank")
}
