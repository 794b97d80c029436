// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    client_first = { client_analyzer_provider(), "AZC0001" },
    client_last = { client_analyzer_provider(), "AZC0020" },
    management_first = { management_analyzer_provider(), "AZC0030" },
    management_last = { management_analyzer_provider(), "AZC0035" },
    undefined_name = { compiler_error_provider(), "CS0103" },
    missing_interface = { compiler_error_provider(), "CS0535" },
)]
fn provider_handles_its_codes(provider: RuleTableProvider, code: &str) {
    assert!(provider.handles(code));
}

#[parameterized(
    client_gap = { client_analyzer_provider(), "AZC0021" },
    management_for_client = { management_analyzer_provider(), "AZC0012" },
    compiler_unknown = { compiler_error_provider(), "CS9999" },
)]
fn provider_ignores_other_codes(provider: RuleTableProvider, code: &str) {
    assert!(!provider.handles(code));
}

#[test]
fn fix_carries_code_message_and_guidance() {
    let error = RuleError::try_new("AZC0012", "Type name 'Client' is too generic").unwrap();

    let fixes = client_analyzer_provider().fixes(&error);

    assert_eq!(fixes.len(), 1);
    match &fixes[0] {
        Fix::RuleBased { error_type, patch_description } => {
            assert_eq!(error_type, "AZC0012");
            assert!(patch_description.starts_with("AZC0012: Type name 'Client' is too generic."));
            assert!(patch_description.contains("@clientName"));
        }
        other => panic!("expected rule-based fix, got {other:?}"),
    }
}

#[test]
fn lower_case_code_keeps_original_spelling() {
    let error = RuleError::try_new("cs0103", "The name 'x' does not exist").unwrap();

    let fixes = compiler_error_provider().fixes(&error);

    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].summary(), "cs0103");
}

#[test]
fn unknown_code_yields_no_fixes() {
    let error = RuleError::try_new("AZC0099", "unknown").unwrap();
    assert!(client_analyzer_provider().fixes(&error).is_empty());
}
