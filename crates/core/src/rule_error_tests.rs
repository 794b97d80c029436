// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    plain = { "AZC0012", "Type name 'Client' is too generic", "AZC0012", "Type name 'Client' is too generic" },
    padded = { "  AZC0001 ", "  msg  ", "AZC0001", "msg" },
)]
fn try_new_trims(ty: &str, msg: &str, want_ty: &str, want_msg: &str) {
    let err = RuleError::try_new(ty, msg).unwrap();
    assert_eq!(err.error_type(), want_ty);
    assert_eq!(err.message(), want_msg);
}

#[yare::parameterized(
    empty_type = { "", "msg" },
    blank_type = { "   ", "msg" },
    empty_message = { "AZC0001", "" },
    blank_message = { "AZC0001", " \t" },
)]
fn try_new_rejects_blank(ty: &str, msg: &str) {
    assert_eq!(RuleError::try_new(ty, msg), None);
}

#[yare::parameterized(
    both_missing = { None, None, UNSPECIFIED_ERROR_TYPE, NO_MESSAGE_PROVIDED },
    blank_type = { Some(" "), Some("boom"), UNSPECIFIED_ERROR_TYPE, "boom" },
    blank_message = { Some("CS0103"), Some(""), "CS0103", NO_MESSAGE_PROVIDED },
    complete = { Some("CS0103"), Some("boom"), "CS0103", "boom" },
)]
fn sentinels_fill_blanks(ty: Option<&str>, msg: Option<&str>, want_ty: &str, want_msg: &str) {
    let err = RuleError::new_or_sentinel(ty, msg);
    assert_eq!(err.error_type(), want_ty);
    assert_eq!(err.message(), want_msg);
}

#[test]
fn equality_is_structural() {
    assert_eq!(RuleError::try_new("A", "m"), RuleError::try_new(" A", "m "));
    assert_ne!(RuleError::try_new("A", "m"), RuleError::try_new("B", "m"));
}

#[test]
fn serializes_with_type_key() {
    let err = RuleError::try_new("AZC0001", "bad").unwrap();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json, serde_json::json!({"type": "AZC0001", "message": "bad"}));
    assert_eq!(err.to_string(), "AZC0001: bad");
}
