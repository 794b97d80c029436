// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

use crate::prelude::*;

#[test]
fn sg_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn sg_help_lists_run_inputs() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--typespec-dir")
        .stdout_has("--commit-id")
        .stdout_has("--output-dir")
        .stdout_has("--max-attempts")
        .stdout_has("validate");
}

#[test]
fn sg_validate_help_shows_usage() {
    cli().args(&["validate", "--help"]).passes().stdout_has("Usage:").stdout_lacks("--max-attempts");
}

#[test]
fn sg_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn unknown_flag_is_a_usage_error() {
    cli().args(&["--frobnicate"]).exits(2).stderr_has("--frobnicate");
}
