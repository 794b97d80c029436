// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failures `sg` reports before the repair loop starts.

use crate::prelude::*;

fn run_args(project: &Project) -> Vec<String> {
    vec![
        "--typespec-dir".to_string(),
        project.spec_dir(),
        "--output-dir".to_string(),
        project.sdk_dir(),
    ]
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

#[test]
fn missing_agent_endpoint_is_invalid_input() {
    let project = Project::typespec();
    let args = run_args(&project);

    cli().args(&as_strs(&args)).exits(2).stderr_has("agent endpoint is not configured");
}

#[test]
fn invalid_inputs_fail_before_settings_matter() {
    let project = Project::empty();

    cli()
        .args(&["--typespec-dir", &project.spec_dir(), "--output-dir", &project.sdk_dir()])
        .env("SG_AGENT_ENDPOINT", "http://127.0.0.1:9")
        .exits(2)
        .stderr_has("No .tsp or .yaml files found in directory");
}

#[test]
fn unknown_settings_key_is_invalid_input() {
    let project = Project::typespec();
    let config = project.file("sg.toml", "[agent]\nmodle = \"gpt-4o\"\n");
    let mut args = run_args(&project);
    args.extend(["--config".to_string(), config.display().to_string()]);

    cli().args(&as_strs(&args)).exits(2).stderr_has("invalid settings file");
}

#[test]
fn unparseable_env_setting_is_invalid_input() {
    let project = Project::typespec();
    let args = run_args(&project);

    cli()
        .args(&as_strs(&args))
        .env("SG_MAX_ATTEMPTS", "lots")
        .exits(2)
        .stderr_has("invalid value for SG_MAX_ATTEMPTS");
}

#[test]
fn zero_max_attempts_is_a_usage_error() {
    let project = Project::typespec();
    let mut args = run_args(&project);
    args.extend(["--max-attempts".to_string(), "0".to_string()]);

    cli().args(&as_strs(&args)).exits(2).stderr_has("--max-attempts");
}
