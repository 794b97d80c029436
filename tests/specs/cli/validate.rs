// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sg validate` resolves the run inputs without side effects.

use crate::prelude::*;

#[test]
fn local_project_is_accepted() {
    let project = Project::typespec();

    cli()
        .args(&["validate", "--typespec-dir", &project.spec_dir(), "--output-dir", &project.sdk_dir()])
        .passes()
        .stdout_has("mode: local")
        .stdout_has(&format!("typespec: {}", project.spec_dir()))
        .stdout_lacks("commit:")
        .stderr_has("All input validation completed successfully");
}

#[test]
fn github_location_with_commit_is_accepted() {
    let project = Project::empty();

    cli()
        .args(&[
            "validate",
            "--typespec-dir",
            "specification/ai/Face",
            "--commit-id",
            "0123abcd",
            "--output-dir",
            &project.sdk_dir(),
        ])
        .passes()
        .stdout_has("mode: github")
        .stdout_has("commit: 0123abcd");
}

#[test]
fn missing_typespec_dir_is_invalid_input() {
    let project = Project::empty();

    cli()
        .args(&["validate", "--output-dir", &project.sdk_dir()])
        .exits(2)
        .stderr_has("TypeSpec path cannot be null or empty");
}

#[test]
fn directory_without_typespec_files_is_rejected() {
    let project = Project::empty();
    project.file("spec/readme.md", "# nothing here\n");

    cli()
        .args(&["validate", "--typespec-dir", &project.spec_dir(), "--output-dir", &project.sdk_dir()])
        .exits(2)
        .stderr_has("No .tsp or .yaml files found in directory");
}

#[test]
fn malformed_commit_id_is_rejected() {
    let project = Project::empty();

    cli()
        .args(&[
            "validate",
            "--typespec-dir",
            "specification/ai/Face",
            "--commit-id",
            "not-a-sha",
            "--output-dir",
            &project.sdk_dir(),
        ])
        .exits(2)
        .stderr_has("Commit ID must be 6-40 hexadecimal characters");
}

#[test]
fn traversal_in_output_dir_is_rejected() {
    let project = Project::typespec();

    cli()
        .args(&["validate", "--typespec-dir", &project.spec_dir(), "--output-dir", "../outside"])
        .exits(2)
        .stderr_has("Invalid path format");
}
