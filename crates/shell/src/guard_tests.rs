// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[yare::parameterized(
    pwsh = { "pwsh" },
    git = { "git" },
    dotnet = { "dotnet" },
    npm = { "npm" },
    npx = { "npx" },
    platform_shell = { PLATFORM_SHELL },
)]
fn allowed_commands_pass(command: &str) {
    assert_eq!(validate_command(command), Ok(command));
}

#[yare::parameterized(
    rm = { "rm" },
    curl = { "curl" },
    uppercase_git = { "GIT" },
    path_prefixed = { "/usr/bin/git" },
    padded = { " git" },
)]
fn other_commands_rejected(command: &str) {
    let err = validate_command(command).unwrap_err();
    assert!(matches!(err, GuardError::CommandRejected { .. }));
    assert!(err.to_string().contains("not in the allowed commands list"));
}

#[test]
fn blank_command_is_missing_argument() {
    assert_eq!(validate_command("  "), Err(GuardError::MissingArgument { name: "command" }));
}

#[yare::parameterized(
    and_chain = { "build && rm -rf /", "&&" },
    or_chain = { "build || true", "||" },
    background = { "build & evil", "&" },
    pipe = { "build | tee log", "|" },
    semicolon = { "build; evil", ";" },
)]
fn separators_rejected(arguments: &str, separator: &str) {
    let err = validate_arguments(Some(arguments)).unwrap_err();
    assert!(
        matches!(err, GuardError::ArgumentRejected { separator: s } if s == separator),
        "{err}"
    );
}

#[test]
fn none_arguments_become_empty() {
    assert_eq!(validate_arguments(None), Ok(String::new()));
}

#[test]
fn plain_arguments_pass_through() {
    assert_eq!(validate_arguments(Some("build -c Release")), Ok("build -c Release".to_string()));
}

#[test]
fn missing_working_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let err = validate_working_directory(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Working directory does not exist"));
}

#[test]
fn no_working_directory_means_current() {
    let resolved = validate_working_directory(None).unwrap();
    assert_eq!(resolved, std::env::current_dir().unwrap());
}

#[test]
fn existing_working_directory_passes() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(validate_working_directory(Some(dir.path())).unwrap(), dir.path());
}

#[yare::parameterized(
    traversal = { "../../etc" },
    inner_traversal = { "specs/../secret" },
    backslash_traversal = { "specs\\..\\secret" },
    angle = { "spec<x>" },
    pipe = { "spec|x" },
    quote = { "spec\"x" },
    star = { "spec*" },
    question = { "spec?" },
    blank = { "   " },
)]
fn malformed_paths_rejected(path: &str) {
    for kind in [PathKind::RepositoryPath, PathKind::FileName, PathKind::TypeSpecDirectory] {
        let err = validate_path(path, kind).unwrap_err();
        assert!(matches!(err, GuardError::PathInvalid { .. }), "{kind}: {err}");
        assert!(err.to_string().contains("Invalid path format"));
    }
}

#[test]
fn repository_path_normalizes_separators() {
    assert_eq!(
        validate_path("specification\\ai\\Foo\\", PathKind::RepositoryPath),
        Ok("specification/ai/Foo".to_string())
    );
}

#[yare::parameterized(
    leading = { "/specification/ai" },
    leading_backslash = { "\\specification\\ai" },
    doubled = { "specification//ai" },
)]
fn repository_path_rejects_empty_segments(path: &str) {
    assert!(matches!(
        validate_path(path, PathKind::RepositoryPath),
        Err(GuardError::PathInvalid { kind: PathKind::RepositoryPath, .. })
    ));
}

#[test]
fn file_name_must_be_relative() {
    assert!(validate_path("/etc/passwd", PathKind::FileName).is_err());
    assert_eq!(validate_path("models/main.tsp", PathKind::FileName), Ok("models/main.tsp".into()));
}

#[test]
fn directory_kinds_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().display().to_string();
    assert_eq!(validate_path(&existing, PathKind::OutputDirectory), Ok(existing.clone()));

    let missing = dir.path().join("missing").display().to_string();
    let err = validate_path(&missing, PathKind::TypeSpecDirectory).unwrap_err();
    assert!(matches!(err, GuardError::DirectoryNotFound { kind: PathKind::TypeSpecDirectory, .. }));
    assert!(err.to_string().contains("TypeSpec directory not found"));
}

proptest! {
    #[test]
    fn any_argument_with_a_separator_is_rejected(
        prefix in "[a-z -]{0,12}",
        sep in prop::sample::select(DANGEROUS_SEPARATORS),
        suffix in "[a-z -]{0,12}",
    ) {
        let arguments = format!("{prefix}{sep}{suffix}");
        prop_assert!(validate_arguments(Some(&arguments)).is_err());
    }

    #[test]
    fn separator_free_arguments_round_trip(arguments in "[a-zA-Z0-9 ./=_-]{0,40}") {
        prop_assert_eq!(validate_arguments(Some(&arguments)), Ok(arguments.clone()));
    }

    #[test]
    fn any_dotdot_segment_is_rejected(
        head in "[a-z]{1,8}",
        tail in "[a-z]{1,8}",
    ) {
        let path = format!("{head}/../{tail}");
        prop_assert!(validate_path(&path, PathKind::RepositoryPath).is_err());
    }
}
