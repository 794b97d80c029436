// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use tempfile::TempDir;

/// A TypeSpec project dir holding `main.tsp`, plus an output dir.
fn project() -> (TempDir, String, String) {
    let root = tempfile::tempdir().unwrap();
    let spec = root.path().join("spec");
    let out = root.path().join("out");
    std::fs::create_dir_all(&spec).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(spec.join("main.tsp"), "namespace Demo;").unwrap();
    (root, spec.display().to_string(), out.display().to_string())
}

#[test]
fn local_mode_resolves_absolute_paths() {
    let (_root, spec, out) = project();
    let ctx = ValidationContext::try_new(&spec, None, &out).unwrap();

    assert_eq!(ctx.typespec_location(), spec);
    assert_eq!(ctx.commit_id(), None);
    assert!(!ctx.is_github());
    assert_eq!(ctx.sdk_dir(), Path::new(&out));
    assert_eq!(ctx.current_typespec_dir(), Some(Path::new(&spec)));
}

#[yare::parameterized(
    empty = { Some("") },
    whitespace = { Some("   ") },
    absent = { None },
)]
fn blank_commit_means_local(commit: Option<&str>) {
    let (_root, spec, out) = project();
    let ctx = ValidationContext::try_new(&spec, commit, &out).unwrap();
    assert_eq!(ctx.commit_id(), None);
}

#[test]
fn yaml_only_directory_is_a_project() {
    let (root, _spec, out) = project();
    let yaml_dir = root.path().join("yaml");
    std::fs::create_dir_all(&yaml_dir).unwrap();
    std::fs::write(yaml_dir.join("tspconfig.YAML"), "emit: []").unwrap();

    assert!(ValidationContext::try_new(&yaml_dir.display().to_string(), None, &out).is_ok());
}

#[test]
fn github_mode_keeps_repository_path() {
    let (_root, _spec, out) = project();
    let ctx =
        ValidationContext::try_new("specification\\ai\\Foo", Some("abc123"), &out).unwrap();

    assert_eq!(ctx.typespec_location(), "specification/ai/Foo");
    assert_eq!(ctx.commit_id(), Some("abc123"));
    assert!(ctx.is_github());
    assert_eq!(ctx.current_typespec_dir(), None);

    let ctx = ctx.with_working_typespec_dir("/tmp/materialized");
    assert_eq!(ctx.current_typespec_dir(), Some(Path::new("/tmp/materialized")));
}

#[yare::parameterized(
    empty = { "" },
    blank = { "  " },
)]
fn missing_typespec_path(path: &str) {
    let (_root, _spec, out) = project();
    let err = ValidationContext::try_new(path, None, &out).unwrap_err();
    assert_eq!(err.to_string(), "TypeSpec path cannot be null or empty");
}

#[yare::parameterized(
    traversal = { "../../etc" },
    invalid_chars = { "spec<>|" },
    wildcard = { "spec*?" },
)]
fn malformed_typespec_path(path: &str) {
    let (_root, _spec, out) = project();
    let err = ValidationContext::try_new(path, None, &out).unwrap_err();
    assert!(err.to_string().contains("Invalid path format"), "{err}");
}

#[test]
fn missing_typespec_directory() {
    let (root, _spec, out) = project();
    let missing = root.path().join("nope").display().to_string();
    let err = ValidationContext::try_new(&missing, None, &out).unwrap_err();
    assert!(err.to_string().contains("TypeSpec directory not found"), "{err}");
}

#[test]
fn directory_without_project_files() {
    let (root, _spec, out) = project();
    let empty = root.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();
    std::fs::write(empty.join("README.md"), "nothing").unwrap();

    let err = ValidationContext::try_new(&empty.display().to_string(), None, &out).unwrap_err();
    assert!(err.to_string().contains("No .tsp or .yaml files found in directory"));
}

#[test]
fn invalid_commit_id() {
    let (_root, _spec, out) = project();
    let err = ValidationContext::try_new("specification/foo", Some("not-hex!"), &out).unwrap_err();
    assert!(err.to_string().contains("Commit ID must be 6-40 hexadecimal characters"));
}

#[yare::parameterized(
    empty = { "", "Output directory path cannot be null or empty" },
    traversal = { "../../out", "Invalid path format" },
    missing = { "/definitely/not/here/sg", "output directory not found" },
)]
fn bad_output_dir(output: &str, expected: &str) {
    let (_root, spec, _out) = project();
    let err = ValidationContext::try_new(&spec, None, output).unwrap_err();
    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn typespec_path_checked_first() {
    let err = ValidationContext::try_new("../bad", None, "../also-bad").unwrap_err();
    assert!(matches!(err, ValidationError::Path(GuardError::PathInvalid { kind: PathKind::TypeSpecDirectory, .. })));
}

#[test]
fn commit_checked_before_output() {
    let err = ValidationContext::try_new("specification/foo", Some("zz"), "").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidCommitId { .. }));
}

#[test]
fn output_checked_last() {
    let err = ValidationContext::try_new("specification/foo", Some("abcdef"), "../out").unwrap_err();
    assert!(matches!(err, ValidationError::Path(GuardError::PathInvalid { kind: PathKind::OutputDirectory, .. })));
}

#[test]
fn from_validated_skips_checks() {
    let ctx = ValidationContext::from_validated("", "", "");
    assert_eq!(ctx.typespec_location(), "");
    assert_eq!(ctx.commit_id(), None);
    assert_eq!(ctx.sdk_dir(), Path::new(""));
}

#[yare::parameterized(
    five = { "abcde", false },
    six = { "abcdef", true },
    forty = { "0123456789abcdef0123456789ABCDEF01234567", true },
    forty_one = { "0123456789abcdef0123456789abcdef012345678", false },
    non_hex = { "abcdeg", false },
    padded = { "  abcdef  ", true },
)]
fn commit_id_boundaries(commit: &str, ok: bool) {
    assert_eq!(validate_commit_id(Some(commit)).is_ok(), ok);
}

proptest! {
    #[test]
    fn hex_of_valid_length_accepted(commit in "[0-9a-fA-F]{6,40}") {
        prop_assert_eq!(validate_commit_id(Some(&commit)), Ok(commit.clone()));
    }

    #[test]
    fn any_non_hex_char_rejected(
        head in "[0-9a-f]{3,10}",
        bad in "[g-zG-Z_!-]",
        tail in "[0-9a-f]{3,10}",
    ) {
        let commit = format!("{head}{bad}{tail}");
        prop_assert!(validate_commit_id(Some(&commit)).is_err());
    }
}
