// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run inputs, validated once and then shared read-only.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use sg_shell::{validate_path, GuardError, PathKind};
use thiserror::Error;

/// Commit ids are abbreviated or full hex SHAs.
#[allow(clippy::expect_used)]
static COMMIT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{6,40}$").expect("constant regex pattern is valid"));

/// Extensions that mark a directory as a TypeSpec project.
const PROJECT_EXTENSIONS: &[&str] = &["tsp", "yaml"];

/// Input shape failures, reported before any side effect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("TypeSpec path cannot be null or empty")]
    TypeSpecPathMissing,

    #[error("No .tsp or .yaml files found in directory: {path}")]
    NoTypeSpecFiles { path: String },

    #[error("Commit ID must be 6-40 hexadecimal characters, got '{commit_id}'")]
    InvalidCommitId { commit_id: String },

    #[error("Output directory path cannot be null or empty")]
    OutputPathMissing,

    /// Traversal, invalid characters, malformed repository path, or a
    /// directory that does not exist.
    #[error(transparent)]
    Path(#[from] GuardError),
}

/// Validate an optional commit id; blank means local mode and yields `""`.
pub fn validate_commit_id(commit_id: Option<&str>) -> Result<String, ValidationError> {
    let commit_id = commit_id.map(str::trim).unwrap_or_default();
    if commit_id.is_empty() {
        return Ok(String::new());
    }
    if COMMIT_ID.is_match(commit_id) {
        Ok(commit_id.to_string())
    } else {
        Err(ValidationError::InvalidCommitId { commit_id: commit_id.to_string() })
    }
}

/// Already-validated TypeSpec location, commit id and SDK output directory.
///
/// Built once per run and passed by reference; nothing downstream
/// re-validates these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    typespec_location: String,
    commit_id: String,
    sdk_dir: PathBuf,
    working_typespec_dir: Option<PathBuf>,
}

impl ValidationContext {
    /// Validate raw inputs in order: TypeSpec path, commit id, output path.
    ///
    /// With a commit id the TypeSpec path is a repository path; without one
    /// it is a local directory that must hold `.tsp` or `.yaml` files.
    pub fn try_new(
        typespec_path: &str,
        commit_id: Option<&str>,
        output_dir: &str,
    ) -> Result<Self, ValidationError> {
        if typespec_path.trim().is_empty() {
            return Err(ValidationError::TypeSpecPathMissing);
        }
        let local = commit_id.is_none_or(|c| c.trim().is_empty());
        let typespec_location = if local {
            validate_local_project(typespec_path)?
        } else {
            validate_path(typespec_path, PathKind::RepositoryPath)?
        };

        let commit_id = validate_commit_id(commit_id)?;

        if output_dir.trim().is_empty() {
            return Err(ValidationError::OutputPathMissing);
        }
        let sdk_dir = absolute(&validate_path(output_dir, PathKind::OutputDirectory)?);

        tracing::info!(
            typespec = %typespec_location,
            commit = %commit_id,
            sdk_dir = %sdk_dir.display(),
            "All input validation completed successfully"
        );
        Ok(Self { typespec_location, commit_id, sdk_dir, working_typespec_dir: None })
    }

    /// Wrap values the caller has already validated. No checks run.
    pub fn from_validated(
        typespec_location: impl Into<String>,
        commit_id: impl Into<String>,
        sdk_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            typespec_location: typespec_location.into(),
            commit_id: commit_id.into(),
            sdk_dir: sdk_dir.into(),
            working_typespec_dir: None,
        }
    }

    /// Point compilation and edits at `dir` (e.g. a download of the remote spec).
    pub fn with_working_typespec_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_typespec_dir = Some(dir.into());
        self
    }

    /// Local directory path, or repository-relative path in GitHub mode.
    pub fn typespec_location(&self) -> &str {
        &self.typespec_location
    }

    /// The commit id, or `None` in local mode.
    pub fn commit_id(&self) -> Option<&str> {
        Some(self.commit_id.as_str()).filter(|c| !c.is_empty())
    }

    pub fn is_github(&self) -> bool {
        self.commit_id().is_some()
    }

    pub fn sdk_dir(&self) -> &Path {
        &self.sdk_dir
    }

    /// Directory whose TypeSpec files are compiled and edited this run.
    ///
    /// `None` in GitHub mode until the remote files have been materialized.
    pub fn current_typespec_dir(&self) -> Option<&Path> {
        match &self.working_typespec_dir {
            Some(dir) => Some(dir),
            None if !self.is_github() => Some(Path::new(&self.typespec_location)),
            None => None,
        }
    }
}

fn validate_local_project(path: &str) -> Result<String, ValidationError> {
    let dir = validate_path(path, PathKind::TypeSpecDirectory)?;
    if !has_project_files(Path::new(&dir)) {
        return Err(ValidationError::NoTypeSpecFiles { path: dir });
    }
    Ok(absolute(&dir).display().to_string())
}

fn has_project_files(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry.path().is_file()
            && entry.path().extension().and_then(|e| e.to_str()).is_some_and(|ext| {
                PROJECT_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p))
            })
    })
}

/// Absolute form of an existing path; falls back to the input when the
/// filesystem cannot resolve it.
fn absolute(path: &str) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
