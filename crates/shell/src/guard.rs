// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-spawn validation of commands, arguments and paths.
//!
//! Every check here is pure apart from directory existence probes, so the
//! guard is safe to call from any number of tasks at once. Nothing is ever
//! spawned by a caller until the relevant check has passed.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The shell used to run script-style invocations on this platform.
#[cfg(windows)]
pub const PLATFORM_SHELL: &str = "cmd.exe";
#[cfg(not(windows))]
pub const PLATFORM_SHELL: &str = "sh";

/// Executables that may be spawned. Matching is exact and case-sensitive.
#[cfg(windows)]
pub const ALLOWED_COMMANDS: &[&str] =
    &[PLATFORM_SHELL, "cmd", "pwsh", "powershell", "dotnet", "git", "npm", "npx", "node", "tsp"];
#[cfg(not(windows))]
pub const ALLOWED_COMMANDS: &[&str] =
    &[PLATFORM_SHELL, "bash", "pwsh", "dotnet", "git", "npm", "npx", "node", "tsp"];

/// Shell chaining operators rejected anywhere in an argument string.
///
/// The check is a raw substring search, so benign text containing one of
/// these characters is rejected too. Longer operators come first so the
/// reported separator is the most specific one.
pub const DANGEROUS_SEPARATORS: &[&str] = &["&&", "||", "&", "|", ";"];

/// Characters never accepted in a validated path.
const INVALID_PATH_CHARS: &[char] = &['<', '>', '|', '"', '*', '?', '\0'];

/// Which kind of path is being validated; decides normalization and
/// whether the target must already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Local TypeSpec project directory (must exist).
    TypeSpecDirectory,
    /// Path inside a remote repository, e.g. `specification/foo/Foo`.
    RepositoryPath,
    /// SDK output directory (must exist).
    OutputDirectory,
    /// A file name relative to a validated directory.
    FileName,
}

impl PathKind {
    pub fn must_exist(self) -> bool {
        matches!(self, PathKind::TypeSpecDirectory | PathKind::OutputDirectory)
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathKind::TypeSpecDirectory => "TypeSpec directory",
            PathKind::RepositoryPath => "repository path",
            PathKind::OutputDirectory => "output directory",
            PathKind::FileName => "file name",
        })
    }
}

/// Security and input-shape failures detected before any process is spawned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardError {
    /// A required identifier was empty or whitespace.
    #[error("{name} cannot be null or empty")]
    MissingArgument { name: &'static str },

    #[error("Command '{command}' is not in the allowed commands list")]
    CommandRejected { command: String },

    #[error("Invalid path format for {kind} '{path}': {reason}")]
    PathInvalid { kind: PathKind, path: String, reason: &'static str },

    #[error("{kind} not found: {path}")]
    DirectoryNotFound { kind: PathKind, path: String },

    #[error("Arguments contain dangerous separator '{separator}'")]
    ArgumentRejected { separator: &'static str },

    #[error("Working directory does not exist: {path}")]
    WorkingDirectoryMissing { path: String },
}

/// Check that `command` is exactly one of [`ALLOWED_COMMANDS`].
pub fn validate_command(command: &str) -> Result<&str, GuardError> {
    if command.trim().is_empty() {
        return Err(GuardError::MissingArgument { name: "command" });
    }
    if ALLOWED_COMMANDS.contains(&command) {
        Ok(command)
    } else {
        Err(GuardError::CommandRejected { command: command.to_string() })
    }
}

/// Reject argument strings containing a shell chaining operator.
///
/// `None` resolves to the empty string.
pub fn validate_arguments(arguments: Option<&str>) -> Result<String, GuardError> {
    let arguments = arguments.unwrap_or_default();
    for separator in DANGEROUS_SEPARATORS {
        if arguments.contains(separator) {
            return Err(GuardError::ArgumentRejected { separator });
        }
    }
    Ok(arguments.to_string())
}

/// Resolve the working directory for a spawn.
///
/// `None` or a blank path means the current directory.
pub fn validate_working_directory(dir: Option<&Path>) -> Result<PathBuf, GuardError> {
    let dir = match dir {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => {
            return std::env::current_dir().map_err(|_| GuardError::WorkingDirectoryMissing {
                path: ".".to_string(),
            })
        }
    };
    if dir.is_dir() {
        Ok(dir.to_path_buf())
    } else {
        Err(GuardError::WorkingDirectoryMissing { path: dir.display().to_string() })
    }
}

/// Validate a path of the given kind and return its normalized form.
pub fn validate_path(path: &str, kind: PathKind) -> Result<String, GuardError> {
    let invalid = |reason| GuardError::PathInvalid { kind, path: path.to_string(), reason };

    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.contains(INVALID_PATH_CHARS) {
        return Err(invalid("contains invalid characters"));
    }
    if has_parent_segment(path) {
        return Err(invalid("path traversal is not allowed"));
    }

    match kind {
        PathKind::RepositoryPath => normalize_repository_path(path).ok_or_else(|| {
            invalid("repository paths must be relative without empty segments")
        }),
        PathKind::FileName => {
            if Path::new(path).is_absolute() || path.starts_with(['/', '\\']) {
                return Err(invalid("file names must be relative"));
            }
            Ok(path.to_string())
        }
        PathKind::TypeSpecDirectory | PathKind::OutputDirectory => {
            if kind.must_exist() && !Path::new(path).is_dir() {
                return Err(GuardError::DirectoryNotFound { kind, path: path.to_string() });
            }
            Ok(path.to_string())
        }
    }
}

/// True when any `/`- or `\`-separated segment is `..`.
fn has_parent_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Normalize separators to `/`, rejecting leading or doubled separators.
fn normalize_repository_path(path: &str) -> Option<String> {
    let normalized = path.trim().replace('\\', "/");
    if normalized.starts_with('/') || normalized.contains("//") {
        return None;
    }
    Some(normalized.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
