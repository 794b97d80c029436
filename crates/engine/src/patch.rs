// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying agent-proposed line edits to TypeSpec files.

use sg_adapters::{FileStoreError, TypeSpecFileStore};
use sg_core::{ChangeKind, PatchChange, PatchRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch for {file} contains no changes")]
    NoChanges { file: String },

    #[error("{kind} of lines {start}-{end} is out of range for {file} ({lines} lines)")]
    InvalidRange { file: String, kind: ChangeKind, start: usize, end: usize, lines: usize },

    #[error("lines {start}-{end} of {file} do not match the expected content")]
    ContentMismatch { file: String, start: usize, end: usize },

    #[error(transparent)]
    Store(#[from] FileStoreError),
}

impl PatchError {
    /// The patch was computed against an older version of the file.
    pub fn is_stale(&self) -> bool {
        matches!(self, PatchError::Store(FileStoreError::Stale { .. }))
    }
}

/// Apply `request` to its file in `store`, returning the new version.
///
/// The edit is computed in memory first; nothing is written unless every
/// change applies and the file is still at `request.from_version`.
pub async fn apply_patch(
    store: &mut TypeSpecFileStore,
    request: &PatchRequest,
) -> Result<u64, PatchError> {
    let current = store
        .get(&request.file)
        .ok_or_else(|| FileStoreError::UnknownFile { name: request.file.clone() })?;
    let updated = apply_changes(&request.file, current, &request.changes)?;
    let version = store.update_if_version(&request.file, request.from_version, &updated).await?;
    tracing::info!(
        file = %request.file,
        changes = request.changes.len(),
        version,
        reason = %request.reason,
        "applied patch"
    );
    Ok(version)
}

/// Apply line-range `changes` to `content`.
///
/// Line numbers are 1-based, inclusive, and refer to `content` as given;
/// changes are applied bottom-up so they do not shift one another. At the
/// same start line, modifications and deletions apply before additions.
/// The line ending of `content` (LF or CRLF) and its trailing newline are
/// preserved.
pub fn apply_changes(
    file: &str,
    content: &str,
    changes: &[PatchChange],
) -> Result<String, PatchError> {
    if changes.is_empty() {
        return Err(PatchError::NoChanges { file: file.to_string() });
    }
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let mut ordered: Vec<&PatchChange> = changes.iter().collect();
    ordered.sort_by(|a, b| {
        let is_add = |c: &PatchChange| matches!(c.kind, ChangeKind::Add);
        b.start_line.cmp(&a.start_line).then_with(|| is_add(a).cmp(&is_add(b)))
    });

    for change in ordered {
        let (start, end) = (change.start_line, change.end_line);
        let out_of_range = || PatchError::InvalidRange {
            file: file.to_string(),
            kind: change.kind,
            start,
            end,
            lines: lines.len(),
        };
        match change.kind {
            ChangeKind::Add => {
                if start == 0 || start > lines.len() + 1 {
                    return Err(out_of_range());
                }
                let at = start - 1;
                lines.splice(at..at, change.new_content.lines().map(str::to_string));
            }
            ChangeKind::Modify | ChangeKind::Delete => {
                if start == 0 || end < start || end > lines.len() {
                    return Err(out_of_range());
                }
                let range = start - 1..end;
                if !matches_expected(&lines[range.clone()], &change.old_content) {
                    return Err(PatchError::ContentMismatch { file: file.to_string(), start, end });
                }
                let replacement: Vec<String> = match change.kind {
                    ChangeKind::Modify => change.new_content.lines().map(str::to_string).collect(),
                    _ => Vec::new(),
                };
                lines.splice(range, replacement);
            }
        }
    }

    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut updated = lines.join(newline);
    if content.ends_with('\n') && !updated.is_empty() {
        updated.push_str(newline);
    }
    Ok(updated)
}

/// Compare ignoring trailing whitespace per line. Empty `expected` matches
/// anything.
fn matches_expected(actual: &[String], expected: &str) -> bool {
    if expected.trim().is_empty() {
        return true;
    }
    let expected: Vec<&str> = expected.lines().map(str::trim_end).collect();
    actual.len() == expected.len()
        && actual.iter().zip(&expected).all(|(a, e)| a.trim_end() == *e)
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
