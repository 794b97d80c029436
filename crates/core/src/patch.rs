// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-proposed edit batches for a single TypeSpec file.

use serde::{Deserialize, Serialize};

/// One edit batch for one file.
///
/// `from_version` is the store version the agent based its edits on; the
/// applier rejects the batch when the file has moved on since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRequest {
    pub file: String,
    pub from_version: u64,
    pub reason: String,
    pub changes: Vec<PatchChange>,
}

/// How a [`PatchChange`] edits its line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Replace lines `start..=end` with `new_content`.
    #[serde(alias = "replace")]
    Modify,
    /// Insert `new_content` before line `start`; `end` is ignored.
    #[serde(alias = "insert")]
    Add,
    /// Remove lines `start..=end`.
    #[serde(alias = "remove")]
    Delete,
}

crate::simple_display! {
    ChangeKind {
        Modify => "modify",
        Add => "add",
        Delete => "delete",
    }
}

/// A single line-range edit. Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Expected current text of the range; empty skips verification.
    #[serde(default)]
    pub old_content: String,
    #[serde(default)]
    pub new_content: String,
}

crate::builder! {
    pub struct PatchChangeBuilder => PatchChange {
        into {
            old_content: String = "",
            new_content: String = "",
        }
        set {
            kind: ChangeKind = ChangeKind::Modify,
            start_line: usize = 1,
            end_line: usize = 1,
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
