// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sg-core: data model shared by the SDK generation and repair pipeline

pub mod macros;

pub mod fix;
pub mod id;
pub mod patch;
pub mod rule_error;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use fix::Fix;
pub use id::{short, AgentId, FileId, RunId, ThreadId, VectorStoreId};
#[cfg(any(test, feature = "test-support"))]
pub use patch::PatchChangeBuilder;
pub use patch::{ChangeKind, PatchChange, PatchRequest};
pub use rule_error::{RuleError, NO_MESSAGE_PROVIDED, UNSPECIFIED_ERROR_TYPE};
pub use validation::{validate_commit_id, ValidationContext, ValidationError};
