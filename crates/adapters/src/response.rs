// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coercing free-form agent replies into structured results.
//!
//! Replies may be bare JSON, JSON surrounded by prose, or JSON inside a
//! markdown fence whose language tag and closing fence are both optional.
//! A fence wins over a bare object; the first fence wins over later ones.
//! Parsing is lenient about trailing commas and property-name case.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use sg_core::{PatchRequest, RuleError};
use thiserror::Error;

/// First fenced block. The closing fence may be missing.
#[allow(clippy::expect_used)]
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[a-z]*[ \t]*(.*?)(?:```|\z)").expect("constant regex pattern is valid")
});

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Agent response is empty")]
    Empty,

    #[error("Agent response is not in the expected JSON format")]
    NotJson,

    /// Malformed JSON, or a patch missing a required field.
    #[error("Agent response is not in the expected JSON format: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse an `{"errors": [{"type", "message"}]}` reply.
///
/// A missing, null or non-array `errors` yields no errors. Entries with a
/// blank type or message get sentinel values instead of being dropped.
pub fn parse_errors(response: &str) -> Result<Vec<RuleError>, ParseError> {
    let value = parse_lenient(extract_json(response)?)?;
    let Some(Value::Array(entries)) = value.get("errors") else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .map(|entry| {
            RuleError::new_or_sentinel(
                entry.get("type").and_then(Value::as_str),
                entry.get("message").and_then(Value::as_str),
            )
        })
        .collect())
}

/// Parse a `{"file", "from_version", "reason", "changes"}` reply.
pub fn parse_patch_request(response: &str) -> Result<PatchRequest, ParseError> {
    let value = parse_lenient(extract_json(response)?)?;
    Ok(serde_json::from_value(value)?)
}

/// Locate the JSON object text inside a reply.
pub fn extract_json(response: &str) -> Result<&str, ParseError> {
    if response.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let haystack = match FENCED_BLOCK.captures(response).and_then(|c| c.get(1)) {
        Some(block) => {
            let block = block.as_str().trim();
            if block.is_empty() {
                return Err(ParseError::NotJson);
            }
            block
        }
        None => response,
    };
    balanced_object(haystack).ok_or(ParseError::NotJson)
}

/// The first `{ ... }` region with balanced braces, ignoring braces in strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse allowing trailing commas, then lowercase every object key.
fn parse_lenient(json: &str) -> Result<Value, ParseError> {
    let value: Value = serde_json::from_str(&strip_trailing_commas(json))?;
    Ok(lowercase_keys(value))
}

/// Remove commas that directly precede `}` or `]`, outside string literals.
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
