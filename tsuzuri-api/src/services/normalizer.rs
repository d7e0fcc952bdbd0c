//! Model output normalization
//!
//! Generative models wrap JSON in markdown fences and vary the top-level
//! shape. [`normalize`] strips the fence and coerces the payload into a list.

use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";

/// Model text that could not be parsed as JSON. Carries the raw text untouched.
#[derive(Debug, Clone, Error)]
#[error("model output is not valid JSON: {reason}")]
pub struct MalformedModelOutput {
    pub raw: String,
    pub reason: String,
}

/// Strip a leading "```lang\n" and a trailing "```", only at the boundaries.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        // Language tag runs to the first newline
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => strip_inline_tag(rest),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// On a single-line fence, a tag counts only when it starts with a letter
/// and is followed by whitespace (```` ```json [1]``` ````).
fn strip_inline_tag(rest: &str) -> &str {
    match rest.split_once(char::is_whitespace) {
        Some((tag, body))
            if tag.starts_with(|c: char| c.is_ascii_alphabetic())
                && tag.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            body
        }
        _ => rest,
    }
}

/// Parse model output into a list of values.
///
/// - a list is returned as is
/// - an object with a `data` or `items` list yields that list
/// - any other object or scalar is wrapped in a one-element list
pub fn normalize(raw: &str) -> Result<Vec<Value>, MalformedModelOutput> {
    let body = strip_code_fence(raw);

    let parsed: Value = serde_json::from_str(body).map_err(|e| MalformedModelOutput {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    Ok(into_list(parsed))
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["data", "items"] {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return items;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}
