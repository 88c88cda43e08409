// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON extraction from model responses.
//!
//! Responses may wrap the object in markdown fences, surround it with prose,
//! or be cut off by the output token limit. Strategies, in order:
//! 1. a ```` ```json ```` fenced block
//! 2. any fenced block
//! 3. an unclosed ```` ```json ```` block, repaired
//! 4. the span from the first `{` to the last `}`
//! 5. everything from the first `{`, repaired
//! 6. the whole text

use crate::generate::GenerateError;
use regex::Regex;
use rp_core::ArtifactTriple;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const PREVIEW_CHARS: usize = 500;
const TRIPLE_KEYS: [&str; 3] = ["html", "css", "js"];

#[allow(clippy::expect_used)]
static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static KEY_OPENERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TRIPLE_KEYS
        .iter()
        .map(|key| {
            let re = Regex::new(&format!(r#""{key}"\s*:\s*""#))
                .expect("constant regex pattern is valid");
            (*key, re)
        })
        .collect()
});

fn parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Decode a JSON string body starting just after its opening quote. Stops at
/// the closing quote or the end of input; `None` if nothing was read.
fn read_string_value(text: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '"' => return Some(out),
            c => out.push(c),
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Recover `html`/`css`/`js` string values from JSON that may be truncated.
pub fn repair_truncated(text: &str) -> Option<Value> {
    if let Some(value) = parse(text) {
        return Some(value);
    }
    let mut repaired = Map::new();
    for (key, opener) in KEY_OPENERS.iter() {
        let Some(m) = opener.find(text) else { continue };
        if let Some(value) = read_string_value(&text[m.end()..]) {
            repaired.insert((*key).to_string(), Value::String(value));
        }
    }
    if repaired.is_empty() {
        return None;
    }
    tracing::info!(keys = ?repaired.keys().collect::<Vec<_>>(), "repaired truncated response JSON");
    Some(Value::Object(repaired))
}

/// Find the JSON value carried by a model response.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(value) = JSON_FENCE.captures(text).and_then(|c| parse(c.get(1)?.as_str())) {
        return Some(value);
    }
    if let Some(value) = ANY_FENCE.captures(text).and_then(|c| parse(c.get(1)?.as_str())) {
        return Some(value);
    }
    if let Some(start) = text.find("```json") {
        if let Some(value) = repair_truncated(text[start + "```json".len()..].trim()) {
            return Some(value);
        }
    }
    let first_brace = text.find('{');
    if let (Some(start), Some(end)) = (first_brace, text.rfind('}')) {
        if end > start {
            if let Some(value) = parse(&text[start..=end]) {
                return Some(value);
            }
        }
    }
    if let Some(start) = first_brace {
        if let Some(value) = repair_truncated(&text[start..]) {
            return Some(value);
        }
    }
    parse(text)
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Extract and validate an artifact triple from response text.
pub fn parse_triple(text: &str) -> Result<ArtifactTriple, GenerateError> {
    let value = extract_json(text).ok_or_else(|| GenerateError::Extract(preview(text)))?;
    Ok(ArtifactTriple::from_value(&value)?)
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
