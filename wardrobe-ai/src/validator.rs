//! Response validation for semi-structured model output
//!
//! Models wrap JSON in code fences, prepend prose, or append commentary.
//! Parsing goes: strip fences, try a direct parse, then a single string- and
//! escape-aware scan for the first balanced top-level array/object that parses.
//! Every function here is total: malformed input yields `None`, never a panic.

use serde_json::{Map, Value};
use tracing::debug;

/// Parse `raw` and accept it only as an array of exactly `expected_count` elements
pub fn parse_and_validate(raw: &str, expected_count: usize) -> Option<Vec<Value>> {
    match parse_lenient(raw)? {
        Value::Array(items) if items.len() == expected_count => Some(items),
        Value::Array(items) => {
            debug!(
                expected = expected_count,
                actual = items.len(),
                "Rejecting array with wrong element count"
            );
            None
        }
        _ => None,
    }
}

/// Parse `raw` and accept it only as an object containing every key in `expected_keys`
///
/// Extra keys are tolerated.
pub fn parse_object(raw: &str, expected_keys: &[&str]) -> Option<Map<String, Value>> {
    match parse_lenient(raw)? {
        Value::Object(map) => {
            if let Some(missing) = expected_keys.iter().find(|k| !map.contains_key(**k)) {
                debug!(key = *missing, "Rejecting object with missing key");
                return None;
            }
            Some(map)
        }
        _ => None,
    }
}

/// Best-effort JSON extraction from model text
pub fn parse_lenient(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    first_balanced_value(cleaned)
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}

/// Single pass over `text` for the first balanced top-level array/object that parses
///
/// A balanced span that is not valid JSON (prose like "[note]") is skipped and
/// the scan resumes after it. A mismatched closer discards the open span.
fn first_balanced_value(text: &str) -> Option<Value> {
    let mut stack: Vec<char> = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if !stack.is_empty() => in_string = true,
            '[' | '{' => {
                if stack.is_empty() {
                    start = i;
                }
                stack.push(if c == '[' { ']' } else { '}' });
            }
            ']' | '}' if !stack.is_empty() => {
                if stack.pop() != Some(c) {
                    stack.clear();
                    continue;
                }
                if stack.is_empty() {
                    let span = &text[start..i + c.len_utf8()];
                    match serde_json::from_str::<Value>(span) {
                        Ok(value) => return Some(value),
                        Err(_) => debug!(offset = start, "Skipping balanced span that is not JSON"),
                    }
                }
            }
            _ => {}
        }
    }

    None
}
