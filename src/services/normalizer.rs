// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turns a raw model reply into a JSON object.
//!
//! Replies are often wrapped in markdown code fences. Anything that does not
//! parse to an object is replaced by a fixed fallback record, so callers
//! always get a usable mapping.

use serde_json::{Map, Value};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";
/// Characters of the raw reply kept in the fallback `basic_facts`.
const FALLBACK_EXCERPT_CHARS: usize = 200;

/// Normalize a raw model reply into a JSON object.
pub fn normalize_reply(raw: &str) -> Map<String, Value> {
    let candidate = extract_fenced(raw.trim());

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("Model reply is JSON but not an object, using fallback");
            fallback(raw)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Model reply is not valid JSON, using fallback");
            fallback(raw)
        }
    }
}

/// Content of a leading ```` ```json ```` or ```` ``` ```` fence, or `text`
/// unchanged when it does not start with one.
fn extract_fenced(text: &str) -> &str {
    let rest = if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        rest
    } else if let Some(rest) = text.strip_prefix(FENCE) {
        rest
    } else {
        return text;
    };

    let end = rest.find(FENCE).unwrap_or(rest.len());
    rest[..end].trim()
}

/// Fixed record used when the reply cannot be parsed.
fn fallback(raw: &str) -> Map<String, Value> {
    let basic_facts = match raw.char_indices().nth(FALLBACK_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    };

    [
        ("flower_name", "Identification Result".to_string()),
        ("scientific_name", "Unknown".to_string()),
        ("family", "Unknown".to_string()),
        ("basic_facts", basic_facts),
        (
            "care_instructions",
            "Unable to parse detailed care instructions".to_string(),
        ),
        ("symbolic_meanings", "Unable to parse symbolic meanings".to_string()),
        ("cultivation_tips", "Unable to parse cultivation tips".to_string()),
        ("seasonal_info", "Unable to parse seasonal information".to_string()),
        (
            "interesting_story",
            "Unable to parse historical information".to_string(),
        ),
        ("confidence", "Low".to_string()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), Value::String(value)))
    .collect()
}
