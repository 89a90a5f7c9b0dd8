//! Legacy-field migration over the raw task mapping.
//!
//! Older callers send `prompt` and `role` at the top level instead of the
//! structured `content` object. These pure functions rewrite such mappings
//! into the new shape before the typed parse. Legacy fields never overwrite
//! explicit new-style fields.

use serde_json::{Map, Value};

/// Rewrite a raw task description into the canonical field layout.
///
/// - non-object input becomes an empty mapping (validation then fails on the
///   missing prompt),
/// - a missing `content` object is created,
/// - top-level `prompt` moves to `content.user_prompt` if that is unset,
/// - top-level `role` becomes a `content.system_prompt` sentence if that is
///   unset.
pub fn normalize_legacy(raw: Value) -> Value {
    let mut map = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if !map.get("content").map(Value::is_object).unwrap_or(false) {
        map.insert("content".to_string(), Value::Object(Map::new()));
    }

    let legacy_prompt = take_string(&mut map, "prompt");
    let legacy_role = take_string(&mut map, "role");

    let content = map
        .get_mut("content")
        .and_then(Value::as_object_mut)
        .expect("content object was just ensured");

    if let Some(prompt) = legacy_prompt {
        if !has_nonempty_string(content, "user_prompt") {
            content.insert("user_prompt".to_string(), Value::String(prompt));
        }
    }

    if let Some(role) = legacy_role {
        if !has_nonempty_string(content, "system_prompt") {
            content.insert(
                "system_prompt".to_string(),
                Value::String(role_sentence(&role)),
            );
        }
    }

    Value::Object(map)
}

/// The system-prompt sentence a legacy `role` field expands to.
pub fn role_sentence(role: &str) -> String {
    format!("You are acting as role: {}.", role)
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        // Non-string legacy values are dropped, not coerced.
        Some(_) | None => None,
    }
}

fn has_nonempty_string(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key)
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}
