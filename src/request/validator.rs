//! Typed parse of a normalized task mapping into [`TaskRequest`].

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::registry::ModelRegistry;
use crate::request::normalize::normalize_legacy;
use crate::request::{Constraints, Parameters, TaskContent, TaskRequest, TaskType};
use crate::types::Message;
use crate::Result;

/// Pull the caller's task id out of a raw description, or mint one.
///
/// Extracted before validation so that even validation failures carry a task
/// id the caller can correlate.
pub fn extract_task_id(raw: &Value) -> String {
    raw.get("task_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Canonicalize a raw task description.
///
/// Applies legacy-field migration, fills parameter defaults, resolves the
/// task type (unknown tags dispatch as `chat`) and the model (unknown ids
/// resolve to the registry default). Fails only when the user prompt is
/// missing or empty after migration, or when a supplied sub-object cannot be
/// parsed at all.
pub fn validate(
    raw: Value,
    task_id: String,
    registry: &ModelRegistry,
    default_timeout: Duration,
) -> Result<TaskRequest> {
    let normalized = normalize_legacy(raw);

    let task_type = normalized
        .get("task_type")
        .and_then(Value::as_str)
        .map(TaskType::from_str_lenient)
        .unwrap_or(TaskType::Chat);
    if let Some(tag) = normalized.get("task_type").and_then(Value::as_str) {
        if task_type == TaskType::Chat && tag != "chat" {
            debug!(task_id = %task_id, requested = %tag, "unknown task type, dispatching as chat");
        }
    }

    let requested_model = normalized
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| registry.default_model().id);
    let model = registry.resolve(requested_model).id.to_string();

    let content = parse_content(normalized.get("content"))?;

    let parameters: Parameters = match normalized.get("parameters") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| Error::Validation(format!("invalid parameters: {}", e)))?,
        None => Parameters::default(),
    };

    let constraints: Constraints = match normalized.get("constraints") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| Error::Validation(format!("invalid constraints: {}", e)))?,
        None => Constraints::default(),
    };

    let timeout_seconds = normalized
        .get("timeout_seconds")
        .and_then(Value::as_u64)
        .filter(|t| *t > 0)
        .unwrap_or(default_timeout.as_secs());

    Ok(TaskRequest {
        task_id,
        task_type,
        model,
        content,
        parameters,
        constraints,
        timeout_seconds,
    })
}

fn parse_content(content: Option<&Value>) -> Result<TaskContent> {
    let content = content.and_then(Value::as_object);

    let system_prompt = content
        .and_then(|c| c.get("system_prompt"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from);

    let user_prompt = content
        .and_then(|c| c.get("user_prompt"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::Validation("user prompt is missing or empty".to_string()))?;

    // Context history: entries pass through in original order. Entries that
    // carry no textual content are dropped rather than failing the task.
    let context = content
        .and_then(|c| c.get("context"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let text = entry.get("content").and_then(Value::as_str)?;
                    let role = entry
                        .get("role")
                        .and_then(Value::as_str)
                        .unwrap_or("user");
                    Some(Message::with_role(role, text))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(TaskContent {
        system_prompt,
        user_prompt,
        context,
    })
}
