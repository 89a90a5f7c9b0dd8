//! Final response envelope assembly.
//!
//! Wraps provider output (or a classified failure) together with the task id,
//! elapsed wall-clock time and a completion timestamp. For structured task
//! types the provider text is parsed best-effort: a parse failure is not an
//! operation failure — the generation itself succeeded — so the raw text is
//! returned under `raw_output` instead of being silently coerced.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::{Completion, TokenUsage};
use crate::error::Error;
use crate::request::TaskType;

/// The response shape handed back to the surrounding service.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub success: bool,
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    /// Elapsed wall-clock seconds, rounded to two decimal places.
    pub processing_time: f64,
    /// RFC 3339 completion timestamp.
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl TaskReport {
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).expect("report serialization is infallible")
    }
}

/// Package a completed generation.
pub fn success(
    task_id: String,
    task_type: TaskType,
    completion: Completion,
    expects_structured: bool,
    elapsed: Duration,
) -> TaskReport {
    let data = payload(&completion.text, expects_structured);
    TaskReport {
        success: true,
        task_id,
        task_type: Some(task_type.as_str()),
        model_used: Some(completion.model_used),
        data: Some(data),
        usage: Some(completion.usage),
        finish_reason: Some(completion.finish_reason),
        error: None,
        processing_time: round2(elapsed),
        completed_at: Utc::now().to_rfc3339(),
    }
}

/// Package a classified failure.
pub fn failure(task_id: String, error: &Error, elapsed: Duration) -> TaskReport {
    TaskReport {
        success: false,
        task_id,
        task_type: None,
        model_used: None,
        data: None,
        usage: None,
        finish_reason: None,
        error: Some(ErrorReport {
            kind: error.kind(),
            message: error.to_string(),
        }),
        processing_time: round2(elapsed),
        completed_at: Utc::now().to_rfc3339(),
    }
}

fn payload(text: &str, expects_structured: bool) -> Value {
    if !expects_structured {
        return json!({ "result": text });
    }
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(parsed) if parsed.is_object() || parsed.is_array() => parsed,
        _ => json!({ "raw_output": text }),
    }
}

fn round2(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
