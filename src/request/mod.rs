//! Canonical task request and its validation.
//!
//! Inbound task descriptions are arbitrary JSON mappings, possibly using
//! legacy field names. They are canonicalized in two stages: a pure
//! legacy-aliasing pass over the raw mapping ([`normalize`]) and a typed
//! parse into [`TaskRequest`] ([`validator`]).

pub mod normalize;
pub mod validator;

use serde::{Deserialize, Serialize};

use crate::types::Message;

pub use validator::{extract_task_id, validate};

/// High-level operation requested by the caller.
///
/// Unrecognized strings dispatch as [`TaskType::Chat`]; this leniency is part
/// of the public contract, not an error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Chat,
    Enhance,
    Abstract,
    Generate,
    Translate,
    Summarize,
    Rewrite,
    Code,
    Analysis,
}

impl TaskType {
    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "enhance" => TaskType::Enhance,
            "abstract" => TaskType::Abstract,
            "generate" => TaskType::Generate,
            "translate" => TaskType::Translate,
            "summarize" => TaskType::Summarize,
            "rewrite" => TaskType::Rewrite,
            "code" => TaskType::Code,
            "analysis" => TaskType::Analysis,
            _ => TaskType::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Chat => "chat",
            TaskType::Enhance => "enhance",
            TaskType::Abstract => "abstract",
            TaskType::Generate => "generate",
            TaskType::Translate => "translate",
            TaskType::Summarize => "summarize",
            TaskType::Rewrite => "rewrite",
            TaskType::Code => "code",
            TaskType::Analysis => "analysis",
        }
    }
}

/// Prompt material for one task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContent {
    /// Caller-supplied system prompt; only `chat` tasks use it verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// The user prompt. Non-empty after validation.
    pub user_prompt: String,
    /// Prior conversation turns, forwarded to the provider in original order.
    #[serde(default)]
    pub context: Vec<Message>,
}

/// Sampling parameters, filled with defaults where the caller was silent.
///
/// No range clamping happens here; `max_tokens` is clamped against the model
/// ceiling only when the request is executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default = "defaults::temperature")]
    pub temperature: f64,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "defaults::top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub frequency_penalty: f64,
    #[serde(default)]
    pub presence_penalty: f64,
    #[serde(default)]
    pub stop: Vec<String>,
}

mod defaults {
    pub fn temperature() -> f64 {
        0.7
    }
    pub fn max_tokens() -> u32 {
        2000
    }
    pub fn top_p() -> f64 {
        0.9
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            temperature: defaults::temperature(),
            max_tokens: defaults::max_tokens(),
            top_p: defaults::top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: Vec::new(),
        }
    }
}

/// Output constraints some task types honor in their prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Canonical, validated task request.
///
/// Constructed once per inbound call and discarded after the response is
/// assembled. Invariants: `user_prompt` is non-empty, `model` is a registry
/// key, `task_type` is one of the enumerated handlers.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub task_id: String,
    pub task_type: TaskType,
    pub model: String,
    pub content: TaskContent,
    pub parameters: Parameters,
    pub constraints: Constraints,
    pub timeout_seconds: u64,
}
