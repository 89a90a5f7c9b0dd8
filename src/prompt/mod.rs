//! 提示词构建 — 任务类型到系统提示模板的调度表。
//!
//! Maps each task type to a prompt plan: the system prompt, any model or
//! token-ceiling override, and whether the output is expected to be
//! structured data. Adding a task type means adding one plan function and one
//! table row; the control flow never changes.

use crate::registry::CODE_MODEL;
use crate::request::{TaskRequest, TaskType};
use crate::types::Message;

/// Token ceiling applied to condensation tasks (`abstract`/`summarize`).
pub const SUMMARY_MAX_TOKENS: u32 = 1000;

/// Human-readable target-language names for `translate` tasks.
/// Unrecognized codes pass through to the prompt as-is.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("zh-CN", "Simplified Chinese"),
    ("zh-TW", "Traditional Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("ru", "Russian"),
    ("pt", "Portuguese"),
    ("it", "Italian"),
];

pub fn target_language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// What a task type wants from the completion call, beyond the validated
/// request: the system prompt and any per-type overrides.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system_prompt: String,
    /// Forces the resolved model, independent of what the caller requested.
    pub model_override: Option<&'static str>,
    /// Upper bound applied to the requested `max_tokens`.
    pub max_tokens_cap: Option<u32>,
    /// Whether the provider output should parse as structured data.
    pub expects_structured: bool,
}

impl PromptPlan {
    fn text(system_prompt: String) -> Self {
        Self {
            system_prompt,
            model_override: None,
            max_tokens_cap: None,
            expects_structured: false,
        }
    }
}

/// Finalized prompt: the ordered message sequence plus the structured-output
/// flag the assembler needs later.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub messages: Vec<Message>,
    pub expects_structured: bool,
}

type PlanFn = fn(&TaskRequest) -> PromptPlan;

fn plan_fn(task_type: TaskType) -> PlanFn {
    match task_type {
        TaskType::Enhance => plan_enhance,
        TaskType::Abstract | TaskType::Summarize => plan_summarize,
        TaskType::Generate => plan_generate,
        TaskType::Translate => plan_translate,
        TaskType::Rewrite => plan_rewrite,
        TaskType::Code => plan_code,
        TaskType::Analysis => plan_analysis,
        TaskType::Chat => plan_chat,
    }
}

/// Produce the plan for a validated request and apply its overrides to the
/// working copy (`model`, `parameters.max_tokens`).
pub fn build(request: &mut TaskRequest) -> BuiltPrompt {
    let plan = plan_fn(request.task_type)(request);

    if let Some(model) = plan.model_override {
        request.model = model.to_string();
    }
    if let Some(cap) = plan.max_tokens_cap {
        request.parameters.max_tokens = request.parameters.max_tokens.min(cap);
    }

    // Fixed order: one system message, context history unchanged, then the
    // user prompt last. History is never truncated here.
    let mut messages = Vec::with_capacity(request.content.context.len() + 2);
    messages.push(Message::system(plan.system_prompt));
    messages.extend(request.content.context.iter().cloned());
    messages.push(Message::user(request.content.user_prompt.clone()));

    BuiltPrompt {
        messages,
        expects_structured: plan.expects_structured,
    }
}

fn language_clause(request: &TaskRequest) -> String {
    match request.constraints.language.as_deref() {
        Some(code) => format!(" Respond in {}.", target_language_name(code)),
        None => String::new(),
    }
}

fn plan_enhance(request: &TaskRequest) -> PromptPlan {
    let style = request
        .constraints
        .tone
        .as_deref()
        .unwrap_or("graceful and flowing");
    PromptPlan::text(format!(
        "You are a professional literary editor. Polish the following content into a {} style, \
         keeping its meaning intact while making it more vivid and expressive.{}",
        style,
        language_clause(request)
    ))
}

fn plan_summarize(request: &TaskRequest) -> PromptPlan {
    let mut plan = PromptPlan::text(format!(
        "You are an expert at condensing long-form writing. Summarize the following content, \
         preserving the core plot and key information.{}",
        language_clause(request)
    ));
    plan.max_tokens_cap = Some(SUMMARY_MAX_TOKENS);
    plan
}

fn plan_generate(request: &TaskRequest) -> PromptPlan {
    let tone = request.constraints.tone.as_deref().unwrap_or("consistent");
    PromptPlan::text(format!(
        "You are a creative writer. Produce original content as requested, keeping a {} tone \
         and matching any style the material establishes.{}",
        tone,
        language_clause(request)
    ))
}

fn plan_translate(request: &TaskRequest) -> PromptPlan {
    let target = request
        .constraints
        .language
        .as_deref()
        .map(target_language_name)
        .unwrap_or("English");
    PromptPlan::text(format!(
        "You are a professional translator. Translate the user's text into {}. Preserve tone, \
         register and formatting; output only the translation.",
        target
    ))
}

fn plan_rewrite(request: &TaskRequest) -> PromptPlan {
    PromptPlan::text(format!(
        "You are an experienced editor. Rewrite the following text to improve clarity, rhythm \
         and word choice while strictly preserving its meaning.{}",
        language_clause(request)
    ))
}

fn plan_code(_request: &TaskRequest) -> PromptPlan {
    let mut plan = PromptPlan::text(
        "You are an expert software engineer. Write clean, idiomatic, well-structured code for \
         the request, with brief explanations where they help."
            .to_string(),
    );
    plan.model_override = Some(CODE_MODEL);
    plan
}

fn plan_analysis(request: &TaskRequest) -> PromptPlan {
    let mut plan = PromptPlan::text(format!(
        "Analyze the following content and return a JSON object with these keys: \
         \"style_type\", \"tone\", \"pace\", \"themes\", \"strengths\", \"suggestions\". \
         Keep every entry accurate and concise.{}",
        language_clause(request)
    ));
    plan.expects_structured = true;
    plan
}

fn plan_chat(request: &TaskRequest) -> PromptPlan {
    let system_prompt = request
        .content
        .system_prompt
        .clone()
        .unwrap_or_else(|| "You are a helpful assistant for long-form writing.".to_string());
    PromptPlan::text(system_prompt)
}
