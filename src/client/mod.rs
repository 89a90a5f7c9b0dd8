//! HTTP client for the provider's chat-completion endpoint.
//!
//! One synchronous (from the task's point of view) call per task. Transport
//! and HTTP outcomes map onto the crate error taxonomy here; nothing is
//! retried.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::Error;
use crate::registry::ModelDescriptor;
use crate::request::Parameters;
use crate::types::Message;
use crate::Result;

/// Token accounting reported by the provider. Unavailable counts are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Raw provider output for one completed call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model_used: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

/// Thin wrapper over `reqwest` bound to one provider deployment.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(config: &ServiceConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url_trimmed().to_string(),
            api_key,
        })
    }

    /// Execute one chat completion.
    ///
    /// `max_tokens` is clamped to the model ceiling here; everything else in
    /// `parameters` goes out verbatim. `stop` is included only when
    /// non-empty, and structured tasks request a JSON-object response format.
    pub async fn complete(
        &self,
        task_id: &str,
        model: &ModelDescriptor,
        messages: &[Message],
        parameters: &Parameters,
        expects_structured: bool,
        timeout: Duration,
    ) -> Result<Completion> {
        let max_tokens = parameters.max_tokens.min(model.max_tokens);

        let mut body = json!({
            "model": model.id,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": parameters.temperature,
            "top_p": parameters.top_p,
            "frequency_penalty": parameters.frequency_penalty,
            "presence_penalty": parameters.presence_penalty,
            "stream": false,
        });
        if !parameters.stop.is_empty() {
            body["stop"] = json!(parameters.stop);
        }
        if expects_structured {
            body["response_format"] = json!({"type": "json_object"});
        }

        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = extract_error_message(&raw);
            info!(
                task_id = %task_id,
                model = model.id,
                http_status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "chat completion request failed"
            );
            return Err(classify_http_status(status.as_u16(), message));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| Error::MalformedResponse(format!("failed to read body: {}", e)))?;
        let parsed: ChatResponse = serde_json::from_str(&raw)
            .map_err(|e| Error::MalformedResponse(format!("unparsable body: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("response carried no choices".to_string()))?;
        let text = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| Error::MalformedResponse("choice carried no content".to_string()))?;

        debug!(
            task_id = %task_id,
            model = model.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "chat completion request succeeded"
        );

        Ok(Completion {
            text,
            model_used: parsed.model.unwrap_or_else(|| model.id.to_string()),
            finish_reason: choice.finish_reason.unwrap_or_default(),
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    /// Best-effort health probe against `GET /models`, independent of the
    /// task flow.
    pub async fn list_models(&self) -> Result<Value> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(classify_http_status(status.as_u16(), extract_error_message(&raw)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("unparsable body: {}", e)))
    }
}

/// Map transport failures (no response received) onto the taxonomy:
/// an exceeded deadline is distinct from an unreachable endpoint.
fn classify_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else {
        Error::Connection(err.to_string())
    }
}

/// Classify a non-2xx status, carrying the extracted provider message.
fn classify_http_status(status: u16, message: String) -> Error {
    match status {
        401 => Error::Authentication(message),
        429 => Error::RateLimited(message),
        400 => Error::BadRequest(message),
        _ => Error::Provider { status, message },
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw text when it is not the expected JSON shape.
fn extract_error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.pointer("/message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
