//! 模型注册表 — 已知模型及其能力的静态表。
//!
//! Static table of known provider models and their capabilities. Loaded once
//! at service construction and read-only afterwards; resolution of unknown
//! model ids falls back to the configured default with a diagnostic rather
//! than a hard failure.

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

/// Model id used for `code` tasks regardless of what the caller requested.
pub const CODE_MODEL: &str = "deepseek-coder";

/// Immutable metadata about one upstream model variant.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Hard ceiling on completion tokens; requested `max_tokens` is clamped
    /// to this before the request goes out.
    pub max_tokens: u32,
    pub context_window: u32,
    pub supports_streaming: bool,
}

static BUILTIN_MODELS: Lazy<Vec<ModelDescriptor>> = Lazy::new(|| {
    vec![
        ModelDescriptor {
            id: "deepseek-chat",
            display_name: "DeepSeek Chat",
            description: "General-purpose chat model",
            max_tokens: 4096,
            context_window: 8192,
            supports_streaming: true,
        },
        ModelDescriptor {
            id: "deepseek-coder",
            display_name: "DeepSeek Coder",
            description: "Code generation and programming assistant",
            max_tokens: 4096,
            context_window: 8192,
            supports_streaming: true,
        },
    ]
});

/// Read-only registry of known models plus the deployment's default model.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: &'static [ModelDescriptor],
    default_model: String,
}

impl ModelRegistry {
    /// Build the registry around the deployment's configured default model.
    ///
    /// A default that is not itself a known model id is replaced by the
    /// built-in default, so `default()` always returns a registry key.
    pub fn new(default_model: impl Into<String>) -> Self {
        let requested = default_model.into();
        let default_model = if BUILTIN_MODELS.iter().any(|m| m.id == requested) {
            requested
        } else {
            warn!(
                model = %requested,
                fallback = crate::config::DEFAULT_MODEL,
                "configured default model is unknown, using built-in default"
            );
            crate::config::DEFAULT_MODEL.to_string()
        };
        Self {
            models: BUILTIN_MODELS.as_slice(),
            default_model,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The deployment default model descriptor.
    pub fn default_model(&self) -> &ModelDescriptor {
        self.get(&self.default_model)
            .expect("default model is always a registry key")
    }

    /// Resolve a caller-supplied model id to a registry key.
    ///
    /// Unknown ids are silently replaced by the default model (deliberate
    /// leniency — downstream callers rely on this) with a diagnostic log.
    pub fn resolve(&self, requested: &str) -> &ModelDescriptor {
        match self.get(requested) {
            Some(m) => m,
            None => {
                let fallback = self.default_model();
                warn!(
                    requested = %requested,
                    resolved = fallback.id,
                    "unknown model requested, substituting default"
                );
                fallback
            }
        }
    }

    /// All known descriptors, for capability listings.
    pub fn all(&self) -> &[ModelDescriptor] {
        self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_chat_and_coder() {
        let reg = ModelRegistry::new("deepseek-chat");
        assert!(reg.contains("deepseek-chat"));
        assert!(reg.contains(CODE_MODEL));
        assert_eq!(reg.get("deepseek-chat").unwrap().max_tokens, 4096);
        assert_eq!(reg.get("deepseek-chat").unwrap().context_window, 8192);
    }

    #[test]
    fn unknown_model_resolves_to_default() {
        let reg = ModelRegistry::new("deepseek-chat");
        assert_eq!(reg.resolve("gpt-4-turbo").id, "deepseek-chat");
    }

    #[test]
    fn unknown_configured_default_falls_back() {
        let reg = ModelRegistry::new("no-such-model");
        assert_eq!(reg.default_model().id, "deepseek-chat");
    }
}
