//! # scribe-ai
//!
//! AI task dispatch and prompt-normalization engine for a long-form-writing
//! backend. Takes heterogeneous, partially-specified task descriptions,
//! canonicalizes them, builds a per-task-type prompt sequence, throttles and
//! executes the call against a chat-completion provider, and classifies every
//! failure mode into a stable result envelope.
//!
//! The surrounding web layer owns routing, persistence and authentication;
//! this crate owns the one component with real branching logic.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use scribe_ai::{AiService, ServiceConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = AiService::new(ServiceConfig::new("sk-..."));
//!
//!     let response = service
//!         .process(json!({
//!             "task_type": "translate",
//!             "content": { "user_prompt": "Hello" },
//!             "constraints": { "language": "zh-CN" },
//!         }))
//!         .await;
//!
//!     assert!(response["task_id"].is_string());
//! }
//! ```
//!
//! ## Module organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Legacy-field normalization and typed task validation |
//! | [`prompt`] | Task-type → system-prompt dispatch table |
//! | [`registry`] | Static model capability table |
//! | [`throttle`] | Minimum-interval gate in front of the provider |
//! | [`client`] | Chat-completion HTTP client and failure classification |
//! | [`assemble`] | Final response envelope assembly |
//! | [`service`] | The dependency-injected service object tying it together |

pub mod assemble;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod registry;
pub mod request;
pub mod service;
pub mod throttle;
pub mod types;

pub use client::{Completion, CompletionClient, TokenUsage};
pub use config::ServiceConfig;
pub use error::Error;
pub use registry::{ModelDescriptor, ModelRegistry};
pub use request::{TaskRequest, TaskType};
pub use service::AiService;
pub use types::Message;

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
