//! The dispatch service: validation → prompt build → throttle → completion →
//! assembly.
//!
//! [`AiService`] is an explicitly constructed, dependency-injected object —
//! no process-wide globals — so tests can run independent instances side by
//! side. `process` never fails at the Rust level: every outcome, including
//! "service not configured", is a response envelope with a `success` flag and
//! a machine-readable error kind the surrounding web layer translates to an
//! HTTP status.

use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::assemble;
use crate::client::CompletionClient;
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::prompt;
use crate::registry::ModelRegistry;
use crate::request::{self, TaskType};
use crate::throttle::Throttle;
use crate::Result;

pub struct AiService {
    config: ServiceConfig,
    registry: ModelRegistry,
    throttle: Throttle,
    client: Option<CompletionClient>,
}

impl AiService {
    /// Construct the service. Missing credentials do not fail construction:
    /// the instance comes up in a not-initialized state and reports
    /// service-unavailable on every task.
    pub fn new(config: ServiceConfig) -> Self {
        let registry = ModelRegistry::new(config.default_model.clone());
        let throttle = Throttle::new(config.min_request_interval);

        let client = match config.api_key.clone() {
            Some(key) => match CompletionClient::new(&config, key) {
                Ok(client) => {
                    info!(
                        base_url = %config.base_url,
                        default_model = %config.default_model,
                        "AI service initialized"
                    );
                    Some(client)
                }
                Err(e) => {
                    error!(error = %e, "failed to initialize completion client");
                    None
                }
            },
            None => {
                warn!("provider API key not configured, AI service unavailable");
                None
            }
        };

        Self {
            config,
            registry,
            throttle,
            client,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Process one task description end to end.
    ///
    /// The returned mapping always carries `success` and `task_id`; failures
    /// add `error.kind`/`error.message` and are never retried here.
    pub async fn process(&self, task: Value) -> Value {
        let start = Instant::now();
        let task_id = request::extract_task_id(&task);

        match self.dispatch(task, &task_id, start).await {
            Ok(report) => report.into_value(),
            Err(err) => {
                error!(
                    task_id = %task_id,
                    kind = err.kind(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "task failed: {}", err
                );
                assemble::failure(task_id, &err, start.elapsed()).into_value()
            }
        }
    }

    async fn dispatch(
        &self,
        task: Value,
        task_id: &str,
        start: Instant,
    ) -> Result<assemble::TaskReport> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::NotInitialized("provider API key not configured".into()))?;

        let mut req = request::validate(
            task,
            task_id.to_string(),
            &self.registry,
            self.config.request_timeout,
        )?;
        let built = prompt::build(&mut req);

        // The prompt stage may have overridden the model; both the validator
        // and the override keep it a registry key.
        let model = self.registry.resolve(&req.model);
        let timeout = Duration::from_secs(req.timeout_seconds);

        info!(
            task_id = %task_id,
            task_type = req.task_type.as_str(),
            model = model.id,
            "dispatching task"
        );

        self.throttle.acquire().await;
        let completion = client
            .complete(
                task_id,
                model,
                &built.messages,
                &req.parameters,
                built.expects_structured,
                timeout,
            )
            .await?;

        Ok(assemble::success(
            req.task_id,
            req.task_type,
            completion,
            built.expects_structured,
            start.elapsed(),
        ))
    }

    /// Run several task types over the same content, sequentially.
    ///
    /// Each operation gets its own envelope in `results`; a failed operation
    /// occupies its slot without aborting the rest.
    pub async fn process_batch(&self, task: Value) -> Value {
        let start = Instant::now();
        let task_id = request::extract_task_id(&task);

        let operations: Vec<String> = task
            .get("operations")
            .and_then(Value::as_array)
            .map(|ops| {
                ops.iter()
                    .filter_map(Value::as_str)
                    .filter(|op| TaskType::from_str_lenient(op).as_str() == *op)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if operations.is_empty() {
            let err = Error::Validation("no valid operations supplied".into());
            return assemble::failure(task_id, &err, start.elapsed()).into_value();
        }

        let mut results = Map::new();
        for op in &operations {
            let mut sub = task.clone();
            if let Some(map) = sub.as_object_mut() {
                map.insert("task_type".to_string(), Value::String(op.clone()));
                map.remove("operations");
                // Every sub-task correlates independently.
                map.remove("task_id");
            }
            results.insert(op.clone(), self.process(sub).await);
        }

        json!({
            "success": true,
            "task_id": task_id,
            "operations_performed": operations,
            "results": Value::Object(results),
            "total_processing_time": (start.elapsed().as_secs_f64() * 100.0).round() / 100.0,
        })
    }

    /// Best-effort availability probe, independent of the task flow.
    pub async fn health_check(&self) -> Value {
        match &self.client {
            None => json!({
                "available": false,
                "error": {
                    "kind": "not_initialized",
                    "message": "provider API key not configured",
                }
            }),
            Some(client) => match client.list_models().await {
                Ok(models) => json!({
                    "available": true,
                    "base_url": self.config.base_url_trimmed(),
                    "models": models,
                }),
                Err(e) => json!({
                    "available": false,
                    "error": { "kind": e.kind(), "message": e.to_string() },
                }),
            },
        }
    }
}
