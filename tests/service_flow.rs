//! End-to-end dispatch tests against a mock provider endpoint.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use scribe_ai::{AiService, ServiceConfig};

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

fn service_for(server: &ServerGuard) -> AiService {
    init_tracing();
    AiService::new(ServiceConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.url(),
        default_model: "deepseek-chat".to_string(),
        min_request_interval: std::time::Duration::from_millis(5),
        request_timeout: std::time::Duration::from_secs(5),
    })
}

fn completion_body(text: &str) -> String {
    json!({
        "id": "cmpl-1",
        "model": "deepseek-chat",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 }
    })
    .to_string()
}

#[tokio::test]
async fn successful_task_produces_full_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("a polished paragraph"))
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({
            "task_type": "enhance",
            "content": { "user_prompt": "a rough paragraph" }
        }))
        .await;

    mock.assert_async().await;
    assert_eq!(response["success"], true);
    assert_eq!(response["task_type"], "enhance");
    assert_eq!(response["data"]["result"], "a polished paragraph");
    assert_eq!(response["usage"]["total_tokens"], 19);
    assert_eq!(response["finish_reason"], "stop");
    assert!(response["task_id"].is_string());
    assert!(response["completed_at"].is_string());
    assert!(response["processing_time"].is_number());
}

#[tokio::test]
async fn provider_429_surfaces_as_rate_limited() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error": {"message": "rate limit exceeded"}}"#)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({"content": {"user_prompt": "hi"}}))
        .await;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "rate_limited");
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("rate limit exceeded"));
}

#[tokio::test]
async fn provider_401_surfaces_as_authentication_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid api key"}}"#)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({"content": {"user_prompt": "hi"}}))
        .await;
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "authentication_error");
}

#[tokio::test]
async fn provider_400_surfaces_as_bad_request() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_body(r#"{"error": {"message": "bad params"}}"#)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({"content": {"user_prompt": "hi"}}))
        .await;
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "bad_request");
}

#[tokio::test]
async fn empty_choices_surface_as_malformed_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({"content": {"user_prompt": "hi"}}))
        .await;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "malformed_response");
}

#[tokio::test]
async fn empty_prompt_fails_without_touching_the_provider() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service.process(json!({"task_type": "enhance"})).await;

    mock.assert_async().await;
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "validation_error");
    assert!(response["task_id"].is_string());
}

#[tokio::test]
async fn unconfigured_service_reports_not_initialized() {
    let service = AiService::new(ServiceConfig::default());
    let response = service
        .process(json!({"content": {"user_prompt": "hi"}}))
        .await;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "not_initialized");
}

#[tokio::test]
async fn translate_prompt_names_the_human_readable_language() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("Simplified Chinese".to_string()))
        .with_status(200)
        .with_body(completion_body("你好"))
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({
            "task_type": "translate",
            "content": { "user_prompt": "Hello" },
            "constraints": { "language": "zh-CN" }
        }))
        .await;

    mock.assert_async().await;
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["result"], "你好");
}

#[tokio::test]
async fn code_task_switches_to_the_code_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "deepseek-coder"})))
        .with_status(200)
        .with_body(completion_body("fn main() {}"))
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({
            "task_type": "code",
            "model": "deepseek-chat",
            "content": { "user_prompt": "write a main function" }
        }))
        .await;

    mock.assert_async().await;
    assert_eq!(response["success"], true);
}

#[tokio::test]
async fn abstract_task_clamps_max_tokens() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 1000})))
        .with_status(200)
        .with_body(completion_body("a summary"))
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({
            "task_type": "abstract",
            "content": { "user_prompt": "a very long chapter" },
            "parameters": { "max_tokens": 4000 }
        }))
        .await;

    mock.assert_async().await;
    assert_eq!(response["success"], true);
}

#[tokio::test]
async fn analysis_requests_json_and_parses_it() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(
            json!({"response_format": {"type": "json_object"}}),
        ))
        .with_status(200)
        .with_body(completion_body(r#"{"tone": "melancholic", "pace": "slow"}"#))
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process(json!({
            "task_type": "analysis",
            "content": { "user_prompt": "chapter text" }
        }))
        .await;

    mock.assert_async().await;
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["tone"], "melancholic");
}

#[tokio::test]
async fn identical_inputs_get_distinct_task_ids() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body("ok"))
        .expect(2)
        .create_async()
        .await;

    let service = service_for(&server);
    let task = json!({"content": {"user_prompt": "same input"}});
    let first = service.process(task.clone()).await;
    let second = service.process(task).await;

    assert_eq!(first["success"], true);
    assert_eq!(second["success"], true);
    assert_ne!(first["task_id"], second["task_id"]);
}

#[tokio::test]
async fn concurrent_tasks_all_complete_independently() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body("ok"))
        .expect(4)
        .create_async()
        .await;

    let service = std::sync::Arc::new(service_for(&server));
    let mut handles = Vec::new();
    for i in 0..4 {
        let service = std::sync::Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .process(json!({"content": {"user_prompt": format!("task {}", i)}}))
                .await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response["success"], true);
        ids.insert(response["task_id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn batch_runs_each_valid_operation() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body("done"))
        .expect(2)
        .create_async()
        .await;

    let service = service_for(&server);
    let response = service
        .process_batch(json!({
            "content": { "user_prompt": "chapter text" },
            "operations": ["enhance", "summarize", "not-a-real-op"]
        }))
        .await;

    assert_eq!(response["success"], true);
    assert_eq!(
        response["operations_performed"],
        json!(["enhance", "summarize"])
    );
    assert_eq!(response["results"]["enhance"]["success"], true);
    assert_eq!(response["results"]["summarize"]["success"], true);
}

#[tokio::test]
async fn batch_with_no_valid_operations_fails_validation() {
    let server = Server::new_async().await;
    let service = service_for(&server);
    let response = service
        .process_batch(json!({
            "content": { "user_prompt": "text" },
            "operations": ["frobnicate"]
        }))
        .await;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn health_check_reports_availability() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "deepseek-chat"}]}"#)
        .create_async()
        .await;

    let service = service_for(&server);
    let health = service.health_check().await;
    assert_eq!(health["available"], true);

    let unconfigured = AiService::new(ServiceConfig::default());
    let health = unconfigured.health_check().await;
    assert_eq!(health["available"], false);
    assert_eq!(health["error"]["kind"], "not_initialized");
}
