//! End-to-end runs against an in-process stand-in for the Messages API.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};

use dont::agent::source::PROGRAM_SOURCE;
use dont::agent::{run_with, Runner};
use dont::llm::{AnthropicClient, ANTHROPIC_VERSION};
use dont::tools::Tool;
use dont::{Config, RunError};

#[derive(Clone)]
struct MockApi {
    status: StatusCode,
    reply: Arc<String>,
    seen: Arc<Mutex<Vec<(HeaderMap, String)>>>,
}

async fn messages(State(api): State<MockApi>, headers: HeaderMap, body: String) -> impl IntoResponse {
    api.seen.lock().unwrap().push((headers, body));
    (
        api.status,
        [(header::CONTENT_TYPE, "application/json")],
        api.reply.as_ref().clone(),
    )
}

/// Serve `reply` on `/v1/messages`; returns the base URL and the request log.
async fn spawn_api(status: StatusCode, reply: impl Into<String>) -> (String, Arc<Mutex<Vec<(HeaderMap, String)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let api = MockApi {
        status,
        reply: Arc::new(reply.into()),
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

struct RecordingEval {
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl Tool for RecordingEval {
    fn name(&self) -> &str {
        "ruby_eval"
    }

    fn description(&self) -> &str {
        "records code instead of running it"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"code": {"type": "string"}}, "required": ["code"]})
    }

    async fn execute(&self, args: Value, _out: &mut (dyn Write + Send)) -> anyhow::Result<()> {
        let code = args["code"].as_str().unwrap_or_default().to_string();
        self.executed.lock().unwrap().push(code);
        Ok(())
    }
}

fn runner_for(base_url: &str) -> (Runner, Arc<RecordingEval>) {
    let config = Config::new("sk-test-key".to_string(), base_url.to_string());
    let llm = Arc::new(AnthropicClient::new(config.api_key.clone(), config.messages_url()));
    let tool = Arc::new(RecordingEval {
        executed: Mutex::new(Vec::new()),
    });
    (Runner::with_parts(config, llm, tool.clone()), tool)
}

#[tokio::test]
async fn test_request_wire_format() {
    let (base_url, seen) = spawn_api(StatusCode::OK, r#"{"content":[]}"#).await;
    let (runner, _) = runner_for(&base_url);

    let mut out = Vec::<u8>::new();
    runner.run(&mut out).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (headers, body) = &seen[0];

    assert_eq!(headers["x-api-key"], "sk-test-key");
    assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);
    assert_eq!(headers["content-type"], "application/json");

    let body: Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["model"], "claude-sonnet-4-20250514");
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["tools"].as_array().unwrap().len(), 1);
    assert_eq!(body["tools"][0]["name"], "ruby_eval");
    assert_eq!(body["tools"][0]["input_schema"]["required"], json!(["code"]));
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");

    let prompt = body["messages"][0]["content"].as_str().unwrap();
    for file in PROGRAM_SOURCE {
        assert!(prompt.contains(file.text), "{} not in prompt", file.path);
    }
}

#[tokio::test]
async fn test_segments_are_printed_and_executed_in_order() {
    let reply = json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Understood."},
            {"type": "tool_use", "id": "toolu_1", "name": "ruby_eval", "input": {"code": "1+1"}},
            {"type": "tool_use", "id": "toolu_2", "name": "shell", "input": {"code": "id"}},
            {"type": "text", "text": "That is all."}
        ],
        "stop_reason": "tool_use"
    });
    let (base_url, _) = spawn_api(StatusCode::OK, reply.to_string()).await;
    let (runner, tool) = runner_for(&base_url);

    let mut out = Vec::<u8>::new();
    runner.run(&mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Understood.\nExecuting: 1+1\nThat is all.\n"
    );
    assert_eq!(*tool.executed.lock().unwrap(), vec!["1+1".to_string()]);
}

#[tokio::test]
async fn test_malformed_body_is_unhandled_response() {
    let (base_url, _) = spawn_api(StatusCode::OK, "{\"content\": [{\"type\": ").await;
    let (runner, tool) = runner_for(&base_url);

    let mut out = Vec::<u8>::new();
    let err = runner.run(&mut out).await.unwrap_err();

    assert!(matches!(err, RunError::UnhandledResponse { status: Some(200), .. }), "{err}");
    assert!(out.is_empty());
    assert!(tool.executed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_api_error_is_unhandled_response() {
    let reply = json!({
        "type": "error",
        "error": {"type": "authentication_error", "message": "invalid x-api-key"}
    });
    let (base_url, _) = spawn_api(StatusCode::UNAUTHORIZED, reply.to_string()).await;
    let (runner, _) = runner_for(&base_url);

    let err = runner.run(&mut Vec::<u8>::new()).await.unwrap_err();

    match err {
        RunError::UnhandledResponse { status, reason } => {
            assert_eq!(status, Some(401));
            assert!(reason.contains("invalid x-api-key"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (runner, _) = runner_for(&format!("http://{}", addr));
    let err = runner.run(&mut Vec::<u8>::new()).await.unwrap_err();

    assert!(matches!(err, RunError::Transport(_)), "{err}");
}

#[tokio::test]
async fn test_entry_point_uses_looked_up_configuration() {
    let reply = json!({"content": [{"type": "text", "text": "Not today."}]});
    let (base_url, seen) = spawn_api(StatusCode::OK, reply.to_string()).await;

    let mut out = Vec::<u8>::new();
    run_with(
        |name| match name {
            "ANTHROPIC_API_KEY" => Some(String::new()),
            "ANTHROPIC_BASE_URL" => Some(base_url.clone()),
            "DONT_MODEL" => Some("claude-entry-point".to_string()),
            _ => None,
        },
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Not today.\n");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0["x-api-key"], "");
    let body: Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(body["model"], "claude-entry-point");
}
