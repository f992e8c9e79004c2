mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::{StubGenerator, StubJudge, StubRewriter, StubStore, StubWebSearch};
use common::Harness;
use crag::{api::routes::create_app, AppState, CragConfig, CragOutput};
use serde_json::{json, Value};
use std::time::Duration;

const CONFIG: &str = r#"
[providers.local]
type = "ollama"

[models.fast]
provider = "local"
model = "llama3.2"

[roles]
judge = "fast"
rewriter = "fast"
generator = "fast"

[web_search]
provider = "duckduckgo"
"#;

fn server(harness: &Harness) -> TestServer {
    let config = CragConfig::from_toml_str(CONFIG).unwrap();
    let state = AppState::new(config, harness.orchestrator());
    TestServer::new(create_app(state)).unwrap()
}

fn happy_harness() -> Harness {
    Harness::new(
        StubStore::with_texts(&["agents remember things"]),
        StubJudge::all_relevant(),
        StubRewriter::new("unused"),
        StubWebSearch::empty(),
        StubGenerator::new("Agents remember things."),
    )
}

#[tokio::test]
async fn test_health() {
    let server = server(&happy_harness());

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_generate_returns_answer_only() {
    let server = server(&happy_harness());

    let response = server
        .post("/generate")
        .json(&json!({ "question": "Do agents remember?" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "answer": "Agents remember things." }));
}

#[tokio::test]
async fn test_generate_trace_returns_path() {
    let harness = Harness::new(
        StubStore::empty(),
        StubJudge::all_relevant(),
        StubRewriter::new("agent memory"),
        StubWebSearch::with_texts(&["web says so"]),
        StubGenerator::new("From the web."),
    );
    let server = server(&harness);

    let response = server
        .post("/generate/trace")
        .json(&json!({ "question": "Do agents remember?" }))
        .await;

    response.assert_status_ok();
    let output: CragOutput = response.json();
    assert!(output.corrected);
    assert_eq!(output.final_question, "agent memory");
    assert_eq!(output.path.len(), 6);

    let raw: Value = response.json();
    assert_eq!(raw["path"][3]["stage"], "rewritten");
    assert_eq!(raw["documents"][0]["source"], "web");
}

#[tokio::test]
async fn test_empty_question_is_bad_request() {
    let harness = happy_harness();
    let server = server(&harness);

    let response = server
        .post("/generate")
        .json(&json!({ "question": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
    assert_eq!(harness.store.calls(), 0);
}

#[tokio::test]
async fn test_missing_question_field_is_bad_request() {
    let harness = happy_harness();
    let server = server(&harness);

    let response = server.post("/generate").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("question"));
    assert_eq!(harness.store.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = server(&happy_harness());

    let response = server
        .post("/generate/trace")
        .text("{\"question\": ")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_step_failure_reports_step() {
    let harness = Harness::new(
        StubStore::failing(),
        StubJudge::all_relevant(),
        StubRewriter::new("unused"),
        StubWebSearch::empty(),
        StubGenerator::new("unused"),
    );
    let server = server(&harness);

    let response = server
        .post("/generate")
        .json(&json!({ "question": "anything" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["step"], "retrieve");
}

#[tokio::test]
async fn test_timeout_is_gateway_timeout() {
    let harness = Harness::new(
        StubStore::stalled(),
        StubJudge::all_relevant(),
        StubRewriter::new("unused"),
        StubWebSearch::empty(),
        StubGenerator::new("unused"),
    );
    let settings = crag::PipelineSettings {
        call_timeout: Duration::from_millis(50),
        ..common::test_settings()
    };
    let config = CragConfig::from_toml_str(CONFIG).unwrap();
    let state = AppState::new(config, harness.orchestrator_with(settings));
    let server = TestServer::new(create_app(state)).unwrap();

    let response = server
        .post("/generate")
        .json(&json!({ "question": "anything" }))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
}
