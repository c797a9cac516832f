//! The OpenAI-backed client against an unreachable endpoint and a local
//! stand-in for the chat completions API.

use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use essay_grader::{EssayImage, GradeError, OpenAiVision, VisionModel, config::OpenAiEnv};
use serde_json::{Value, json};
use tokio::net::TcpListener;

fn vision(endpoint: &str) -> OpenAiVision {
    let env = OpenAiEnv::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "OPENAI_ENDPOINT" => Some(endpoint.to_string()),
        "OPENAI_MODEL" => Some("gpt-4o".to_string()),
        _ => None,
    })
    .unwrap();
    OpenAiVision::new(env, reqwest::Client::new())
}

fn jpeg() -> EssayImage {
    EssayImage::from_upload("essay.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0]).unwrap()
}

/// Serves `POST /v1/chat/completions` with a fixed status and body.
async fn stub_api(status: StatusCode, body: Value) -> SocketAddr {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn completion(content: Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 900, "completion_tokens": 120, "total_tokens": 1020 }
    })
}

#[tokio::test]
async fn unreachable_endpoint_is_an_api_error() {
    let err = vision("http://127.0.0.1:1").complete("Grade this.", &jpeg()).await.unwrap_err();
    assert!(matches!(err, GradeError::Api(_)), "{err:?}");
    assert!(!err.is_local());
}

#[tokio::test]
async fn reply_text_and_usage_are_returned() {
    let addr = stub_api(StatusCode::OK, completion(json!("Overall: B+"))).await;
    let done = vision(&format!("http://{addr}/v1"))
        .complete("Grade this.", &jpeg())
        .await
        .unwrap();
    assert_eq!(done.text, "Overall: B+");
    let usage = done.usage.expect("usage reported");
    assert_eq!(usage.input_tokens, 900);
    assert_eq!(usage.output_tokens, 120);
}

#[tokio::test]
async fn reply_without_text_is_an_api_error() {
    for content in [Value::Null, json!("   ")] {
        let addr = stub_api(StatusCode::OK, completion(content)).await;
        let err = vision(&format!("http://{addr}/v1"))
            .complete("Grade this.", &jpeg())
            .await
            .unwrap_err();
        assert!(matches!(&err, GradeError::Api(msg) if msg == "the model returned no text"), "{err:?}");
    }
}

#[tokio::test]
async fn rejected_request_is_an_api_error() {
    let addr = stub_api(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } }),
    )
    .await;
    let err = vision(&format!("http://{addr}/v1"))
        .complete("Grade this.", &jpeg())
        .await
        .unwrap_err();
    assert!(matches!(&err, GradeError::Api(msg) if msg.contains("Incorrect API key provided")), "{err:?}");
}
