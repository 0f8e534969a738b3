//! End-to-end tests for the Gemini client and a full turn against a stub
//! `generateContent` endpoint served locally.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::Json;
use tokio::net::TcpListener;

use gemini_chat::{
    ChatSession, CompletionClient, GeminiClient, InMemoryMessageRepository, Sender,
    SubmitMessageUseCase, COMPLETION_FAILURE_MESSAGE,
};

const API_KEY: &str = "test-secret-key";

#[derive(Debug, Clone)]
struct Received {
    path: String,
    key: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn generate(
    State(stub): State<Stub>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    stub.received.lock().unwrap().push(Received {
        path: uri.path().to_string(),
        key: params.get("key").cloned(),
        body,
    });
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

/// Serves `body` with `status` for every request; returns the base URL and
/// the log of received requests.
async fn spawn_stub(
    status: StatusCode,
    body: impl Into<String>,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: body.into(),
        delay,
        received: received.clone(),
    };
    let app = axum::Router::new().fallback(generate).with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta/models"), received)
}

fn reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" }, "finishReason": "STOP" }
        ]
    })
    .to_string()
}

fn use_case(client: GeminiClient) -> SubmitMessageUseCase {
    let session = Arc::new(ChatSession::without_landing(Arc::new(
        InMemoryMessageRepository::new(),
    )));
    SubmitMessageUseCase::new(session, Arc::new(client))
}

#[tokio::test]
async fn test_client_sends_prompt_only_and_reads_first_candidate() {
    let (base_url, received) = spawn_stub(StatusCode::OK, reply("Hi there"), Duration::ZERO).await;
    let client = GeminiClient::new(API_KEY, "gemini-pro", base_url);

    let text = client.complete("Hello").await.expect("completion");
    assert_eq!(text, "Hi there");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, "/v1beta/models/gemini-pro:generateContent");
    assert_eq!(received[0].key.as_deref(), Some(API_KEY));
    assert_eq!(
        received[0].body,
        serde_json::json!({ "contents": [ { "parts": [ { "text": "Hello" } ] } ] })
    );
}

#[tokio::test]
async fn test_successful_turn_against_stub() {
    let (base_url, _) = spawn_stub(StatusCode::OK, reply("Hi there"), Duration::ZERO).await;
    let use_case = use_case(GeminiClient::new(API_KEY, "gemini-pro", base_url));

    let outcome = use_case.submit("Hello").await.unwrap().unwrap();
    assert!(outcome.is_answered());

    let messages = use_case.session().messages().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender(), Sender::User);
    assert_eq!(messages[0].text(), "Hello");
    assert_eq!(messages[1].sender(), Sender::Bot);
    assert_eq!(messages[1].text(), "Hi there");
    assert!(use_case.session().state().last_error().is_none());
}

#[tokio::test]
async fn test_http_500_fails_the_turn() {
    let (base_url, _) = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":{"code":500,"message":"internal"}}"#,
        Duration::ZERO,
    )
    .await;
    let use_case = use_case(GeminiClient::new(API_KEY, "gemini-pro", base_url));

    let outcome = use_case.submit("test").await.unwrap().unwrap();
    assert_eq!(outcome.error(), Some(COMPLETION_FAILURE_MESSAGE));

    let messages = use_case.session().messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender(), Sender::User);

    let state = use_case.session().state();
    assert_eq!(state.last_error(), Some(COMPLETION_FAILURE_MESSAGE));
    assert!(!state.is_submitting());
}

#[tokio::test]
async fn test_malformed_payload_is_a_completion_failure() {
    let (base_url, _) = spawn_stub(StatusCode::OK, r#"{"candidates":[]}"#, Duration::ZERO).await;
    let client = GeminiClient::new(API_KEY, "gemini-pro", base_url);

    let err = client.complete("Hello").await.unwrap_err();
    assert!(err.is_completion_failure());
}

#[tokio::test]
async fn test_unreachable_host_does_not_leak_key() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeminiClient::new(API_KEY, "gemini-pro", format!("http://{addr}/v1beta/models"));
    let err = client.complete("Hello").await.unwrap_err();

    assert!(err.is_completion_failure());
    assert!(!err.to_string().contains(API_KEY));
}

#[tokio::test]
async fn test_optional_timeout_fails_slow_requests() {
    let (base_url, _) =
        spawn_stub(StatusCode::OK, reply("too late"), Duration::from_millis(500)).await;
    let client = GeminiClient::new(API_KEY, "gemini-pro", base_url)
        .with_timeout(Duration::from_millis(50))
        .unwrap();

    let err = client.complete("Hello").await.unwrap_err();
    assert!(err.is_completion_failure());
}
