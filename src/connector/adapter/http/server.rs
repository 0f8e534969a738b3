use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{SubmitMessageUseCase, TurnOutcome};
use crate::domain::Message;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    EmptyQuestion,
    /// Another turn holds the in-flight guard.
    Busy,
    Completion(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::EmptyQuestion => (
                StatusCode::BAD_REQUEST,
                "question must not be empty".to_string(),
            ),
            ApiError::Busy => (
                StatusCode::CONFLICT,
                "a previous question is still being answered".to_string(),
            ),
            ApiError::Completion(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// HTTP front door onto one shared chat session.
///
/// | Route            | Body                     | Reply                         |
/// |------------------|--------------------------|-------------------------------|
/// | `POST /chat`     | `{"question": "..."}`    | `{"answer": "..."}`           |
/// | `GET /messages`  |                          | transcript, oldest first      |
/// | `GET /health`    |                          | `{"status": "ok"}`            |
///
/// Questions are answered one at a time; a request arriving while another
/// is in flight gets `409 Conflict` rather than waiting.
#[derive(Clone)]
pub struct ChatHttpServer {
    submit: Arc<SubmitMessageUseCase>,
}

impl ChatHttpServer {
    pub fn new(submit: Arc<SubmitMessageUseCase>) -> Self {
        Self { submit }
    }

    pub fn router(&self) -> axum::Router {
        axum::Router::new()
            .route("/chat", post(chat))
            .route("/messages", get(messages))
            .route("/health", get(health))
            .with_state(Arc::clone(&self.submit))
    }

    /// Serves until `shutdown` is cancelled.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> std::io::Result<()> {
        info!("Chat HTTP server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
    }
}

async fn chat(
    State(submit): State<Arc<SubmitMessageUseCase>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::EmptyQuestion);
    }

    match submit.submit(&request.question).await {
        Ok(Some(TurnOutcome::Answered(reply))) => Ok(Json(ChatResponse {
            answer: reply.text().to_string(),
        })),
        Ok(Some(TurnOutcome::Failed(error))) => Err(ApiError::Completion(error)),
        Ok(None) => Err(ApiError::Busy),
        Err(e) => {
            warn!("Chat request failed: {e}");
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

async fn messages(
    State(submit): State<Arc<SubmitMessageUseCase>>,
) -> Result<Json<Vec<Message>>, ApiError> {
    submit
        .session()
        .messages()
        .await
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
