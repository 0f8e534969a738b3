use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::CompletionClient;
use crate::domain::DomainError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-pro";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Serialize)]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

/// The subset of the `generateContent` response we read. Every level is
/// optional so a short payload deserializes and is rejected afterwards.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl ApiResponse {
    /// `candidates[0].content.parts[0].text`
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Sends the prompt as the only content part and returns the text of the
/// first candidate. The API key travels as the `key` query parameter and is
/// never written to logs or error messages.
///
/// ```text
/// GEMINI_API_KEY=...        (required)
/// GEMINI_MODEL=gemini-pro
/// GEMINI_BASE_URL=https://generativelanguage.googleapis.com/v1beta/models
/// ```
///
/// No timeout is applied unless [`GeminiClient::with_timeout`] is used.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (`{base}/{model}:generateContent`).
    url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let model: String = model.into();
        let url = format!("{}/{}:{}", base.trim_end_matches('/'), model, GENERATE_CONTENT);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model,
            url,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, DomainError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("HTTP client setup failed: {e}")))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    fn parse_completion(body: &str) -> Result<String, DomainError> {
        let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            DomainError::completion(format!("GeminiClient: failed to parse response: {e}"))
        })?;

        response.into_text().ok_or_else(|| {
            DomainError::completion(
                "GeminiClient: response has no candidates[0].content.parts[0].text",
            )
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let request = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart { text: prompt }],
            }],
        };

        debug!(
            "GeminiClient: sending {} chars to model {}",
            prompt.len(),
            self.model
        );

        // `without_url` keeps the key query parameter out of the error text.
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::completion(format!(
                    "GeminiClient: request failed: {}",
                    e.without_url()
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}: {body}");
            return Err(DomainError::completion(format!(
                "GeminiClient: API returned {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            DomainError::completion(format!(
                "GeminiClient: failed to read response: {}",
                e.without_url()
            ))
        })?;

        Self::parse_completion(&body)
    }
}
