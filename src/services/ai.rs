use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::entities::Content;
use crate::services::prompt::ProviderPayload;

/// Failure talking to an upstream provider (generative or search).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider credentials are not configured")]
    NotConfigured,
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Generative backend. `Ok(None)` means the call succeeded but carried no
/// usable text.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn generate(&self, payload: &ProviderPayload) -> Result<Option<String>, ProviderError>;

    fn is_configured(&self) -> bool;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Self {
        Self {
            http,
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    async fn generate(&self, payload: &ProviderPayload) -> Result<Option<String>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let body = GenerateContentRequest {
            contents: payload.contents(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::error!(status = %status, message = %message, "Gemini API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(parsed.first_text())
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

impl GenerateContentResponse {
    /// First candidate's first part, if it has non-empty text.
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
