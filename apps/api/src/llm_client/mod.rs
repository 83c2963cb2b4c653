/// LLM Client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// Calls reach this module only through the pipeline's circuit breaker.
///
/// No retries here: a failed call is reported once and the breaker decides
/// what happens to the next one.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
/// Sampling temperature used for every task.
pub const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Request payload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f64,
}

impl GenerateContentRequest {
    /// A single-turn request carrying one text part.
    pub fn single_turn(role: Option<&str>, text: String) -> Self {
        Self {
            contents: vec![Content {
                role: role.map(String::from),
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response envelope
// ────────────────────────────────────────────────────────────────────────────

/// Every level is optional: the provider omits fields freely (safety blocks,
/// empty candidates) and a missing field must not fail deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider trait + HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can answer a generate-content request.
///
/// `LlmClient` is the production implementation; the pipeline holds an
/// `Arc<dyn GenerativeProvider>` so it can be driven without the network.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError>;
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    url: String,
}

impl LlmClient {
    pub fn new(api_key: String, url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GenerativeProvider for LlmClient {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GenerateContentResponse = response.json().await?;
        debug!(candidates = envelope.candidates.len(), "Gemini call succeeded");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape_with_role() {
        let request = GenerateContentRequest::single_turn(Some("user"), "hello".to_string());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"temperature": 0.7}
            })
        );
    }

    #[test]
    fn test_payload_omits_missing_role() {
        let request = GenerateContentRequest::single_turn(None, "hi".to_string());
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["contents"][0].get("role").is_none());
    }

    #[test]
    fn test_response_text_first_candidate() {
        let envelope: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"parts": [{"text": "other"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(envelope.text(), Some("first"));
    }

    #[test]
    fn test_response_text_missing() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}),
        ] {
            let envelope: GenerateContentResponse = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(envelope.text(), None, "{body}");
        }
    }
}
