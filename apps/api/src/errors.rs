use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::pipeline::{PipelineError, UpstreamFailure};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Response bodies are generic: no provider text and no internal detail ever
/// reaches the client. The detail is logged here instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) | AppError::Pipeline(PipelineError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Pipeline(PipelineError::UpstreamUnavailable(failure)) => {
                tracing::error!("Upstream unavailable: {failure}");
                let code = match failure {
                    UpstreamFailure::CircuitOpen => "CIRCUIT_OPEN",
                    UpstreamFailure::Timeout(_) => "UPSTREAM_TIMEOUT",
                    UpstreamFailure::Transport(_) => "UPSTREAM_UNAVAILABLE",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "The AI provider is currently unavailable".to_string(),
                )
            }
            AppError::Pipeline(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::normalize::NormalizeError;
    use std::time::Duration;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let response =
            AppError::from(PipelineError::InvalidInput("resumeText is required".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "resumeText is required");
    }

    #[tokio::test]
    async fn test_upstream_failures_are_internal_errors() {
        let cases = [
            (PipelineError::from(UpstreamFailure::CircuitOpen), "CIRCUIT_OPEN"),
            (
                PipelineError::from(UpstreamFailure::Timeout(Duration::from_secs(1))),
                "UPSTREAM_TIMEOUT",
            ),
            (
                PipelineError::from(UpstreamFailure::Transport(LlmError::Api {
                    status: 500,
                    message: "secret upstream detail".into(),
                })),
                "UPSTREAM_UNAVAILABLE",
            ),
            (PipelineError::EmptyUpstreamResponse, "LLM_ERROR"),
            (
                PipelineError::from(NormalizeError::WrongShape("expected a JSON object".into())),
                "LLM_ERROR",
            ),
        ];

        for (err, code) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = body_of(response).await;
            assert_eq!(body["error"]["code"], code);
            assert!(!body.to_string().contains("secret upstream detail"));
            assert!(!body.to_string().contains("JSON object"));
        }
    }
}
