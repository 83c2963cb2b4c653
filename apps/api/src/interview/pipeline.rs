//! Invocation Pipeline: validate input, build the payload, call the provider
//! through the circuit breaker, normalize the reply.
//!
//! ```text
//! TaskInput ─▶ validate ─▶ prompts::*_payload ─▶ CircuitBreaker::execute
//!                                                    │
//!         NormalizedResult ◀─ normalize::normalize ◀─┘ first candidate text
//! ```
//!
//! Each call issues at most one provider request. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, warn};

use crate::llm_client::{GenerateContentRequest, GenerativeProvider, LlmError};
use crate::models::interview::{
    AnswerRecord, GenerateQuestionsRequest, Question, ScoreAnswerRequest, SummaryRequest,
    TaskKind,
};
use crate::normalize::{self, NormalizeError, NormalizedResult};
use crate::resilience::{BreakerError, CircuitBreaker};

use super::prompts;

/// Why the provider could not be reached or did not answer in time.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    #[error("circuit open")]
    CircuitOpen,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Transport(#[from] LlmError),
}

impl From<BreakerError<LlmError>> for UpstreamFailure {
    fn from(err: BreakerError<LlmError>) -> Self {
        match err {
            BreakerError::CircuitOpen => UpstreamFailure::CircuitOpen,
            BreakerError::Timeout(after) => UpstreamFailure::Timeout(after),
            BreakerError::Call(e) => UpstreamFailure::Transport(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamFailure),

    #[error("upstream returned no content")]
    EmptyUpstreamResponse,

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(#[from] NormalizeError),
}

/// A caller request tagged with the task it is for.
#[derive(Debug, Clone)]
pub enum TaskInput {
    GenerateQuestions(GenerateQuestionsRequest),
    ScoreAnswer(ScoreAnswerRequest),
    Summarize(SummaryRequest),
}

impl TaskInput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskInput::GenerateQuestions(_) => TaskKind::GenerateQuestions,
            TaskInput::ScoreAnswer(_) => TaskKind::ScoreAnswer,
            TaskInput::Summarize(_) => TaskKind::Summarize,
        }
    }
}

pub struct Pipeline {
    provider: Arc<dyn GenerativeProvider>,
    breaker: Arc<CircuitBreaker>,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn GenerativeProvider>, breaker: Arc<CircuitBreaker>) -> Self {
        Self { provider, breaker }
    }

    /// Validates `input`, calls the provider once and normalizes its reply.
    /// Invalid input is rejected before any network call.
    pub async fn invoke(&self, input: TaskInput) -> Result<NormalizedResult, PipelineError> {
        let kind = input.kind();
        let payload = build_payload(&input)?;
        let raw = self.call(kind, &payload).await?;

        let result = normalize::normalize(kind, &raw).map_err(|e| {
            error!(task = kind.as_str(), error = %e, raw = %raw, "Failed to normalize provider reply");
            PipelineError::MalformedUpstreamResponse(e)
        })?;

        if let NormalizedResult::Questions(questions) = &result {
            if !Question::follows_layout(questions) {
                warn!(
                    count = questions.len(),
                    "Question set does not follow the 2 Easy / 2 Medium / 2 Hard layout"
                );
            }
        }
        Ok(result)
    }

    /// One provider request through the breaker; returns the first candidate's text.
    async fn call(
        &self,
        kind: TaskKind,
        payload: &GenerateContentRequest,
    ) -> Result<String, PipelineError> {
        let provider = self.provider.as_ref();
        let envelope = self
            .breaker
            .execute(|| provider.generate(payload))
            .await
            .map_err(|e| {
                let failure = UpstreamFailure::from(e);
                warn!(
                    task = kind.as_str(),
                    error = %failure,
                    circuit = ?self.breaker.state(),
                    "Provider call failed"
                );
                failure
            })?;

        envelope
            .text()
            .map(String::from)
            .ok_or(PipelineError::EmptyUpstreamResponse)
    }
}

fn build_payload(input: &TaskInput) -> Result<GenerateContentRequest, PipelineError> {
    match input {
        TaskInput::GenerateQuestions(req) => {
            let resume_text = required_text(req.resume_text.as_deref(), "resumeText")?;
            Ok(prompts::questions_payload(resume_text))
        }
        TaskInput::ScoreAnswer(req) => {
            let question = req
                .question
                .as_ref()
                .filter(|q| !q.question.trim().is_empty())
                .ok_or_else(|| PipelineError::InvalidInput("question is required".to_string()))?;
            let answer = required_text(req.answer.as_deref(), "answer")?;
            let time_spent = req
                .time_spent
                .ok_or_else(|| PipelineError::InvalidInput("timeSpent is required".to_string()))?;
            Ok(prompts::scoring_payload(question, answer, time_spent))
        }
        TaskInput::Summarize(req) => {
            let answers: &[AnswerRecord] = req
                .answers
                .as_ref()
                .and_then(|v| v.as_array())
                .map(Vec::as_slice)
                .ok_or_else(|| PipelineError::InvalidInput("answers must be an array".to_string()))?;
            let answers_json = serde_json::to_string_pretty(answers).map_err(|e| {
                PipelineError::InvalidInput(format!("answers are not serializable: {e}"))
            })?;
            Ok(prompts::summary_payload(&answers_json))
        }
    }
}

fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, PipelineError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PipelineError::InvalidInput(format!("{field} is required")))
}
