//! Axum route handlers for the interview API.
//!
//! Handlers only unwrap the JSON body and hand it to the pipeline; every
//! validation rule lives in `pipeline`.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::AppError;
use crate::interview::pipeline::TaskInput;
use crate::models::interview::{GenerateQuestionsRequest, ScoreAnswerRequest, SummaryRequest};
use crate::normalize::NormalizedResult;
use crate::state::AppState;

/// POST /api/gemini/generate-questions
///
/// Body `{resumeText}`; returns the question array.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    body: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Result<Json<NormalizedResult>, AppError> {
    let Json(request) = body?;
    let result = state
        .pipeline
        .invoke(TaskInput::GenerateQuestions(request))
        .await?;
    Ok(Json(result))
}

/// POST /api/gemini/score-answer
///
/// Body `{question, answer, timeSpent}`; returns `{score, feedback}`.
pub async fn handle_score_answer(
    State(state): State<AppState>,
    body: Result<Json<ScoreAnswerRequest>, JsonRejection>,
) -> Result<Json<NormalizedResult>, AppError> {
    let Json(request) = body?;
    let result = state.pipeline.invoke(TaskInput::ScoreAnswer(request)).await?;
    Ok(Json(result))
}

/// POST /api/gemini/generate-summary
///
/// Body `{answers: [...]}`; returns `{score, summary}`.
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    body: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<NormalizedResult>, AppError> {
    let Json(request) = body?;
    let result = state.pipeline.invoke(TaskInput::Summarize(request)).await?;
    Ok(Json(result))
}
