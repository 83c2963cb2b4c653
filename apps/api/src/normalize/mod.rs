//! Response Normalizer: turns raw provider text into a validated result.
//!
//! Provider text is untrusted. Nothing here assumes it is well-formed JSON:
//! every step returns a `Result`, and a result is only built once the whole
//! reply has been checked.
//!
//! Errors never carry the raw text. Callers that want it for diagnosis log
//! it themselves.

pub mod score;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::interview::{
    Difficulty, Question, QuestionSet, ScoreResult, SummaryResult, TaskKind,
};
use score::normalize_score;

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("provider reply is not valid JSON: {0}")]
    NotParsable(#[source] serde_json::Error),

    #[error("provider reply has the wrong shape: {0}")]
    WrongShape(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NormalizedResult {
    Questions(QuestionSet),
    Score(ScoreResult),
    Summary(SummaryResult),
}

/// Strips a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// The opening fence line is dropped up to and including its newline, and a
/// closing fence at the very end is dropped if present. Unfenced input comes
/// back trimmed and otherwise untouched.
pub fn strip_fence(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with(FENCE) {
        return text;
    }
    let Some(newline) = text.find('\n') else {
        return text;
    };
    let body = text[newline + 1..].trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Parses and shape-checks a provider reply for the given task.
pub fn normalize(kind: TaskKind, raw: &str) -> Result<NormalizedResult, NormalizeError> {
    match kind {
        TaskKind::GenerateQuestions => parse_questions(raw).map(NormalizedResult::Questions),
        TaskKind::ScoreAnswer => parse_score_reply(raw).map(NormalizedResult::Score),
        TaskKind::Summarize => parse_summary_reply(raw).map(NormalizedResult::Summary),
    }
}

/// Expects a JSON array of `{question, difficulty, timeLimit?, expectedAnswer?}`.
/// Every question gets a fresh id; order is preserved.
pub fn parse_questions(raw: &str) -> Result<QuestionSet, NormalizeError> {
    let value = parse_json(raw)?;
    let items = value
        .as_array()
        .ok_or_else(|| NormalizeError::WrongShape("expected a JSON array of questions".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = item.as_object().ok_or_else(|| {
                NormalizeError::WrongShape(format!("question {index} is not an object"))
            })?;
            question_from(index, obj)
        })
        .collect()
}

pub fn parse_score_reply(raw: &str) -> Result<ScoreResult, NormalizeError> {
    let (score, feedback) = scored_text(&parse_json(raw)?, "feedback")?;
    Ok(ScoreResult { score, feedback })
}

pub fn parse_summary_reply(raw: &str) -> Result<SummaryResult, NormalizeError> {
    let (score, summary) = scored_text(&parse_json(raw)?, "summary")?;
    Ok(SummaryResult { score, summary })
}

fn parse_json(raw: &str) -> Result<Value, NormalizeError> {
    serde_json::from_str(strip_fence(raw)).map_err(NormalizeError::NotParsable)
}

fn question_from(index: usize, obj: &Map<String, Value>) -> Result<Question, NormalizeError> {
    let question = obj
        .get("question")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| NormalizeError::WrongShape(format!("question {index} has no `question` text")))?;

    let difficulty = obj
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::from_label)
        .ok_or_else(|| {
            NormalizeError::WrongShape(format!("question {index} has no valid `difficulty`"))
        })?;

    let time_limit = obj
        .get("timeLimit")
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u32);

    let expected_answer = obj
        .get("expectedAnswer")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(Question {
        id: Uuid::new_v4(),
        question: question.to_string(),
        difficulty,
        time_limit,
        expected_answer,
    })
}

/// Pulls `score` and a named text field out of a single JSON object.
/// A missing or non-numeric score is kept as `None`; missing text is empty.
fn scored_text(value: &Value, text_field: &str) -> Result<(Option<u8>, String), NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| NormalizeError::WrongShape("expected a JSON object".into()))?;

    let score = obj.get("score").and_then(Value::as_f64).map(normalize_score);
    let text = obj
        .get(text_field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok((score, text))
}
