use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three operations the relay performs against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    GenerateQuestions,
    ScoreAnswer,
    Summarize,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::GenerateQuestions => "generate_questions",
            TaskKind::ScoreAnswer => "score_answer",
            TaskKind::Summarize => "summarize",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse of a provider-supplied difficulty label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Canonical layout of a generated question set: 2 Easy, 2 Medium, 2 Hard.
pub const QUESTION_SET_LAYOUT: [Difficulty; 6] = [
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Hard,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub question: String,
    pub difficulty: Difficulty,
    /// Seconds allotted to answer; `null` when the provider omitted it.
    pub time_limit: Option<u32>,
    pub expected_answer: Option<String>,
}

/// Ordered questions as returned by the provider, ids assigned locally.
pub type QuestionSet = Vec<Question>;

impl Question {
    pub fn follows_layout(set: &[Question]) -> bool {
        set.len() == QUESTION_SET_LAYOUT.len()
            && set
                .iter()
                .zip(QUESTION_SET_LAYOUT.iter())
                .all(|(q, d)| q.difficulty == *d)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreResult {
    /// 0 – 100; `null` when the provider sent no usable number.
    pub score: Option<u8>,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResult {
    pub score: Option<u8>,
    pub summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Task inputs (as received from callers; validated by the pipeline)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
}

/// The question being answered, echoed back by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPrompt {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub time_limit: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAnswerRequest {
    #[serde(default)]
    pub question: Option<QuestionPrompt>,
    #[serde(default)]
    pub answer: Option<String>,
    /// Seconds the candidate spent; `0` is valid, `null` is not.
    #[serde(default)]
    pub time_spent: Option<f64>,
}

/// One answered question as stored by the client. Forwarded to the provider
/// verbatim, so its shape is not constrained here.
pub type AnswerRecord = serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub answers: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(difficulty: Difficulty) -> Question {
        Question {
            id: Uuid::new_v4(),
            question: "q".to_string(),
            difficulty,
            time_limit: Some(20),
            expected_answer: None,
        }
    }

    #[test]
    fn test_difficulty_label_is_case_insensitive() {
        assert_eq!(Difficulty::from_label("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_label(" MEDIUM "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_label("Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_label("expert"), None);
    }

    #[test]
    fn test_question_serializes_camel_case() {
        let q = question(Difficulty::Medium);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["difficulty"], "Medium");
        assert_eq!(json["timeLimit"], 20);
        assert!(json["expectedAnswer"].is_null());
        assert!(json.get("time_limit").is_none());
    }

    #[test]
    fn test_score_request_accepts_zero_time() {
        let req: ScoreAnswerRequest = serde_json::from_value(serde_json::json!({
            "question": {"question": "What is JSX?", "difficulty": "Easy", "timeLimit": 20},
            "answer": "A syntax extension",
            "timeSpent": 0
        }))
        .unwrap();
        assert_eq!(req.time_spent, Some(0.0));
        assert_eq!(req.question.unwrap().difficulty.as_deref(), Some("Easy"));

        let req: ScoreAnswerRequest =
            serde_json::from_value(serde_json::json!({"timeSpent": null})).unwrap();
        assert!(req.time_spent.is_none());
        assert!(req.question.is_none());
    }

    #[test]
    fn test_layout_check() {
        let set: Vec<_> = QUESTION_SET_LAYOUT.iter().map(|d| question(*d)).collect();
        assert!(Question::follows_layout(&set));

        let mut swapped = set.clone();
        swapped.swap(0, 5);
        assert!(!Question::follows_layout(&swapped));
        assert!(!Question::follows_layout(&set[..4]));
    }
}
