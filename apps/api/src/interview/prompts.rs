// Prompt text for the three interview tasks.
// The provider is asked for bare JSON; the normalizer still tolerates fences.

use crate::llm_client::GenerateContentRequest;
use crate::models::interview::QuestionPrompt;

/// System prompt for question generation: 6 questions, 2 per difficulty.
pub const QUESTIONS_SYSTEM: &str = "You are an AI assistant that generates interview questions \
    for a Full Stack Developer role focusing on React and Node.js. \
    You will create exactly 6 questions: first 2 Easy, then 2 Medium, then 2 Hard. \
    Return only a JSON array of objects with keys: question (string), \
    difficulty (Easy, Medium, Hard), timeLimit (number of seconds). \
    Do not include any extra text.";

/// System prompt for single-answer scoring.
pub const SCORING_SYSTEM: &str = "You are an AI assistant that scores interview answers. \
    Provide only a JSON object with keys: score (integer between 0 and 100), \
    feedback (string). Do not include extra text.";

/// System prompt for the end-of-session summary.
pub const SUMMARY_SYSTEM: &str = "You are an AI assistant that summarizes interview answers \
    and computes a final score. Provide only a JSON object with keys: \
    score (integer between 0 and 100), summary (string). Do not include extra text.";

pub fn questions_payload(resume_text: &str) -> GenerateContentRequest {
    let user = format!(
        "Generate 6 interview questions for a Full Stack (React/Node.js) developer based on \
         the following resume. The questions should be ordered: first 2 Easy, next 2 Medium, \
         last 2 Hard.\nResume:\n{resume_text}"
    );
    GenerateContentRequest::single_turn(None, format!("Context: {QUESTIONS_SYSTEM}\n\nUser: {user}"))
}

pub fn scoring_payload(
    question: &QuestionPrompt,
    answer: &str,
    time_spent: f64,
) -> GenerateContentRequest {
    let difficulty = question.difficulty.as_deref().unwrap_or("unspecified");
    let time_limit = match &question.time_limit {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) if !v.is_null() => v.to_string(),
        _ => "unspecified".to_string(),
    };
    let user = format!(
        "Question: {}\nDifficulty: {difficulty}\nTime limit: {time_limit}\n\
         Candidate answer: {answer}\nTime spent: {time_spent}",
        question.question
    );
    GenerateContentRequest::single_turn(Some("user"), format!("{SCORING_SYSTEM}\n\n{user}"))
}

/// `answers_json` is the caller's answer list, already pretty-printed.
pub fn summary_payload(answers_json: &str) -> GenerateContentRequest {
    let user = format!("Here are the candidate's answers:\n{answers_json}");
    GenerateContentRequest::single_turn(Some("user"), format!("{SUMMARY_SYSTEM}\n\n{user}"))
}
