//! Component evaluators — one per assessable channel.
//!
//! MCQ scoring is pure arithmetic. Code and voice evaluation each make one
//! LLM call per item and return a fixed neutral default on any failure:
//! a single bad evaluation must never block the pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluation::models::McqSummary;
use crate::evaluation::prompts::{
    CODE_EVAL_PROMPT_TEMPLATE, CODE_EVAL_SYSTEM, VOICE_EVAL_PROMPT_TEMPLATE, VOICE_EVAL_SYSTEM,
};
use crate::generation::models::{CodingChallenge, McqQuestion};
use crate::llm_client::sanitize::sanitize_for_prompt;
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};
use crate::models::plan::McqAnswer;

/// Fixed weights for the four code dimensions.
const CODE_WEIGHTS: (f64, f64, f64, f64) = (0.4, 0.3, 0.2, 0.1);
const NEUTRAL_DIMENSION: f64 = 5.0;
const NEUTRAL_VOICE_SCORE: f64 = 50.0;

// ────────────────────────────────────────────────────────────────────────────
// MCQ — deterministic, O(1) per answer
// ────────────────────────────────────────────────────────────────────────────

/// Scores MCQ answers by exact index equality against the stored questions.
/// Unanswered questions count as incorrect.
pub fn score_mcq(questions: &[McqQuestion], answers: &[McqAnswer]) -> McqSummary {
    let total = questions.len();
    let correct = questions
        .iter()
        .filter(|q| {
            answers
                .iter()
                .any(|a| a.question_id == q.id && a.selected_index == q.correct_index)
        })
        .count();

    let score = if total == 0 {
        0.0
    } else {
        (correct as f64 / total as f64) * 100.0
    };

    McqSummary { total, correct, score }
}

// ────────────────────────────────────────────────────────────────────────────
// Code — one LLM call per submission, neutral default on failure
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEvaluation {
    /// All four dimensions 0–10.
    pub correctness: f64,
    pub problem_solving: f64,
    pub code_quality: f64,
    pub completeness: f64,
    /// Weighted combination rescaled to 0–100.
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
struct CodeEvalRaw {
    #[serde(default = "neutral")]
    correctness: f64,
    #[serde(default = "neutral")]
    problem_solving: f64,
    #[serde(default = "neutral")]
    code_quality: f64,
    #[serde(default = "neutral")]
    completeness: f64,
    #[serde(default)]
    feedback: String,
}

fn neutral() -> f64 {
    NEUTRAL_DIMENSION
}

/// `round((c*0.4 + p*0.3 + q*0.2 + comp*0.1) * 10)` on 0–10 inputs → 0–100.
pub fn combine_code_dimensions(
    correctness: f64,
    problem_solving: f64,
    code_quality: f64,
    completeness: f64,
) -> f64 {
    let (wc, wp, wq, wz) = CODE_WEIGHTS;
    ((correctness * wc + problem_solving * wp + code_quality * wq + completeness * wz) * 10.0)
        .round()
}

fn neutral_code_evaluation() -> CodeEvaluation {
    CodeEvaluation {
        correctness: NEUTRAL_DIMENSION,
        problem_solving: NEUTRAL_DIMENSION,
        code_quality: NEUTRAL_DIMENSION,
        completeness: NEUTRAL_DIMENSION,
        score: combine_code_dimensions(
            NEUTRAL_DIMENSION,
            NEUTRAL_DIMENSION,
            NEUTRAL_DIMENSION,
            NEUTRAL_DIMENSION,
        ),
        feedback: "Automated evaluation was unavailable; a neutral score was assigned."
            .to_string(),
    }
}

/// Evaluates one code submission. Any provider or parse failure returns the
/// neutral default instead of propagating.
pub async fn evaluate_code_submission(
    llm: &LlmClient,
    challenge: &CodingChallenge,
    code: &str,
) -> CodeEvaluation {
    let prompt = CODE_EVAL_PROMPT_TEMPLATE
        .replace("{title}", &challenge.title)
        .replace("{description}", &challenge.description)
        .replace("{criteria}", &challenge.evaluation_criteria.join("; "))
        .replace("{language}", &challenge.language)
        .replace("{code}", &sanitize_for_prompt(code));

    let messages = [ChatMessage::system(CODE_EVAL_SYSTEM), ChatMessage::user(prompt)];

    match llm.call_json::<CodeEvalRaw>(&messages, CallOpts::deterministic()).await {
        Ok(raw) => {
            let correctness = raw.correctness.clamp(0.0, 10.0);
            let problem_solving = raw.problem_solving.clamp(0.0, 10.0);
            let code_quality = raw.code_quality.clamp(0.0, 10.0);
            let completeness = raw.completeness.clamp(0.0, 10.0);
            CodeEvaluation {
                correctness,
                problem_solving,
                code_quality,
                completeness,
                score: combine_code_dimensions(
                    correctness,
                    problem_solving,
                    code_quality,
                    completeness,
                ),
                feedback: raw.feedback,
            }
        }
        Err(e) => {
            warn!("Code evaluation failed for '{}' ({e}); using neutral default", challenge.title);
            neutral_code_evaluation()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Voice — one LLM call per answer, neutral default on failure
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AnswerQuality {
    fn from_raw(raw: &str, score: f64) -> Self {
        match raw.to_lowercase().as_str() {
            "excellent" => AnswerQuality::Excellent,
            "good" => AnswerQuality::Good,
            "fair" => AnswerQuality::Fair,
            "poor" => AnswerQuality::Poor,
            // Unrecognized labels fall back to the score.
            _ => {
                if score >= 85.0 {
                    AnswerQuality::Excellent
                } else if score >= 65.0 {
                    AnswerQuality::Good
                } else if score >= 40.0 {
                    AnswerQuality::Fair
                } else {
                    AnswerQuality::Poor
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAnswerEvaluation {
    /// 0–100.
    pub score: f64,
    pub quality: AnswerQuality,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
struct VoiceEvalRaw {
    score: f64,
    #[serde(default)]
    quality: String,
    #[serde(default)]
    feedback: String,
}

/// Evaluates one spoken answer. Failure returns score 50 / "fair".
pub async fn evaluate_voice_answer(
    llm: &LlmClient,
    question: &str,
    answer: &str,
) -> VoiceAnswerEvaluation {
    let prompt = VOICE_EVAL_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", &sanitize_for_prompt(answer));

    let messages = [ChatMessage::system(VOICE_EVAL_SYSTEM), ChatMessage::user(prompt)];

    match llm.call_json::<VoiceEvalRaw>(&messages, CallOpts::deterministic()).await {
        Ok(raw) => {
            let score = raw.score.clamp(0.0, 100.0);
            VoiceAnswerEvaluation {
                score,
                quality: AnswerQuality::from_raw(&raw.quality, score),
                feedback: raw.feedback,
            }
        }
        Err(e) => {
            warn!("Voice answer evaluation failed ({e}); using neutral default");
            VoiceAnswerEvaluation {
                score: NEUTRAL_VOICE_SCORE,
                quality: AnswerQuality::Fair,
                feedback: "Automated evaluation was unavailable; a neutral score was assigned."
                    .to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn mcq(correct_index: usize) -> McqQuestion {
        McqQuestion {
            id: Uuid::new_v4(),
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index,
            topic: "t".to_string(),
        }
    }

    #[test]
    fn test_mcq_exact_index_equality() {
        let questions = vec![mcq(0), mcq(1), mcq(2)];
        let answers = vec![
            McqAnswer { question_id: questions[0].id, selected_index: 0 },
            McqAnswer { question_id: questions[1].id, selected_index: 3 },
            McqAnswer { question_id: questions[2].id, selected_index: 2 },
        ];
        let summary = score_mcq(&questions, &answers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.correct, 2);
        assert!((summary.score - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_mcq_unanswered_counts_incorrect() {
        let questions = vec![mcq(0), mcq(1)];
        let answers = vec![McqAnswer { question_id: questions[0].id, selected_index: 0 }];
        let summary = score_mcq(&questions, &answers);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.score, 50.0);
    }

    #[test]
    fn test_mcq_empty_question_set_scores_zero() {
        let summary = score_mcq(&[], &[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn test_code_dimensions_all_tens_is_100() {
        assert_eq!(combine_code_dimensions(10.0, 10.0, 10.0, 10.0), 100.0);
    }

    #[test]
    fn test_code_dimensions_all_zeros_is_0() {
        assert_eq!(combine_code_dimensions(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_code_dimensions_correctness_only_is_40() {
        assert_eq!(combine_code_dimensions(10.0, 0.0, 0.0, 0.0), 40.0);
    }

    #[test]
    fn test_neutral_code_evaluation_scores_50() {
        let neutral = neutral_code_evaluation();
        assert_eq!(neutral.score, 50.0);
        assert_eq!(neutral.correctness, 5.0);
    }

    #[test]
    fn test_answer_quality_label_coercion() {
        assert_eq!(AnswerQuality::from_raw("Excellent", 0.0), AnswerQuality::Excellent);
        assert_eq!(AnswerQuality::from_raw("poor", 100.0), AnswerQuality::Poor);
        // Unknown label falls back to score-derived quality.
        assert_eq!(AnswerQuality::from_raw("great", 90.0), AnswerQuality::Excellent);
        assert_eq!(AnswerQuality::from_raw("", 50.0), AnswerQuality::Fair);
        assert_eq!(AnswerQuality::from_raw("", 20.0), AnswerQuality::Poor);
    }
}
