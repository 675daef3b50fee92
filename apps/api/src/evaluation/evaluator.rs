//! Top-level interview evaluation.
//!
//! Components are scored first (MCQ arithmetic, LLM per-item scoring for
//! voice and code), then the full transcript goes through multi-LLM
//! arbitration. If arbitration is disabled or fails entirely, a purely
//! arithmetic aggregation of the component scores is the backstop, so a
//! finished interview always gets an evaluation.

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::arbiter::{run_arbitration, ArbitrationStrategy};
use crate::evaluation::components::{
    evaluate_code_submission, evaluate_voice_answer, score_mcq,
};
use crate::evaluation::models::{
    CodeSubmissionRecord, ComponentScores, EvaluationMethod, FinalEvaluation,
    InterviewTranscript, SkillLevel, VoiceExchange,
};
use crate::llm_client::LlmClient;
use crate::models::plan::InterviewPlanDoc;
use crate::planner::ExperienceLevel;

/// Assembles the normalized transcript from a plan document. MCQ answers are
/// pre-scored here since their scoring needs no model.
pub fn build_transcript(doc: &InterviewPlanDoc) -> InterviewTranscript {
    let voice = doc
        .voice_answers
        .iter()
        .flatten()
        .map(|a| VoiceExchange {
            question: a.question.clone(),
            answer: a.answer.clone(),
        })
        .collect();

    let mcq = match (&doc.mcq_questions, &doc.mcq_answers) {
        (Some(questions), Some(answers)) if !answers.is_empty() => {
            Some(score_mcq(questions, answers))
        }
        _ => None,
    };

    let code = doc
        .code_answers
        .iter()
        .flatten()
        .map(|a| {
            let title = doc
                .coding_challenges
                .iter()
                .flatten()
                .find(|c| c.id == a.challenge_id)
                .map(|c| c.title.clone())
                .unwrap_or_else(|| "Coding challenge".to_string());
            CodeSubmissionRecord {
                challenge_title: title,
                language: a.language.clone(),
                code: a.code.clone(),
            }
        })
        .collect();

    InterviewTranscript { voice, mcq, code }
}

/// Fixed component weights by which components are present:
/// all three 0.3/0.35/0.35, voice+one 0.4/0.6, mcq+code 0.5/0.5, single 1.0.
fn component_weights(scores: &ComponentScores) -> (f64, f64, f64) {
    match (scores.voice.is_some(), scores.mcq.is_some(), scores.code.is_some()) {
        (true, true, true) => (0.3, 0.35, 0.35),
        (true, true, false) => (0.4, 0.6, 0.0),
        (true, false, true) => (0.4, 0.0, 0.6),
        (false, true, true) => (0.0, 0.5, 0.5),
        (true, false, false) => (1.0, 0.0, 0.0),
        (false, true, false) => (0.0, 1.0, 0.0),
        (false, false, true) => (0.0, 0.0, 1.0),
        (false, false, false) => (0.0, 0.0, 0.0),
    }
}

/// Weighted blend of whichever component scores exist. `None` when none do.
pub fn aggregate_component_scores(scores: &ComponentScores) -> Option<f64> {
    let (wv, wm, wc) = component_weights(scores);
    if wv + wm + wc == 0.0 {
        return None;
    }
    let total = scores.voice.unwrap_or(0.0) * wv
        + scores.mcq.unwrap_or(0.0) * wm
        + scores.code.unwrap_or(0.0) * wc;
    Some(total.round())
}

fn backstop_evaluation(scores: ComponentScores, overall: f64) -> FinalEvaluation {
    let skill_level = SkillLevel::from_score(overall);

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let labeled = [
        ("spoken answers", scores.voice),
        ("knowledge questions", scores.mcq),
        ("coding challenges", scores.code),
    ];
    for (label, score) in labeled {
        match score {
            Some(s) if s >= 75.0 => strengths.push(format!("Solid performance on {label}")),
            Some(s) if s < 50.0 => improvements.push(format!("Weak performance on {label}")),
            _ => {}
        }
    }

    FinalEvaluation {
        overall_score: overall,
        component_scores: scores,
        skill_level,
        recommendation: skill_level.recommendation(),
        strengths,
        improvements,
        method: EvaluationMethod::DeterministicAggregation,
        arbitration: None,
        evaluated_at: Utc::now(),
    }
}

/// Evaluates one completed (or partially completed) interview.
///
/// Fails only when the plan document holds no candidate responses at all.
pub async fn evaluate_interview(
    primary: &LlmClient,
    providers: &[LlmClient],
    strategy: &dyn ArbitrationStrategy,
    multi_llm_enabled: bool,
    doc: &InterviewPlanDoc,
) -> Result<FinalEvaluation, AppError> {
    let transcript = build_transcript(doc);
    if transcript.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "no interview responses to evaluate".to_string(),
        ));
    }

    // Per-component scoring first; these feed both paths.
    let voice_score = if transcript.voice.is_empty() {
        None
    } else {
        let calls = transcript
            .voice
            .iter()
            .map(|x| evaluate_voice_answer(primary, &x.question, &x.answer));
        let evals = join_all(calls).await;
        let mean = evals.iter().map(|e| e.score).sum::<f64>() / evals.len() as f64;
        Some(mean.round())
    };

    let mcq_score = transcript.mcq.as_ref().map(|m| m.score.round());

    let code_score = if doc.code_answers.as_ref().map_or(true, |a| a.is_empty()) {
        None
    } else {
        let answers = doc.code_answers.iter().flatten();
        let calls = answers.filter_map(|a| {
            doc.coding_challenges
                .iter()
                .flatten()
                .find(|c| c.id == a.challenge_id)
                .map(|challenge| evaluate_code_submission(primary, challenge, &a.code))
        });
        let evals = join_all(calls).await;
        if evals.is_empty() {
            None
        } else {
            let mean = evals.iter().map(|e| e.score).sum::<f64>() / evals.len() as f64;
            Some(mean.round())
        }
    };

    let component_scores = ComponentScores {
        voice: voice_score,
        mcq: mcq_score,
        code: code_score,
    };
    let aggregate = aggregate_component_scores(&component_scores).ok_or_else(|| {
        AppError::UnprocessableEntity("no interview responses to evaluate".to_string())
    })?;

    if !multi_llm_enabled || providers.is_empty() {
        info!("Multi-LLM evaluation disabled; using deterministic aggregation");
        return Ok(backstop_evaluation(component_scores, aggregate));
    }

    let (role, level) = match &doc.classification {
        Some(c) => (
            c.role_category.label().to_string(),
            ExperienceLevel::from_years(c.years_experience).as_str().to_string(),
        ),
        None => ("unspecified role".to_string(), "mid".to_string()),
    };

    match run_arbitration(providers, strategy, &transcript, &role, &level).await {
        Ok(arbitrated) => {
            info!(
                "Arbitration complete: score {} via {:?}",
                arbitrated.final_score, arbitrated.arbitration_method
            );
            let skill_level = SkillLevel::from_score(arbitrated.final_score);
            Ok(FinalEvaluation {
                overall_score: arbitrated.final_score,
                component_scores,
                skill_level,
                recommendation: arbitrated.recommendation,
                strengths: arbitrated.strengths.clone(),
                improvements: arbitrated.improvements.clone(),
                method: EvaluationMethod::MultiLlmArbitration,
                arbitration: Some(arbitrated),
                evaluated_at: Utc::now(),
            })
        }
        Err(e) => {
            warn!("Arbitration failed ({e}); falling back to deterministic aggregation");
            Ok(backstop_evaluation(component_scores, aggregate))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::models::McqSummary;
    use crate::generation::models::McqQuestion;
    use crate::models::plan::{McqAnswer, VoiceAnswer};
    use uuid::Uuid;

    #[test]
    fn test_weight_table_all_three() {
        let scores = ComponentScores {
            voice: Some(80.0),
            mcq: Some(60.0),
            code: Some(70.0),
        };
        // 80*0.3 + 60*0.35 + 70*0.35 = 24 + 21 + 24.5 = 69.5 -> 70
        assert_eq!(aggregate_component_scores(&scores), Some(70.0));
    }

    #[test]
    fn test_weight_table_voice_and_mcq() {
        let scores = ComponentScores {
            voice: Some(80.0),
            mcq: Some(60.0),
            code: None,
        };
        // 80*0.4 + 60*0.6 = 68
        assert_eq!(aggregate_component_scores(&scores), Some(68.0));
    }

    #[test]
    fn test_weight_table_mcq_and_code() {
        let scores = ComponentScores {
            voice: None,
            mcq: Some(60.0),
            code: Some(80.0),
        };
        assert_eq!(aggregate_component_scores(&scores), Some(70.0));
    }

    #[test]
    fn test_weight_table_single_component() {
        let scores = ComponentScores {
            voice: None,
            mcq: Some(85.0),
            code: None,
        };
        assert_eq!(aggregate_component_scores(&scores), Some(85.0));
    }

    #[test]
    fn test_weight_table_empty_is_none() {
        assert_eq!(aggregate_component_scores(&ComponentScores::default()), None);
    }

    #[test]
    fn test_backstop_derivation() {
        let scores = ComponentScores {
            voice: Some(80.0),
            mcq: Some(40.0),
            code: None,
        };
        let eval = backstop_evaluation(scores, 56.0);
        assert_eq!(eval.skill_level, SkillLevel::Junior);
        assert_eq!(eval.recommendation, SkillLevel::Junior.recommendation());
        assert_eq!(eval.method, EvaluationMethod::DeterministicAggregation);
        assert!(eval.strengths.iter().any(|s| s.contains("spoken answers")));
        assert!(eval.improvements.iter().any(|s| s.contains("knowledge questions")));
        assert!(eval.arbitration.is_none());
    }

    #[test]
    fn test_build_transcript_from_doc() {
        let question_id = Uuid::new_v4();
        let mut doc = InterviewPlanDoc::new();
        doc.voice_answers = Some(vec![VoiceAnswer {
            question_id: Uuid::new_v4(),
            question: "Describe a production incident you owned.".to_string(),
            answer: "A cache stampede took down our search tier.".to_string(),
        }]);
        doc.mcq_questions = Some(vec![McqQuestion {
            id: question_id,
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 1,
            topic: "t".to_string(),
        }]);
        doc.mcq_answers = Some(vec![McqAnswer {
            question_id,
            selected_index: 1,
        }]);

        let transcript = build_transcript(&doc);
        assert_eq!(transcript.voice.len(), 1);
        let McqSummary { total, correct, score } = transcript.mcq.unwrap();
        assert_eq!((total, correct), (1, 1));
        assert_eq!(score, 100.0);
        assert!(transcript.code.is_empty());
    }

    #[test]
    fn test_build_transcript_empty_doc() {
        assert!(build_transcript(&InterviewPlanDoc::new()).is_empty());
    }
}
