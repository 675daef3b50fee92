//! MCQ generation — one batched LLM call, deterministic template top-up.

use tracing::warn;
use uuid::Uuid;

use crate::analysis::models::ProfileClassification;
use crate::generation::fallback::fallback_mcq_question;
use crate::generation::models::{GeneratedMcqBatch, McqQuestion};
use crate::generation::prompts::{MCQ_SYSTEM, MCQ_TEMPLATE};
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};
use crate::planner::ExperienceLevel;

/// Generates exactly `count` MCQ questions. Malformed items from the LLM are
/// dropped and count toward the template top-up, so the returned set always
/// has the requested size and every item has a valid answer index.
pub async fn generate_mcq_questions(
    llm: &LlmClient,
    classification: &ProfileClassification,
    count: u32,
) -> Vec<McqQuestion> {
    let count = count as usize;
    let level = ExperienceLevel::from_years(classification.years_experience);

    let prompt = MCQ_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{role}", classification.role_category.label())
        .replace("{level}", level.as_str())
        .replace("{skills}", &classification.key_skills.join(", "));

    let messages = [ChatMessage::system(MCQ_SYSTEM), ChatMessage::user(prompt)];

    let mut questions: Vec<McqQuestion> = match llm
        .call_json::<GeneratedMcqBatch>(&messages, CallOpts::default())
        .await
    {
        Ok(batch) => batch
            .questions
            .into_iter()
            .filter(|q| q.is_valid())
            .take(count)
            .map(|q| McqQuestion {
                id: Uuid::new_v4(),
                question: q.question,
                options: q.options,
                correct_index: q.correct_index,
                topic: q.topic.unwrap_or_else(|| "general".to_string()),
            })
            .collect(),
        Err(e) => {
            warn!("MCQ generation call failed ({e}); using templates for all {count} slots");
            Vec::new()
        }
    };

    if questions.len() < count {
        warn!(
            "MCQ generation returned {}/{} usable questions; topping up from templates",
            questions.len(),
            count
        );
    }

    while questions.len() < count {
        questions.push(fallback_mcq_question(questions.len()));
    }

    questions
}
