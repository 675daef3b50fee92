//! Voice question generation.
//!
//! One batched LLM call sized per the plan; any shortfall is filled
//! question-by-question (not re-batched), each top-up call carrying the
//! running list of already-asked questions and topics so topics do not
//! repeat. A failed top-up call degrades to a generic template for that slot.

use tracing::warn;
use uuid::Uuid;

use crate::analysis::models::ProfileClassification;
use crate::generation::fallback::fallback_voice_question;
use crate::generation::models::{GeneratedVoiceBatch, GeneratedVoiceQuestion, VoiceQuestion};
use crate::generation::prompts::{VOICE_BATCH_TEMPLATE, VOICE_SINGLE_TEMPLATE, VOICE_SYSTEM};
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};
use crate::planner::ExperienceLevel;

/// Generates exactly `count` voice questions. Infallible by design: every
/// failure path is topped up deterministically.
pub async fn generate_voice_questions(
    llm: &LlmClient,
    classification: &ProfileClassification,
    count: u32,
    focus_areas: &[String],
) -> Vec<VoiceQuestion> {
    let count = count as usize;
    let level = ExperienceLevel::from_years(classification.years_experience);

    let mut questions: Vec<VoiceQuestion> = match batch_call(llm, classification, level, count, focus_areas).await {
        Some(batch) => batch
            .questions
            .into_iter()
            .filter(|q| !q.text.trim().is_empty())
            .take(count)
            .map(materialize)
            .collect(),
        None => {
            warn!("Voice batch generation failed entirely; filling all {count} slots individually");
            Vec::new()
        }
    };

    if questions.len() < count {
        warn!(
            "Voice batch returned {}/{} questions; topping up one by one",
            questions.len(),
            count
        );
    }

    while questions.len() < count {
        let slot = questions.len();
        let question = match single_call(llm, classification, level, &questions).await {
            Some(generated) => materialize(generated),
            None => {
                let topics: Vec<String> = questions.iter().map(|q| q.topic.clone()).collect();
                fallback_voice_question(slot, &topics)
            }
        };
        questions.push(question);
    }

    questions
}

async fn batch_call(
    llm: &LlmClient,
    classification: &ProfileClassification,
    level: ExperienceLevel,
    count: usize,
    focus_areas: &[String],
) -> Option<GeneratedVoiceBatch> {
    let prompt = VOICE_BATCH_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{role}", classification.role_category.label())
        .replace("{level}", level.as_str())
        .replace("{skills}", &classification.key_skills.join(", "))
        .replace("{focus_areas}", &focus_areas.join(", "));

    let messages = [ChatMessage::system(VOICE_SYSTEM), ChatMessage::user(prompt)];
    llm.call_json(&messages, CallOpts::default()).await.ok()
}

async fn single_call(
    llm: &LlmClient,
    classification: &ProfileClassification,
    level: ExperienceLevel,
    asked: &[VoiceQuestion],
) -> Option<GeneratedVoiceQuestion> {
    let asked_questions = if asked.is_empty() {
        "(none yet)".to_string()
    } else {
        asked
            .iter()
            .map(|q| format!("- {}", q.text))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let asked_topics = if asked.is_empty() {
        "(none yet)".to_string()
    } else {
        asked.iter().map(|q| q.topic.as_str()).collect::<Vec<_>>().join(", ")
    };

    let prompt = VOICE_SINGLE_TEMPLATE
        .replace("{role}", classification.role_category.label())
        .replace("{level}", level.as_str())
        .replace("{asked_questions}", &asked_questions)
        .replace("{asked_topics}", &asked_topics);

    let messages = [ChatMessage::system(VOICE_SYSTEM), ChatMessage::user(prompt)];
    llm.call_json(&messages, CallOpts::default()).await.ok()
}

fn materialize(generated: GeneratedVoiceQuestion) -> VoiceQuestion {
    VoiceQuestion {
        id: Uuid::new_v4(),
        text: generated.text,
        topic: generated.topic.unwrap_or_else(|| "general".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_defaults_topic() {
        let q = materialize(GeneratedVoiceQuestion {
            text: "Tell me about your last project.".to_string(),
            topic: None,
        });
        assert_eq!(q.topic, "general");
        assert!(!q.text.is_empty());
    }

    #[test]
    fn test_batch_shape_deserializes() {
        let json = r#"{"questions": [{"text": "Why this role?", "topic": "motivation"}]}"#;
        let batch: GeneratedVoiceBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.questions[0].topic.as_deref(), Some("motivation"));
    }
}
