//! Coding challenge generation — one batched LLM call, template top-up.

use tracing::warn;
use uuid::Uuid;

use crate::analysis::models::ProfileClassification;
use crate::generation::fallback::fallback_code_challenge;
use crate::generation::models::{CodingChallenge, GeneratedChallengeBatch};
use crate::generation::prompts::{CODE_SYSTEM, CODE_TEMPLATE};
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};
use crate::planner::ExperienceLevel;

const DEFAULT_TIME_LIMIT_MINUTES: u32 = 45;

/// Generates exactly `count` coding challenges, topping up from deterministic
/// templates on any provider or parse failure.
pub async fn generate_coding_challenges(
    llm: &LlmClient,
    classification: &ProfileClassification,
    count: u32,
) -> Vec<CodingChallenge> {
    let count = count as usize;
    let level = ExperienceLevel::from_years(classification.years_experience);

    let languages = if classification.primary_languages.is_empty() {
        "any mainstream language".to_string()
    } else {
        classification.primary_languages.join(", ")
    };

    let prompt = CODE_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{role}", classification.role_category.label())
        .replace("{level}", level.as_str())
        .replace("{languages}", &languages)
        .replace("{skills}", &classification.key_skills.join(", "));

    let messages = [ChatMessage::system(CODE_SYSTEM), ChatMessage::user(prompt)];

    let mut challenges: Vec<CodingChallenge> = match llm
        .call_json::<GeneratedChallengeBatch>(&messages, CallOpts::default())
        .await
    {
        Ok(batch) => batch
            .challenges
            .into_iter()
            .filter(|c| !c.title.trim().is_empty() && !c.description.trim().is_empty())
            .take(count)
            .map(|c| CodingChallenge {
                id: Uuid::new_v4(),
                title: c.title,
                description: c.description,
                language: c.language.unwrap_or_else(|| {
                    classification
                        .primary_languages
                        .first()
                        .cloned()
                        .unwrap_or_else(|| "python".to_string())
                }),
                starter_code: c.starter_code,
                evaluation_criteria: if c.evaluation_criteria.is_empty() {
                    vec!["correctness".to_string(), "code clarity".to_string()]
                } else {
                    c.evaluation_criteria
                },
                time_limit_minutes: c.time_limit_minutes.unwrap_or(DEFAULT_TIME_LIMIT_MINUTES),
            })
            .collect(),
        Err(e) => {
            warn!("Code generation call failed ({e}); using templates for all {count} slots");
            Vec::new()
        }
    };

    if challenges.len() < count {
        warn!(
            "Code generation returned {}/{} usable challenges; topping up from templates",
            challenges.len(),
            count
        );
    }

    while challenges.len() < count {
        challenges.push(fallback_code_challenge(challenges.len(), classification, level));
    }

    challenges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_shape_with_missing_optionals() {
        let json = r#"{
            "challenges": [
                {"title": "T", "description": "D"}
            ]
        }"#;
        let batch: GeneratedChallengeBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.challenges.len(), 1);
        assert!(batch.challenges[0].language.is_none());
        assert!(batch.challenges[0].evaluation_criteria.is_empty());
    }

    #[test]
    fn test_blank_items_filtered() {
        let json = r#"{
            "challenges": [
                {"title": " ", "description": "D"},
                {"title": "T", "description": "D"}
            ]
        }"#;
        let batch: GeneratedChallengeBatch = serde_json::from_str(json).unwrap();
        let kept: Vec<_> = batch
            .challenges
            .into_iter()
            .filter(|c| !c.title.trim().is_empty() && !c.description.trim().is_empty())
            .collect();
        assert_eq!(kept.len(), 1);
    }
}
