//! Profile classification — maps a `ResumeAnalysis` to one of the 11 role
//! categories plus the planning signals (years, coding expectations).

use anyhow::anyhow;
use tracing::info;

use crate::analysis::models::{ProfileClassification, ResumeAnalysis, RoleCategory};
use crate::analysis::prompts::{CLASSIFY_PROMPT_TEMPLATE, CLASSIFY_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};

/// Classifies an analyzed profile with a single low-temperature LLM call.
///
/// A response with a missing or unrecognized `role_category` is a hard
/// failure: planning rules are category-keyed and there is no default
/// category an unclassified profile could safely fall into.
pub async fn classify_profile(
    llm: &LlmClient,
    analysis: &ResumeAnalysis,
) -> Result<ProfileClassification, AppError> {
    let analysis_json = serde_json::to_string_pretty(analysis)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize analysis: {e}")))?;

    let prompt = CLASSIFY_PROMPT_TEMPLATE
        .replace("{categories}", &render_categories())
        .replace("{analysis_json}", &analysis_json);
    let system = format!("{CLASSIFY_SYSTEM} {JSON_ONLY_SYSTEM}");
    let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];

    let classification: ProfileClassification = llm
        .call_json(&messages, CallOpts::deterministic())
        .await
        .map_err(|e| AppError::Llm(format!("Profile classification failed: {e}")))?;

    info!(
        "Classified profile: category={} years={:.1} coding_expected={} recent_coding={}",
        classification.role_category.as_str(),
        classification.years_experience,
        classification.coding_expected,
        classification.recent_coding
    );

    Ok(classification)
}

/// Renders the category bullet list from `RoleCategory::ALL`, one line per
/// category in `- "key": description` form.
fn render_categories() -> String {
    RoleCategory::ALL
        .iter()
        .map(|c| format!("- \"{}\": {}", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_categories_cover_every_variant() {
        let block = render_categories();
        assert_eq!(block.lines().count(), RoleCategory::ALL.len());
        for category in RoleCategory::ALL {
            let line = format!("- \"{}\": {}", category.as_str(), category.description());
            assert!(block.contains(&line), "missing category line: {line}");
        }
    }

    #[test]
    fn test_prompt_template_has_category_placeholder() {
        let prompt = CLASSIFY_PROMPT_TEMPLATE.replace("{categories}", &render_categories());
        assert!(prompt.contains("\"operations_admin\""));
        assert!(!prompt.contains("{categories}"));
    }
}
