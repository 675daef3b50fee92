//! Deep resume analysis — content-hash cached wrapper around one LLM call.

use tracing::{info, warn};

use crate::analysis::cache::AnalysisCache;
use crate::analysis::models::ResumeAnalysis;
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, UNTRUSTED_CONTENT_INSTRUCTION};
use crate::llm_client::sanitize::sanitize_for_prompt;
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};

/// Analyzes resume text into a structured `ResumeAnalysis`.
///
/// Flow: content hash → cache get → on miss sanitize, one low-temperature
/// LLM call, validate required fields (typed deserialization), best-effort
/// write-through.
///
/// A response missing `candidate_profile` or `extracted_entities` fails
/// typed deserialization and is surfaced as a hard `AppError::Llm` — there
/// is no safe default for either.
pub async fn analyze_resume_deep(
    llm: &LlmClient,
    cache: &AnalysisCache,
    resume_text: &str,
) -> Result<ResumeAnalysis, AppError> {
    let hash = AnalysisCache::content_hash(resume_text);

    if let Some(hit) = cache.get(&hash) {
        info!("Resume analysis cache HIT for {hash}");
        return Ok(hit);
    }
    info!("Resume analysis cache MISS for {hash}");

    let sanitized = sanitize_for_prompt(resume_text);
    if sanitized.len() < resume_text.len() {
        warn!("Resume text was sanitized before analysis ({hash})");
    }

    let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", &sanitized);
    let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM} {UNTRUSTED_CONTENT_INSTRUCTION}");
    let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];

    let analysis: ResumeAnalysis = llm
        .call_json(&messages, CallOpts::deterministic())
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    // Write-through is best-effort; a cache failure never fails the analysis.
    cache.put(&hash, &analysis);

    Ok(analysis)
}
