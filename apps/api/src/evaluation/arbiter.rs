//! Multi-LLM arbitration — fan out the transcript to every configured
//! provider, then reconcile their verdicts through a pluggable strategy.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::models::{
    ArbitratedResult, ArbitrationMethod, CategoryScores, ConfidenceLevel, InterviewTranscript,
    LlmEvaluationResult, ProviderEvaluationRaw, Recommendation,
};
use crate::evaluation::prompts::{
    ARBITER_PROMPT_TEMPLATE, ARBITER_SYSTEM, EVAL_PROMPT_TEMPLATE, EVAL_SYSTEM,
};
use crate::llm_client::parse::safe_json_parse;
use crate::llm_client::{CallOpts, ChatMessage, LlmClient};

const MAX_MERGED_ITEMS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Strategy trait
// ────────────────────────────────────────────────────────────────────────────

/// Reconciles two or more provider evaluations into one verdict. Only invoked
/// when there is genuine disagreement to resolve; single-provider runs pass
/// through as consensus without touching the strategy.
#[async_trait]
pub trait ArbitrationStrategy: Send + Sync {
    async fn arbitrate(
        &self,
        results: &[LlmEvaluationResult],
        transcript: &InterviewTranscript,
    ) -> ArbitratedResult;

    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Weighted average strategy
// ────────────────────────────────────────────────────────────────────────────

/// Confidence-weighted numeric blend: `round(Σ(score·conf) / Σ(conf))`.
/// No extra LLM call, fully deterministic given the provider results.
pub struct WeightedAverageArbiter;

impl WeightedAverageArbiter {
    fn weighted(values: impl Iterator<Item = (f64, f64)>) -> f64 {
        let (mut num, mut denom, mut sum, mut n) = (0.0, 0.0, 0.0, 0u32);
        for (value, weight) in values {
            num += value * weight;
            denom += weight;
            sum += value;
            n += 1;
        }
        if denom > 0.0 {
            num / denom
        } else if n > 0 {
            // All-zero confidence degenerates to a plain mean.
            sum / n as f64
        } else {
            0.0
        }
    }
}

#[async_trait]
impl ArbitrationStrategy for WeightedAverageArbiter {
    async fn arbitrate(
        &self,
        results: &[LlmEvaluationResult],
        _transcript: &InterviewTranscript,
    ) -> ArbitratedResult {
        let final_score = Self::weighted(
            results.iter().map(|r| (r.overall_score, r.confidence)),
        )
        .round();

        let category_scores = CategoryScores {
            technical: Self::weighted(
                results.iter().map(|r| (r.category_scores.technical, r.confidence)),
            )
            .round(),
            problem_solving: Self::weighted(
                results.iter().map(|r| (r.category_scores.problem_solving, r.confidence)),
            )
            .round(),
            communication: Self::weighted(
                results.iter().map(|r| (r.category_scores.communication, r.confidence)),
            )
            .round(),
            experience_relevance: Self::weighted(
                results
                    .iter()
                    .map(|r| (r.category_scores.experience_relevance, r.confidence)),
            )
            .round(),
        };

        // Recommendation follows the most self-confident provider.
        let recommendation = results
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|r| r.recommendation)
            .unwrap_or(Recommendation::Maybe);

        let avg_confidence =
            results.iter().map(|r| r.confidence).sum::<f64>() / results.len().max(1) as f64;

        ArbitratedResult {
            final_score,
            category_scores,
            strengths: merge_dedup(results.iter().map(|r| r.strengths.as_slice())),
            improvements: merge_dedup(results.iter().map(|r| r.improvements.as_slice())),
            recommendation,
            confidence: confidence_level_from(avg_confidence),
            agreement: describe_agreement(results),
            arbitration_method: ArbitrationMethod::WeightedAverage,
            arbiter_skipped: true,
            arbitration_note: None,
            provider_results: results.to_vec(),
        }
    }

    fn name(&self) -> &'static str {
        "weighted_average"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM selection strategy
// ────────────────────────────────────────────────────────────────────────────

/// A third LLM call reads the competing evaluations plus the transcript and
/// picks the most evidence-grounded one, synthesizing the final verdict.
pub struct LlmSelectionArbiter {
    arbiter: LlmClient,
}

impl LlmSelectionArbiter {
    pub fn new(arbiter: LlmClient) -> Self {
        Self { arbiter }
    }
}

#[derive(Debug, Deserialize)]
struct ArbiterRaw {
    selected_index: usize,
    #[serde(default)]
    final_score: Option<f64>,
    #[serde(default)]
    category_scores: Option<CategoryScores>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    recommendation: String,
    #[serde(default)]
    confidence_level: String,
    #[serde(default)]
    agreement: String,
}

#[async_trait]
impl ArbitrationStrategy for LlmSelectionArbiter {
    async fn arbitrate(
        &self,
        results: &[LlmEvaluationResult],
        transcript: &InterviewTranscript,
    ) -> ArbitratedResult {
        let evaluations = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "EVALUATION {} (provider: {}):\n{}",
                    i,
                    r.provider,
                    serde_json::to_string_pretty(r).unwrap_or_else(|_| r.raw_text.clone())
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = ARBITER_PROMPT_TEMPLATE
            .replace("{evaluations}", &evaluations)
            .replace("{transcript}", &transcript.render_for_prompt());

        let messages = [ChatMessage::system(ARBITER_SYSTEM), ChatMessage::user(prompt)];

        match self
            .arbiter
            .call_json::<ArbiterRaw>(&messages, CallOpts::deterministic())
            .await
        {
            Ok(raw) if raw.selected_index < results.len() => {
                let selected = &results[raw.selected_index];
                info!(
                    "Arbiter selected evaluation {} (provider {})",
                    raw.selected_index, selected.provider
                );
                ArbitratedResult {
                    final_score: raw
                        .final_score
                        .unwrap_or(selected.overall_score)
                        .clamp(0.0, 100.0),
                    category_scores: raw
                        .category_scores
                        .unwrap_or(selected.category_scores)
                        .normalized(),
                    strengths: if raw.strengths.is_empty() {
                        selected.strengths.clone()
                    } else {
                        raw.strengths
                    },
                    improvements: if raw.improvements.is_empty() {
                        selected.improvements.clone()
                    } else {
                        raw.improvements
                    },
                    recommendation: if raw.recommendation.is_empty() {
                        selected.recommendation
                    } else {
                        Recommendation::from_raw(&raw.recommendation)
                    },
                    confidence: parse_confidence_level(&raw.confidence_level),
                    agreement: raw.agreement,
                    arbitration_method: ArbitrationMethod::ArbiterSelection,
                    arbiter_skipped: false,
                    arbitration_note: None,
                    provider_results: results.to_vec(),
                }
            }
            Ok(raw) => {
                warn!(
                    "Arbiter returned out-of-range selected_index {}; falling back to first result",
                    raw.selected_index
                );
                fallback_to_first(results, "arbiter returned an invalid selection")
            }
            Err(e) => {
                warn!("Arbiter call failed ({e}); falling back to first result");
                fallback_to_first(results, "arbiter call failed")
            }
        }
    }

    fn name(&self) -> &'static str {
        "arbiter_selection"
    }
}

/// Degraded path when the arbiter itself misbehaves: keep the first provider
/// result but flag the loss of cross-checking with low confidence.
fn fallback_to_first(results: &[LlmEvaluationResult], reason: &str) -> ArbitratedResult {
    let first = &results[0];
    ArbitratedResult {
        final_score: first.overall_score,
        category_scores: first.category_scores,
        strengths: first.strengths.clone(),
        improvements: first.improvements.clone(),
        recommendation: first.recommendation,
        confidence: ConfidenceLevel::Low,
        agreement: describe_agreement(results),
        arbitration_method: ArbitrationMethod::ArbiterSelection,
        arbiter_skipped: true,
        arbitration_note: Some(format!(
            "{reason}; kept {} result unreconciled",
            first.provider
        )),
        provider_results: results.to_vec(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fan-out runner
// ────────────────────────────────────────────────────────────────────────────

/// Evaluates the transcript with every provider concurrently, then reconciles.
///
/// Provider failures are tolerated individually; only zero usable results is
/// fatal. One result skips arbitration entirely and passes through untouched.
pub async fn run_arbitration(
    providers: &[LlmClient],
    strategy: &dyn ArbitrationStrategy,
    transcript: &InterviewTranscript,
    role: &str,
    level: &str,
) -> Result<ArbitratedResult, AppError> {
    let calls = providers
        .iter()
        .map(|p| evaluate_with_provider(p, transcript, role, level));
    let mut results: Vec<LlmEvaluationResult> = join_all(calls)
        .await
        .into_iter()
        .flatten()
        .collect();

    if results.is_empty() {
        return Err(AppError::Llm(
            "every evaluation provider failed; no results to arbitrate".to_string(),
        ));
    }

    if results.len() == 1 {
        let only = results.remove(0);
        info!(
            "Single provider ({}) evaluation; passing through as consensus",
            only.provider
        );
        return Ok(consensus_pass_through(only));
    }

    info!(
        "Arbitrating {} provider evaluations via {}",
        results.len(),
        strategy.name()
    );
    Ok(strategy.arbitrate(&results, transcript).await)
}

/// A lone provider result becomes the verdict untouched: the score passes
/// through exactly, no strategy runs, and the method records consensus.
fn consensus_pass_through(only: LlmEvaluationResult) -> ArbitratedResult {
    ArbitratedResult {
        final_score: only.overall_score,
        category_scores: only.category_scores,
        strengths: only.strengths.clone(),
        improvements: only.improvements.clone(),
        recommendation: only.recommendation,
        confidence: confidence_level_from(only.confidence),
        agreement: format!("Single evaluation from {}; no arbitration needed", only.provider),
        arbitration_method: ArbitrationMethod::Consensus,
        arbiter_skipped: true,
        arbitration_note: None,
        provider_results: vec![only],
    }
}

/// One provider's full-transcript evaluation. `None` on any failure; the
/// caller decides whether the remaining results suffice.
async fn evaluate_with_provider(
    llm: &LlmClient,
    transcript: &InterviewTranscript,
    role: &str,
    level: &str,
) -> Option<LlmEvaluationResult> {
    let prompt = EVAL_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{level}", level)
        .replace("{transcript}", &transcript.render_for_prompt());

    let messages = [ChatMessage::system(EVAL_SYSTEM), ChatMessage::user(prompt)];

    let raw_text = match llm.call(&messages, CallOpts::deterministic()).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Provider {} evaluation failed: {e}", llm.provider_name());
            return None;
        }
    };

    let raw: ProviderEvaluationRaw = match safe_json_parse(&raw_text) {
        Some(parsed) => parsed,
        None => {
            warn!(
                "Provider {} returned unparseable evaluation",
                llm.provider_name()
            );
            return None;
        }
    };

    Some(LlmEvaluationResult {
        provider: llm.provider_name().to_string(),
        overall_score: raw.overall_score.clamp(0.0, 100.0),
        category_scores: raw.category_scores.normalized(),
        strengths: raw.strengths,
        improvements: raw.improvements,
        recommendation: Recommendation::from_raw(&raw.recommendation),
        confidence: raw.confidence.clamp(0.0, 1.0),
        raw_text,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

fn confidence_level_from(confidence: f64) -> ConfidenceLevel {
    if confidence >= 0.8 {
        ConfidenceLevel::High
    } else if confidence >= 0.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn parse_confidence_level(raw: &str) -> ConfidenceLevel {
    match raw.to_lowercase().as_str() {
        "high" => ConfidenceLevel::High,
        "low" => ConfidenceLevel::Low,
        _ => ConfidenceLevel::Medium,
    }
}

/// Case-insensitive dedup across providers, original order kept, capped.
fn merge_dedup<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for item in list {
            let key = item.trim().to_lowercase();
            if key.is_empty() || !seen.insert(key) {
                continue;
            }
            out.push(item.trim().to_string());
            if out.len() == MAX_MERGED_ITEMS {
                return out;
            }
        }
    }
    out
}

fn describe_agreement(results: &[LlmEvaluationResult]) -> String {
    let scores: Vec<f64> = results.iter().map(|r| r.overall_score).collect();
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread <= 5.0 {
        format!("Providers closely agree (scores {min:.0}-{max:.0})")
    } else if spread <= 15.0 {
        format!("Providers broadly agree (scores {min:.0}-{max:.0})")
    } else {
        format!("Providers diverge significantly (scores {min:.0}-{max:.0})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(provider: &str, score: f64, confidence: f64) -> LlmEvaluationResult {
        LlmEvaluationResult {
            provider: provider.to_string(),
            overall_score: score,
            category_scores: CategoryScores {
                technical: score,
                problem_solving: score,
                communication: score,
                experience_relevance: score,
            },
            strengths: vec![format!("{provider} strength")],
            improvements: vec![format!("{provider} improvement")],
            recommendation: Recommendation::Hire,
            confidence,
            raw_text: String::new(),
        }
    }

    #[tokio::test]
    async fn test_weighted_average_confidence_weighting() {
        let results = vec![result("anthropic", 80.0, 0.8), result("openai", 70.0, 0.6)];
        let arbitrated = WeightedAverageArbiter
            .arbitrate(&results, &InterviewTranscript::default())
            .await;
        // (80*0.8 + 70*0.6) / 1.4 = 106/1.4 = 75.71 -> 76
        assert_eq!(arbitrated.final_score, 76.0);
        assert_eq!(arbitrated.arbitration_method, ArbitrationMethod::WeightedAverage);
        assert!(arbitrated.arbiter_skipped);
        assert_eq!(arbitrated.provider_results.len(), 2);
    }

    #[tokio::test]
    async fn test_weighted_average_zero_confidence_uses_mean() {
        let results = vec![result("anthropic", 80.0, 0.0), result("openai", 60.0, 0.0)];
        let arbitrated = WeightedAverageArbiter
            .arbitrate(&results, &InterviewTranscript::default())
            .await;
        assert_eq!(arbitrated.final_score, 70.0);
    }

    #[tokio::test]
    async fn test_weighted_average_recommendation_tracks_highest_confidence() {
        let mut low = result("anthropic", 40.0, 0.3);
        low.recommendation = Recommendation::NoHire;
        let mut high = result("openai", 90.0, 0.9);
        high.recommendation = Recommendation::StrongHire;
        let arbitrated = WeightedAverageArbiter
            .arbitrate(&[low, high], &InterviewTranscript::default())
            .await;
        assert_eq!(arbitrated.recommendation, Recommendation::StrongHire);
    }

    #[test]
    fn test_merge_dedup_caps_and_dedupes() {
        let a = vec!["Strong fundamentals".to_string(), "Clear writing".to_string()];
        let b = vec![
            "strong fundamentals".to_string(),
            "Deep debugging".to_string(),
            "Test discipline".to_string(),
            "Ownership".to_string(),
            "Extra item".to_string(),
        ];
        let merged = merge_dedup([a.as_slice(), b.as_slice()].into_iter());
        assert_eq!(merged.len(), MAX_MERGED_ITEMS);
        assert_eq!(merged[0], "Strong fundamentals");
        assert!(!merged.iter().any(|s| s == "strong fundamentals"));
    }

    #[test]
    fn test_single_result_passes_through_as_consensus() {
        let only = result("anthropic", 81.0, 0.9);
        let arbitrated = consensus_pass_through(only.clone());
        assert_eq!(arbitrated.final_score, only.overall_score);
        assert_eq!(arbitrated.arbitration_method, ArbitrationMethod::Consensus);
        assert!(arbitrated.arbiter_skipped);
        assert_eq!(arbitrated.recommendation, only.recommendation);
        assert_eq!(arbitrated.confidence, ConfidenceLevel::High);
        assert_eq!(arbitrated.provider_results.len(), 1);
    }

    #[test]
    fn test_fallback_keeps_first_result_with_low_confidence() {
        let results = vec![result("anthropic", 72.0, 0.9), result("openai", 60.0, 0.8)];
        let fallback = fallback_to_first(&results, "arbiter call failed");
        assert_eq!(fallback.final_score, 72.0);
        assert_eq!(fallback.confidence, ConfidenceLevel::Low);
        assert!(fallback.arbiter_skipped);
        assert!(fallback.arbitration_note.as_deref().unwrap().contains("anthropic"));
    }

    #[test]
    fn test_confidence_level_thresholds() {
        assert_eq!(confidence_level_from(0.9), ConfidenceLevel::High);
        assert_eq!(confidence_level_from(0.8), ConfidenceLevel::High);
        assert_eq!(confidence_level_from(0.6), ConfidenceLevel::Medium);
        assert_eq!(confidence_level_from(0.2), ConfidenceLevel::Low);
    }

    #[test]
    fn test_agreement_description_by_spread() {
        let close = vec![result("a", 80.0, 0.8), result("b", 82.0, 0.8)];
        assert!(describe_agreement(&close).contains("closely"));
        let far = vec![result("a", 40.0, 0.8), result("b", 90.0, 0.8)];
        assert!(describe_agreement(&far).contains("diverge"));
    }
}
