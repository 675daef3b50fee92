//! Assessment Planner — pure, deterministic business rules mapping a
//! `ProfileClassification` to an `AssessmentPlan`. No I/O, no LLM calls.

use serde::{Deserialize, Serialize};

use crate::analysis::models::{ProfileClassification, RoleCategory};

/// Voice question counts by experience level: entry / mid / senior+executive.
const VOICE_COUNT_ENTRY: u32 = 8;
const VOICE_COUNT_MID: u32 = 10;
const VOICE_COUNT_SENIOR: u32 = 12;

const MCQ_COUNT: u32 = 20;
const CODE_COUNT_ENTRY: u32 = 2;
const CODE_COUNT_DEFAULT: u32 = 3;

/// Minutes per item when estimating duration.
const VOICE_MINUTES: u32 = 2;
const MCQ_MINUTES: u32 = 1;
const CODE_MINUTES: u32 = 20;

/// Categories that get an MCQ round (8 of the 11).
const MCQ_CATEGORIES: [RoleCategory; 8] = [
    RoleCategory::SoftwareDev,
    RoleCategory::QaAutomationSdet,
    RoleCategory::DataMl,
    RoleCategory::DevopsSre,
    RoleCategory::ProductManagement,
    RoleCategory::SalesMarketing,
    RoleCategory::FinanceAccounting,
    RoleCategory::HrRecruiting,
];

/// One of the three assessable skill channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentComponent {
    Voice,
    Mcq,
    Code,
}

/// Difficulty bucket derived from years of experience.
///
/// This is THE experience-level threshold function: every downstream consumer
/// (generators, prompts, rationale) must go through `from_years` rather than
/// re-deriving the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    /// `<2y → entry, <5y → mid, <10y → senior, else → executive`.
    pub fn from_years(years: f64) -> Self {
        if years < 2.0 {
            ExperienceLevel::Entry
        } else if years < 5.0 {
            ExperienceLevel::Mid
        } else if years < 10.0 {
            ExperienceLevel::Senior
        } else {
            ExperienceLevel::Executive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

/// Question counts per component; zero means the component is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    pub voice: u32,
    pub mcq: u32,
    pub code: u32,
}

/// The planner's output: which components run, how many questions each,
/// the difficulty bucket, a duration estimate, and an auditable rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentPlan {
    pub components: Vec<AssessmentComponent>,
    pub question_counts: QuestionCounts,
    pub difficulty: ExperienceLevel,
    pub estimated_duration_minutes: u32,
    /// Explains every inclusion/exclusion decision. Surfaced to auditors and
    /// candidates — required output, not cosmetic.
    pub rationale: String,
}

impl AssessmentPlan {
    pub fn includes(&self, component: AssessmentComponent) -> bool {
        self.components.contains(&component)
    }
}

/// Maps a classification to an assessment plan via deterministic rules.
pub fn plan_assessment(classification: &ProfileClassification) -> AssessmentPlan {
    let level = ExperienceLevel::from_years(classification.years_experience);

    let mut components = vec![AssessmentComponent::Voice];
    let mut rationale_lines = vec![
        format!(
            "Role classified as {} with {:.1} years of experience ({} level).",
            classification.role_category.label(),
            classification.years_experience,
            level.as_str()
        ),
        "VOICE included: every assessment has a spoken interview.".to_string(),
    ];

    let mcq_included = MCQ_CATEGORIES.contains(&classification.role_category);
    if mcq_included {
        components.push(AssessmentComponent::Mcq);
        rationale_lines.push(format!(
            "MCQ included: {} is a knowledge-testable category.",
            classification.role_category.label()
        ));
    } else {
        rationale_lines.push(format!(
            "MCQ excluded: {} is assessed through conversation and portfolio, not multiple choice.",
            classification.role_category.label()
        ));
    }

    let (code_included, code_reason) = code_decision(classification);
    if code_included {
        components.push(AssessmentComponent::Code);
    }
    rationale_lines.push(code_reason);

    let voice = match level {
        ExperienceLevel::Entry => VOICE_COUNT_ENTRY,
        ExperienceLevel::Mid => VOICE_COUNT_MID,
        ExperienceLevel::Senior | ExperienceLevel::Executive => VOICE_COUNT_SENIOR,
    };
    let mcq = if mcq_included { MCQ_COUNT } else { 0 };
    let code = if code_included {
        if level == ExperienceLevel::Entry {
            CODE_COUNT_ENTRY
        } else {
            CODE_COUNT_DEFAULT
        }
    } else {
        0
    };

    let counts = QuestionCounts { voice, mcq, code };
    let duration = estimate_duration(&counts);

    rationale_lines.push(format!(
        "Question counts: {voice} voice, {mcq} MCQ, {code} coding. Estimated duration {duration} minutes including buffer."
    ));

    AssessmentPlan {
        components,
        question_counts: counts,
        difficulty: level,
        estimated_duration_minutes: duration,
        rationale: rationale_lines.join(" "),
    }
}

/// CODE inclusion rule with the devops_sre language carve-out.
/// Returns the decision and a rationale sentence naming the deciding factor.
fn code_decision(classification: &ProfileClassification) -> (bool, String) {
    let category_eligible = matches!(
        classification.role_category,
        RoleCategory::SoftwareDev
            | RoleCategory::QaAutomationSdet
            | RoleCategory::DataMl
            | RoleCategory::DevopsSre
    );

    if !category_eligible {
        return (
            false,
            format!(
                "CODE excluded: {} roles are not assessed with coding challenges.",
                classification.role_category.label()
            ),
        );
    }
    if !classification.coding_expected {
        return (
            false,
            "CODE excluded: the profile does not indicate coding is expected for this role."
                .to_string(),
        );
    }
    if !classification.recent_coding {
        return (
            false,
            "CODE excluded: no evidence of hands-on coding within the last two years.".to_string(),
        );
    }
    if classification.years_experience < 0.5 {
        return (
            false,
            "CODE excluded: less than six months of professional experience.".to_string(),
        );
    }
    if classification.role_category == RoleCategory::DevopsSre
        && classification.primary_languages.is_empty()
    {
        return (
            false,
            "CODE excluded: DevOps/SRE profiles need at least one primary language on record."
                .to_string(),
        );
    }

    (
        true,
        format!(
            "CODE included: {} role with recent hands-on coding evidence.",
            classification.role_category.label()
        ),
    )
}

/// `ceil((voice*2 + mcq*1 + code*20) * 1.1)` in integer arithmetic.
pub fn estimate_duration(counts: &QuestionCounts) -> u32 {
    let raw = counts.voice * VOICE_MINUTES + counts.mcq * MCQ_MINUTES + counts.code * CODE_MINUTES;
    (raw * 11).div_ceil(10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::EvidenceStrength;

    fn coder(category: RoleCategory, years: f64) -> ProfileClassification {
        ProfileClassification {
            role_category: category,
            years_experience: years,
            coding_expected: true,
            recent_coding: true,
            evidence_strength: EvidenceStrength::High,
            primary_languages: vec!["Rust".to_string()],
            frameworks: vec![],
            key_skills: vec![],
            confidence: 0.9,
        }
    }

    // ── experience level thresholds ─────────────────────────────────────────

    #[test]
    fn test_experience_level_boundaries() {
        assert_eq!(ExperienceLevel::from_years(1.99), ExperienceLevel::Entry);
        assert_eq!(ExperienceLevel::from_years(2.0), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::from_years(4.99), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::from_years(5.0), ExperienceLevel::Senior);
        assert_eq!(ExperienceLevel::from_years(9.99), ExperienceLevel::Senior);
        assert_eq!(ExperienceLevel::from_years(10.0), ExperienceLevel::Executive);
    }

    #[test]
    fn test_experience_level_is_monotonic() {
        let samples = [0.0, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 25.0];
        let levels: Vec<_> = samples.iter().map(|&y| ExperienceLevel::from_years(y)).collect();
        for pair in levels.windows(2) {
            assert!(pair[0] <= pair[1], "level decreased: {pair:?}");
        }
    }

    #[test]
    fn test_experience_level_stable_under_repeated_calls() {
        for _ in 0..3 {
            assert_eq!(ExperienceLevel::from_years(6.0), ExperienceLevel::Senior);
        }
    }

    // ── CODE inclusion: the six boundary flips ──────────────────────────────

    #[test]
    fn test_code_included_when_all_conditions_hold() {
        for category in [
            RoleCategory::SoftwareDev,
            RoleCategory::QaAutomationSdet,
            RoleCategory::DataMl,
        ] {
            let plan = plan_assessment(&coder(category, 3.0));
            assert!(plan.includes(AssessmentComponent::Code), "{category:?}");
        }
    }

    #[test]
    fn test_code_excluded_for_non_coding_category() {
        let plan = plan_assessment(&coder(RoleCategory::ProductManagement, 3.0));
        assert!(!plan.includes(AssessmentComponent::Code));
    }

    #[test]
    fn test_code_excluded_when_coding_not_expected() {
        let mut c = coder(RoleCategory::SoftwareDev, 3.0);
        c.coding_expected = false;
        assert!(!plan_assessment(&c).includes(AssessmentComponent::Code));
    }

    #[test]
    fn test_code_excluded_without_recent_coding() {
        let mut c = coder(RoleCategory::SoftwareDev, 3.0);
        c.recent_coding = false;
        assert!(!plan_assessment(&c).includes(AssessmentComponent::Code));
    }

    #[test]
    fn test_code_excluded_under_half_year() {
        let mut c = coder(RoleCategory::SoftwareDev, 0.4);
        c.years_experience = 0.4;
        assert!(!plan_assessment(&c).includes(AssessmentComponent::Code));

        c.years_experience = 0.5;
        assert!(plan_assessment(&c).includes(AssessmentComponent::Code));
    }

    #[test]
    fn test_devops_sre_requires_primary_language() {
        let mut c = coder(RoleCategory::DevopsSre, 4.0);
        assert!(plan_assessment(&c).includes(AssessmentComponent::Code));

        c.primary_languages.clear();
        assert!(!plan_assessment(&c).includes(AssessmentComponent::Code));
    }

    #[test]
    fn test_other_code_categories_do_not_require_languages() {
        let mut c = coder(RoleCategory::SoftwareDev, 4.0);
        c.primary_languages.clear();
        assert!(plan_assessment(&c).includes(AssessmentComponent::Code));
    }

    // ── component selection and counts ──────────────────────────────────────

    #[test]
    fn test_voice_always_included() {
        for category in RoleCategory::ALL {
            let mut c = coder(category, 1.0);
            c.coding_expected = false;
            let plan = plan_assessment(&c);
            assert!(plan.includes(AssessmentComponent::Voice), "{category:?}");
            assert!(plan.question_counts.voice > 0);
        }
    }

    #[test]
    fn test_mcq_allow_list_is_eight_categories() {
        let included: Vec<_> = RoleCategory::ALL
            .iter()
            .filter(|&&cat| plan_assessment(&coder(cat, 3.0)).includes(AssessmentComponent::Mcq))
            .collect();
        assert_eq!(included.len(), 8);
    }

    #[test]
    fn test_mcq_excluded_categories() {
        for category in [
            RoleCategory::DesignUx,
            RoleCategory::CustomerSupport,
            RoleCategory::OperationsAdmin,
        ] {
            let plan = plan_assessment(&coder(category, 3.0));
            assert!(!plan.includes(AssessmentComponent::Mcq), "{category:?}");
            assert_eq!(plan.question_counts.mcq, 0);
        }
    }

    #[test]
    fn test_voice_counts_by_level() {
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 1.0)).question_counts.voice, 8);
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 3.0)).question_counts.voice, 10);
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 7.0)).question_counts.voice, 12);
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 15.0)).question_counts.voice, 12);
    }

    #[test]
    fn test_code_counts_entry_vs_senior() {
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 1.0)).question_counts.code, 2);
        assert_eq!(plan_assessment(&coder(RoleCategory::SoftwareDev, 6.0)).question_counts.code, 3);
    }

    // ── duration ────────────────────────────────────────────────────────────

    #[test]
    fn test_duration_formula_with_buffer() {
        // voice=10, mcq=20, code=3 → 10*2 + 20*1 + 3*20 = 100 → ceil(110.0) = 110
        let counts = QuestionCounts { voice: 10, mcq: 20, code: 3 };
        assert_eq!(estimate_duration(&counts), 110);
    }

    #[test]
    fn test_duration_rounds_up() {
        // voice=8 → 16 raw → 17.6 → 18
        let counts = QuestionCounts { voice: 8, mcq: 0, code: 0 };
        assert_eq!(estimate_duration(&counts), 18);
    }

    // ── end-to-end plan shape ───────────────────────────────────────────────

    #[test]
    fn test_senior_software_dev_full_plan() {
        let plan = plan_assessment(&coder(RoleCategory::SoftwareDev, 6.0));
        assert_eq!(plan.difficulty, ExperienceLevel::Senior);
        assert!(plan.includes(AssessmentComponent::Voice));
        assert!(plan.includes(AssessmentComponent::Mcq));
        assert!(plan.includes(AssessmentComponent::Code));
        assert_eq!(plan.question_counts, QuestionCounts { voice: 12, mcq: 20, code: 3 });
    }

    #[test]
    fn test_rationale_mentions_every_component() {
        let plan = plan_assessment(&coder(RoleCategory::SoftwareDev, 6.0));
        assert!(plan.rationale.contains("VOICE"));
        assert!(plan.rationale.contains("MCQ"));
        assert!(plan.rationale.contains("CODE"));
    }

    #[test]
    fn test_rationale_explains_exclusions() {
        let mut c = coder(RoleCategory::DevopsSre, 4.0);
        c.primary_languages.clear();
        let plan = plan_assessment(&c);
        assert!(plan.rationale.contains("CODE excluded"));
        assert!(plan.rationale.to_lowercase().contains("language"));
    }

    #[test]
    fn test_planner_is_deterministic() {
        let c = coder(RoleCategory::DataMl, 8.0);
        let a = plan_assessment(&c);
        let b = plan_assessment(&c);
        assert_eq!(a.question_counts, b.question_counts);
        assert_eq!(a.rationale, b.rationale);
        assert_eq!(a.estimated_duration_minutes, b.estimated_duration_minutes);
    }
}
