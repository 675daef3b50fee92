//! Persistence models for assessment plans.
//!
//! One row per assessment attempt; the whole pipeline state lives in the
//! `interview_plan` JSONB column as a versioned [`InterviewPlanDoc`]. Updates
//! always read-modify-write the entire document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::models::{ProfileClassification, ResumeAnalysis};
use crate::evaluation::models::FinalEvaluation;
use crate::generation::models::{CodingChallenge, McqQuestion, VoiceQuestion};
use crate::planner::AssessmentPlan;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_COMPLETED: &str = "completed";

/// One assessment attempt as stored in `assessment_plans`.
#[derive(Debug, Clone, FromRow)]
pub struct AssessmentPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    /// The serialized [`InterviewPlanDoc`].
    pub interview_plan: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentPlanRow {
    pub fn doc(&self) -> Result<InterviewPlanDoc, serde_json::Error> {
        serde_json::from_value(self.interview_plan.clone())
    }
}

/// Where the uploaded resume landed in object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeArtifact {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAnswer {
    pub question_id: Uuid,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqAnswer {
    pub question_id: Uuid,
    pub selected_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeAnswer {
    pub challenge_id: Uuid,
    pub language: String,
    pub code: String,
}

fn doc_version() -> u32 {
    1
}

/// The full pipeline state for one assessment attempt. Every stage fills in
/// its own section; absent sections mean the stage has not run yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewPlanDoc {
    #[serde(default = "doc_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_artifact: Option<ResumeArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResumeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ProfileClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<AssessmentPlan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_questions: Option<Vec<VoiceQuestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcq_questions: Option<Vec<McqQuestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding_challenges: Option<Vec<CodingChallenge>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_answers: Option<Vec<VoiceAnswer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcq_answers: Option<Vec<McqAnswer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_answers: Option<Vec<CodeAnswer>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<FinalEvaluation>,
}

impl InterviewPlanDoc {
    pub fn new() -> Self {
        Self {
            version: doc_version(),
            ..Default::default()
        }
    }

    /// True once any candidate responses exist to evaluate.
    pub fn has_answers(&self) -> bool {
        self.voice_answers.as_ref().is_some_and(|a| !a.is_empty())
            || self.mcq_answers.as_ref().is_some_and(|a| !a.is_empty())
            || self.code_answers.as_ref().is_some_and(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_doc_round_trip() {
        let doc = InterviewPlanDoc::new();
        let value = serde_json::to_value(&doc).unwrap();
        let back: InterviewPlanDoc = serde_json::from_value(value).unwrap();
        assert_eq!(back.version, 1);
        assert!(back.analysis.is_none());
        assert!(!back.has_answers());
    }

    #[test]
    fn test_missing_version_defaults_to_one() {
        let doc: InterviewPlanDoc = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_has_answers_detects_each_channel() {
        let mut doc = InterviewPlanDoc::new();
        assert!(!doc.has_answers());

        doc.mcq_answers = Some(vec![]);
        assert!(!doc.has_answers());

        doc.mcq_answers = Some(vec![McqAnswer {
            question_id: Uuid::new_v4(),
            selected_index: 2,
        }]);
        assert!(doc.has_answers());
    }

    #[test]
    fn test_absent_sections_not_serialized() {
        let doc = InterviewPlanDoc::new();
        let value = serde_json::to_value(&doc).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("version"));
        assert!(!obj.contains_key("evaluation"));
        assert!(!obj.contains_key("voice_questions"));
    }
}
