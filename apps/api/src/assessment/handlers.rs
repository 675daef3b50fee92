use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::analyzer::analyze_resume_deep;
use crate::analysis::classifier::classify_profile;
use crate::analysis::models::ProfileClassification;
use crate::assessment::plan_store;
use crate::errors::AppError;
use crate::evaluation::evaluator::evaluate_interview;
use crate::evaluation::models::FinalEvaluation;
use crate::generation::code::generate_coding_challenges;
use crate::generation::mcq::generate_mcq_questions;
use crate::generation::models::{CodingChallengeClient, McqQuestionClient, VoiceQuestion};
use crate::generation::voice::generate_voice_questions;
use crate::models::plan::{
    AssessmentPlanRow, CodeAnswer, InterviewPlanDoc, McqAnswer, ResumeArtifact, STATUS_COMPLETED,
};
use crate::planner::{plan_assessment, AssessmentComponent, AssessmentPlan};
use crate::state::AppState;
use crate::storage::{parse_resume_file, upload_file};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Client-safe view of one plan row. Question banks are deliberately absent;
/// they are fetched per component so answer keys never ride along.
#[derive(Serialize)]
pub struct PlanSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ProfileClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<AssessmentPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<FinalEvaluation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn summarize(row: &AssessmentPlanRow) -> Result<PlanSummary, AppError> {
    let doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;
    Ok(PlanSummary {
        id: row.id,
        user_id: row.user_id,
        status: row.status.clone(),
        classification: doc.classification,
        plan: doc.plan,
        evaluation: doc.evaluation,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Assessment lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
///
/// Multipart: `user_id` (text) + `resume` (file). Runs the full intake
/// pipeline synchronously: extract, store, analyze, classify, plan.
pub async fn handle_start_assessment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PlanSummary>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut resume: Option<(bytes::Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable user_id field: {e}")))?;
                user_id = Some(
                    text.parse()
                        .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?,
                );
            }
            Some("resume") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable resume field: {e}")))?;
                resume = Some((bytes, content_type));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::Validation("missing user_id field".to_string()))?;
    let (bytes, content_type) =
        resume.ok_or_else(|| AppError::Validation("missing resume file".to_string()))?;

    // Extraction failure is fatal: there is nothing to assess without text.
    let text = parse_resume_file(&bytes, &content_type)?;

    let stored = upload_file(&state.s3, &state.config.s3_bucket, bytes, "resumes", &content_type)
        .await?;

    let analysis = analyze_resume_deep(&state.llm, &state.cache, &text).await?;
    let classification = classify_profile(&state.llm, &analysis).await?;
    let plan = plan_assessment(&classification);

    info!(
        "Planned assessment for user {user_id}: {:?} at {:?}",
        classification.role_category, plan.difficulty
    );

    let doc = InterviewPlanDoc {
        resume_artifact: Some(ResumeArtifact {
            url: stored.url,
            key: stored.key,
        }),
        analysis: Some(analysis),
        classification: Some(classification),
        plan: Some(plan),
        ..InterviewPlanDoc::new()
    };

    let row = plan_store::create_plan(&state.db, user_id, &doc).await?;
    Ok(Json(summarize(&row)?))
}

/// GET /api/v1/assessments/:id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanSummary>, AppError> {
    let row = plan_store::find_plan(&state.db, id).await?;
    Ok(Json(summarize(&row)?))
}

/// GET /api/v1/assessments/current
pub async fn handle_current_assessment(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PlanSummary>, AppError> {
    let row = plan_store::find_current_draft(&state.db, params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No draft assessment for user {}", params.user_id))
        })?;
    Ok(Json(summarize(&row)?))
}

/// GET /api/v1/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<PlanSummary>>, AppError> {
    let rows = plan_store::list_plans(&state.db, params.user_id).await?;
    rows.iter().map(summarize).collect::<Result<Vec<_>, _>>().map(Json)
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation (idempotent per component)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(untagged)]
pub enum QuestionSet {
    Voice { questions: Vec<VoiceQuestion> },
    Mcq { questions: Vec<McqQuestionClient> },
    Code { challenges: Vec<CodingChallengeClient> },
}

fn parse_component(raw: &str) -> Result<AssessmentComponent, AppError> {
    match raw {
        "voice" => Ok(AssessmentComponent::Voice),
        "mcq" => Ok(AssessmentComponent::Mcq),
        "code" => Ok(AssessmentComponent::Code),
        other => Err(AppError::Validation(format!(
            "unknown component '{other}'; expected voice, mcq, or code"
        ))),
    }
}

/// POST /api/v1/assessments/:id/questions/:component
///
/// Generates the component's question set on first call and returns the
/// stored set on every later call, so retries never reshuffle questions.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Path((id, component)): Path<(Uuid, String)>,
) -> Result<Json<QuestionSet>, AppError> {
    let component = parse_component(&component)?;
    let row = plan_store::find_plan(&state.db, id).await?;
    let mut doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;

    let plan = doc
        .plan
        .clone()
        .ok_or_else(|| AppError::Validation("plan document has no assessment plan".to_string()))?;
    if !plan.includes(component) {
        return Err(AppError::Validation(format!(
            "component {component:?} is not part of this assessment"
        )));
    }
    let classification = doc.classification.clone().ok_or_else(|| {
        AppError::Validation("plan document has no classification".to_string())
    })?;

    let set = match component {
        AssessmentComponent::Voice => {
            if doc.voice_questions.is_none() {
                let questions = generate_voice_questions(
                    &state.llm,
                    &classification,
                    plan.question_counts.voice,
                    &classification.key_skills,
                )
                .await;
                doc.voice_questions = Some(questions);
                plan_store::update_plan_doc(&state.db, id, &doc, None).await?;
            }
            QuestionSet::Voice {
                questions: doc.voice_questions.clone().unwrap_or_default(),
            }
        }
        AssessmentComponent::Mcq => {
            if doc.mcq_questions.is_none() {
                let questions =
                    generate_mcq_questions(&state.llm, &classification, plan.question_counts.mcq)
                        .await;
                doc.mcq_questions = Some(questions);
                plan_store::update_plan_doc(&state.db, id, &doc, None).await?;
            }
            QuestionSet::Mcq {
                questions: doc
                    .mcq_questions
                    .iter()
                    .flatten()
                    .map(McqQuestionClient::from)
                    .collect(),
            }
        }
        AssessmentComponent::Code => {
            if doc.coding_challenges.is_none() {
                let challenges = generate_coding_challenges(
                    &state.llm,
                    &classification,
                    plan.question_counts.code,
                )
                .await;
                doc.coding_challenges = Some(challenges);
                plan_store::update_plan_doc(&state.db, id, &doc, None).await?;
            }
            QuestionSet::Code {
                challenges: doc
                    .coding_challenges
                    .iter()
                    .flatten()
                    .map(CodingChallengeClient::from)
                    .collect(),
            }
        }
    };

    Ok(Json(set))
}

// ────────────────────────────────────────────────────────────────────────────
// Answer submission
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct McqSubmission {
    pub answers: Vec<McqAnswer>,
}

#[derive(Deserialize)]
pub struct CodeSubmission {
    pub answers: Vec<CodeAnswer>,
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub plan_id: Uuid,
    pub recorded: usize,
}

/// POST /api/v1/assessments/:id/answers/mcq
pub async fn handle_submit_mcq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<McqSubmission>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let row = plan_store::find_plan(&state.db, id).await?;
    let mut doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;

    let questions = doc.mcq_questions.as_ref().ok_or_else(|| {
        AppError::Validation("no MCQ questions generated for this plan".to_string())
    })?;
    for answer in &req.answers {
        if !questions.iter().any(|q| q.id == answer.question_id) {
            return Err(AppError::Validation(format!(
                "answer references unknown question {}",
                answer.question_id
            )));
        }
    }

    let recorded = req.answers.len();
    doc.mcq_answers = Some(req.answers);
    plan_store::update_plan_doc(&state.db, id, &doc, None).await?;

    Ok(Json(SubmissionResponse { plan_id: id, recorded }))
}

/// POST /api/v1/assessments/:id/answers/code
pub async fn handle_submit_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CodeSubmission>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let row = plan_store::find_plan(&state.db, id).await?;
    let mut doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;

    let challenges = doc.coding_challenges.as_ref().ok_or_else(|| {
        AppError::Validation("no coding challenges generated for this plan".to_string())
    })?;
    for answer in &req.answers {
        if !challenges.iter().any(|c| c.id == answer.challenge_id) {
            return Err(AppError::Validation(format!(
                "answer references unknown challenge {}",
                answer.challenge_id
            )));
        }
    }

    let recorded = req.answers.len();
    doc.code_answers = Some(req.answers);
    plan_store::update_plan_doc(&state.db, id, &doc, None).await?;

    Ok(Json(SubmissionResponse { plan_id: id, recorded }))
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments/:id/evaluate
///
/// Evaluates whatever responses exist and marks the plan completed.
/// Re-running replaces the previous evaluation with a fresh timestamp.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FinalEvaluation>, AppError> {
    let row = plan_store::find_plan(&state.db, id).await?;
    let mut doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;

    if !doc.has_answers() {
        return Err(AppError::UnprocessableEntity(
            "no interview responses to evaluate".to_string(),
        ));
    }
    if doc.evaluation.is_some() {
        warn!("Re-evaluating plan {id}; previous evaluation will be replaced");
    }

    let evaluation = evaluate_interview(
        &state.llm,
        &state.evaluation_providers,
        state.arbitration.as_ref(),
        state.config.multi_llm_enabled,
        &doc,
    )
    .await?;

    doc.evaluation = Some(evaluation.clone());
    plan_store::update_plan_doc(&state.db, id, &doc, Some(STATUS_COMPLETED)).await?;

    info!(
        "Evaluated plan {id}: score {} ({})",
        evaluation.overall_score,
        evaluation.recommendation.as_str()
    );
    Ok(Json(evaluation))
}
