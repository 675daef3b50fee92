use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assessment::plan_store;
use crate::errors::AppError;
use crate::generation::models::VoiceQuestion;
use crate::interview::realtime::fetch_signed_url;
use crate::interview::session::{InterviewSession, SessionStatus};
use crate::models::plan::VoiceAnswer;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartInterviewRequest {
    pub plan_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub total_questions: usize,
    pub question: VoiceQuestion,
    /// Present only when realtime signing is configured and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_url: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub session_id: Uuid,
    pub answered: usize,
    pub total_questions: usize,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<VoiceQuestion>,
}

#[derive(Serialize)]
pub struct StopResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub answers_recorded: usize,
}

/// POST /api/v1/interview/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let row = plan_store::find_plan(&state.db, req.plan_id).await?;
    if row.user_id != req.user_id {
        return Err(AppError::NotFound(format!(
            "Assessment plan {} not found",
            req.plan_id
        )));
    }

    let doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;
    let questions = doc
        .voice_questions
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            AppError::Validation("plan has no voice questions; generate them first".to_string())
        })?;

    let session = InterviewSession::new(req.plan_id, req.user_id, questions);
    state.sessions.put(&session).await?;

    let realtime_url =
        fetch_signed_url(state.config.realtime_signing_url.as_deref(), session.id).await;

    info!(
        "Started interview session {} for plan {} ({} questions)",
        session.id,
        req.plan_id,
        session.questions.len()
    );

    let question = session.questions[0].clone();
    Ok(Json(StartInterviewResponse {
        session_id: session.id,
        total_questions: session.questions.len(),
        question,
        realtime_url,
    }))
}

/// POST /api/v1/interview/:id/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let mut session = state
        .sessions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))?;

    if session.status != SessionStatus::Active {
        return Err(AppError::Validation(format!(
            "session {id} is no longer active"
        )));
    }

    let current = session
        .current_question()
        .cloned()
        .ok_or_else(|| AppError::Validation(format!("session {id} has no pending question")))?;

    session.answers.push(VoiceAnswer {
        question_id: current.id,
        question: current.text,
        answer: req.answer,
    });
    session.cursor += 1;

    let completed = session.is_finished();
    if completed {
        session.status = SessionStatus::Completed;
        flush_answers_to_plan(&state, &session).await?;
        info!("Interview session {id} completed; answers flushed to plan");
    }
    state.sessions.put(&session).await?;

    Ok(Json(AnswerResponse {
        session_id: session.id,
        answered: session.answers.len(),
        total_questions: session.questions.len(),
        completed,
        next_question: session.current_question().cloned(),
    }))
}

/// POST /api/v1/interview/:id/stop
pub async fn handle_stop_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StopResponse>, AppError> {
    let mut session = state
        .sessions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))?;

    if session.status == SessionStatus::Active {
        session.status = SessionStatus::Cancelled;
        // Partial answers still count toward evaluation.
        flush_answers_to_plan(&state, &session).await?;
        // A cancelled session is terminal; the answers live in the plan now.
        state.sessions.delete(session.id).await?;
        info!(
            "Interview session {id} cancelled with {} answers recorded",
            session.answers.len()
        );
    }

    Ok(Json(StopResponse {
        session_id: session.id,
        status: session.status,
        answers_recorded: session.answers.len(),
    }))
}

/// Writes the session's answers into the plan document (whole-document
/// read-modify-write, like every other plan update).
async fn flush_answers_to_plan(state: &AppState, session: &InterviewSession) -> Result<(), AppError> {
    if session.answers.is_empty() {
        return Ok(());
    }
    let row = plan_store::find_plan(&state.db, session.plan_id).await?;
    let mut doc = row.doc().map_err(|e| AppError::Internal(e.into()))?;
    doc.voice_answers = Some(session.answers.clone());
    plan_store::update_plan_doc(&state.db, session.plan_id, &doc, None).await?;
    Ok(())
}
