//! Persistence for assessment plans.
//!
//! The plan row is the unit of storage; pipeline state updates always
//! replace the whole `interview_plan` document after a fresh read, so each
//! stage sees every prior stage's output.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plan::{AssessmentPlanRow, InterviewPlanDoc, STATUS_DRAFT};

/// Inserts a new draft plan for the user.
pub async fn create_plan(
    pool: &PgPool,
    user_id: Uuid,
    doc: &InterviewPlanDoc,
) -> Result<AssessmentPlanRow, AppError> {
    let interview_plan =
        serde_json::to_value(doc).map_err(|e| AppError::Internal(e.into()))?;

    let row = sqlx::query_as::<_, AssessmentPlanRow>(
        r#"
        INSERT INTO assessment_plans (id, user_id, status, interview_plan)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(STATUS_DRAFT)
    .bind(interview_plan)
    .fetch_one(pool)
    .await?;

    info!("Created draft assessment plan {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn find_plan(pool: &PgPool, id: Uuid) -> Result<AssessmentPlanRow, AppError> {
    sqlx::query_as::<_, AssessmentPlanRow>("SELECT * FROM assessment_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment plan {id} not found")))
}

/// The user's most recent draft, if any.
pub async fn find_current_draft(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<AssessmentPlanRow>, AppError> {
    Ok(sqlx::query_as::<_, AssessmentPlanRow>(
        r#"
        SELECT * FROM assessment_plans
        WHERE user_id = $1 AND status = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(STATUS_DRAFT)
    .fetch_optional(pool)
    .await?)
}

/// All of the user's plans, newest first.
pub async fn list_plans(pool: &PgPool, user_id: Uuid) -> Result<Vec<AssessmentPlanRow>, AppError> {
    Ok(sqlx::query_as::<_, AssessmentPlanRow>(
        "SELECT * FROM assessment_plans WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Replaces the whole plan document, optionally moving the row's status.
pub async fn update_plan_doc(
    pool: &PgPool,
    id: Uuid,
    doc: &InterviewPlanDoc,
    status: Option<&str>,
) -> Result<AssessmentPlanRow, AppError> {
    let interview_plan =
        serde_json::to_value(doc).map_err(|e| AppError::Internal(e.into()))?;

    let row = sqlx::query_as::<_, AssessmentPlanRow>(
        r#"
        UPDATE assessment_plans
        SET interview_plan = $2,
            status = COALESCE($3, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(interview_plan)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Assessment plan {id} not found")))?;

    Ok(row)
}
