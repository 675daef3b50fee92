pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment lifecycle
        .route(
            "/api/v1/assessments",
            get(assessment::handle_list_assessments).post(assessment::handle_start_assessment),
        )
        .route(
            "/api/v1/assessments/current",
            get(assessment::handle_current_assessment),
        )
        .route(
            "/api/v1/assessments/:id",
            get(assessment::handle_get_assessment),
        )
        .route(
            "/api/v1/assessments/:id/questions/:component",
            post(assessment::handle_generate_questions),
        )
        .route(
            "/api/v1/assessments/:id/answers/mcq",
            post(assessment::handle_submit_mcq),
        )
        .route(
            "/api/v1/assessments/:id/answers/code",
            post(assessment::handle_submit_code),
        )
        .route(
            "/api/v1/assessments/:id/evaluate",
            post(assessment::handle_evaluate),
        )
        // Live voice interview
        .route("/api/v1/interview/start", post(interview::handle_start_interview))
        .route("/api/v1/interview/:id/answer", post(interview::handle_answer))
        .route("/api/v1/interview/:id/stop", post(interview::handle_stop_interview))
        .with_state(state)
}
