use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::cache::AnalysisCache;
use crate::config::Config;
use crate::evaluation::arbiter::ArbitrationStrategy;
use crate::interview::session::SessionStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Primary provider: analysis, classification, generation, component scoring.
    pub llm: LlmClient,
    /// Every provider that evaluates the full transcript during arbitration.
    pub evaluation_providers: Vec<LlmClient>,
    /// Pluggable arbitration policy. Default: LlmSelectionArbiter. Swap via
    /// ARBITRATION_POLICY env.
    pub arbitration: Arc<dyn ArbitrationStrategy>,
    /// Live interview sessions. Memory or Redis via SESSION_BACKEND env.
    pub sessions: Arc<dyn SessionStore>,
    pub cache: AnalysisCache,
    pub config: Config,
}
