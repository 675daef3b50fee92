mod analysis;
mod assessment;
mod config;
mod db;
mod errors;
mod evaluation;
mod generation;
mod interview;
mod llm_client;
mod models;
mod planner;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::cache::AnalysisCache;
use crate::config::{ArbitrationPolicy, Config, SessionBackend};
use crate::db::create_pool;
use crate::evaluation::arbiter::{ArbitrationStrategy, LlmSelectionArbiter, WeightedAverageArbiter};
use crate::interview::session::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM providers. Anthropic is the primary; OpenAI joins the
    // evaluation pool when a key is present.
    let llm = LlmClient::anthropic(config.anthropic_api_key.clone());
    let mut evaluation_providers = vec![llm.clone()];
    match &config.openai_api_key {
        Some(key) => evaluation_providers.push(LlmClient::openai(key.clone())),
        None => warn!("OPENAI_API_KEY not set; evaluations run single-provider"),
    }
    info!(
        "LLM providers initialized (primary model {}, {} evaluation provider(s))",
        llm.model(),
        evaluation_providers.len()
    );

    // Pick the arbitration strategy
    let arbitration: Arc<dyn ArbitrationStrategy> = match config.arbitration_policy {
        ArbitrationPolicy::ArbiterSelection => Arc::new(LlmSelectionArbiter::new(llm.clone())),
        ArbitrationPolicy::WeightedAverage => Arc::new(WeightedAverageArbiter),
    };
    info!("Arbitration strategy: {}", arbitration.name());

    // Pick the session store
    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Redis => {
            let url = config
                .redis_url
                .clone()
                .unwrap_or_default();
            let client = redis::Client::open(url)?;
            info!("Session store: redis (TTL {}s)", config.session_ttl_secs);
            Arc::new(RedisSessionStore::new(client, config.session_ttl_secs))
        }
        SessionBackend::Memory => {
            info!("Session store: in-memory (TTL {}s)", config.session_ttl_secs);
            Arc::new(InMemorySessionStore::new(config.session_ttl_secs))
        }
    };

    // Analysis cache with a daily expiry sweep
    let cache = AnalysisCache::new(&config.analysis_cache_dir);
    let sweep_cache = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = sweep_cache.sweep_expired();
            if evicted > 0 {
                info!("Analysis cache sweep evicted {evicted} expired entries");
            }
        }
    });

    // Build app state
    let state = AppState {
        db,
        s3,
        llm,
        evaluation_providers,
        arbitration,
        sessions,
        cache,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "interview-api-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
