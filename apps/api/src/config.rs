use anyhow::{Context, Result};

/// Which arbitration policy reconciles multiple provider evaluations.
/// `ArbiterSelection` is the canonical default; `WeightedAverage` is the
/// arithmetic alternative kept for deployments without an arbiter budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationPolicy {
    ArbiterSelection,
    WeightedAverage,
}

/// Which backend holds live voice-interview sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Second evaluation provider. Arbitration degrades to a single provider
    /// when unset.
    pub openai_api_key: Option<String>,
    pub analysis_cache_dir: String,
    pub arbitration_policy: ArbitrationPolicy,
    pub multi_llm_enabled: bool,
    pub session_backend: SessionBackend,
    pub session_ttl_secs: u64,
    /// Third-party realtime-voice signing endpoint. Optional; failures only
    /// degrade the live-voice experience.
    pub realtime_signing_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_backend = match std::env::var("SESSION_BACKEND").as_deref() {
            Ok("redis") => SessionBackend::Redis,
            _ => SessionBackend::Memory,
        };

        let redis_url = std::env::var("REDIS_URL").ok();
        if session_backend == SessionBackend::Redis && redis_url.is_none() {
            anyhow::bail!("SESSION_BACKEND=redis requires REDIS_URL to be set");
        }

        let arbitration_policy = match std::env::var("ARBITRATION_POLICY").as_deref() {
            Ok("weighted_average") => ArbitrationPolicy::WeightedAverage,
            _ => ArbitrationPolicy::ArbiterSelection,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            analysis_cache_dir: std::env::var("ANALYSIS_CACHE_DIR")
                .unwrap_or_else(|_| "./cache/resume-analysis".to_string()),
            arbitration_policy,
            multi_llm_enabled: std::env::var("MULTI_LLM_EVALUATION")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
            session_backend,
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400),
            realtime_signing_url: std::env::var("REALTIME_SIGNING_URL").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
