use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Harness configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub model: String,
    pub data_dir: PathBuf,
    pub experiments_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Sequence-classification endpoint for reward scoring. `None` → heuristic fallback.
    pub reward_model_url: Option<String>,
    pub request_delay_ms: u64,
    pub dataset_seed: u64,
    pub rust_log: String,
}

/// Source of raw variable values, keyed by name.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup: Lookup = &lookup;
        Ok(Config {
            groq_api_key: require_env(lookup, "GROQ_API_KEY")?,
            groq_api_url: env_or(lookup, "GROQ_API_URL", DEFAULT_GROQ_API_URL),
            model: env_or(lookup, "LLM_MODEL", DEFAULT_MODEL),
            data_dir: PathBuf::from(env_or(lookup, "DATA_DIR", "data/raw")),
            experiments_dir: PathBuf::from(env_or(lookup, "EXPERIMENTS_DIR", "experiments")),
            results_dir: PathBuf::from(env_or(lookup, "RESULTS_DIR", "results")),
            reward_model_url: lookup("REWARD_MODEL_URL").filter(|v| !v.trim().is_empty()),
            request_delay_ms: parse_env(lookup, "REQUEST_DELAY_MS", 50)?,
            dataset_seed: parse_env(lookup, "DATASET_SEED", 42)?,
            rust_log: env_or(lookup, "RUST_LOG", "info"),
        })
    }
}

fn require_env(lookup: Lookup, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(lookup: Lookup, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(lookup: Lookup, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
