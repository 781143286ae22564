use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";
const DEFAULT_LLAMA_CLOUD_BASE_URL: &str = "https://api.cloud.llamaindex.ai";
const DEFAULT_EXTRACTION_AGENT_NAME: &str = "resume-screening";
const DEFAULT_EXTRACTION_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_EXTRACTION_MAX_POLLS: u32 = 120;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Only the extraction page needs a secret; without it that page answers 503.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama_url: String,
    pub default_model: String,
    pub llama_cloud_api_key: Option<String>,
    pub llama_cloud_base_url: String,
    pub extraction_agent_name: String,
    pub extraction_poll_interval_ms: u64,
    pub extraction_max_polls: u32,
    pub export_dir: Option<PathBuf>,
    /// Sessions untouched for longer than this are dropped.
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_or(get("PORT"), DEFAULT_PORT)
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            default_model: get("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llama_cloud_api_key: get("LLAMA_CLOUD_API_KEY"),
            llama_cloud_base_url: get("LLAMA_CLOUD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLAMA_CLOUD_BASE_URL.to_string()),
            extraction_agent_name: get("EXTRACTION_AGENT_NAME")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_AGENT_NAME.to_string()),
            extraction_poll_interval_ms: parse_or(
                get("EXTRACTION_POLL_INTERVAL_MS"),
                DEFAULT_EXTRACTION_POLL_INTERVAL_MS,
            )
            .context("EXTRACTION_POLL_INTERVAL_MS must be a whole number of milliseconds")?,
            extraction_max_polls: parse_or(
                get("EXTRACTION_MAX_POLLS"),
                DEFAULT_EXTRACTION_MAX_POLLS,
            )
            .context("EXTRACTION_MAX_POLLS must be a positive integer")?,
            export_dir: get("EXPORT_DIR").map(PathBuf::from),
            session_idle_ttl_secs: parse_or(
                get("SESSION_IDLE_TTL_SECS"),
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )
            .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}
