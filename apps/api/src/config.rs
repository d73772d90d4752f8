use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::gguf::{GgufSource, DEFAULT_GGUF_FILE, DEFAULT_GGUF_REPO};
use crate::llm_client::local::{LocalModelSource, DEFAULT_MAX_NEW_TOKENS};

/// A real inference tier that can be placed in the cascade via `INFERENCE_TIERS`.
/// The mock tier is not listed here: it is controlled by `DEV_MODE` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Remote,
    Local,
}

impl FromStr for TierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => bail!("Unknown inference tier '{other}' (expected 'remote' or 'local')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub default_model: String,
    pub tier_order: Vec<TierKind>,
    pub remote_timeout: Option<Duration>,
    pub local_timeout: Option<Duration>,
    pub local_model_name: String,
    pub local_model: LocalModelSource,
    pub local_max_new_tokens: usize,
    pub dev_mode: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tier_order = var("INFERENCE_TIERS")
            .unwrap_or_else(|| "remote,local".to_string())
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(TierKind::from_str)
            .collect::<Result<Vec<_>>>()
            .context("INFERENCE_TIERS must be a comma-separated list of tiers")?;
        if tier_order.is_empty() {
            bail!("INFERENCE_TIERS must name at least one tier ('remote' or 'local')");
        }

        let remote_timeout = parse_or(var("REMOTE_TIMEOUT_MS"), 5000, "REMOTE_TIMEOUT_MS")?;
        if remote_timeout == 0 {
            bail!("REMOTE_TIMEOUT_MS must be greater than zero");
        }
        let local_timeout = var("LOCAL_TIMEOUT_MS")
            .map(|v| parse::<u64>(&v, "LOCAL_TIMEOUT_MS"))
            .transpose()?;
        if local_timeout == Some(0) {
            bail!("LOCAL_TIMEOUT_MS must be greater than zero (leave it unset for no budget)");
        }

        let local_model = match (var("LOCAL_TEMPLATE_TABLE"), var("LOCAL_MODEL_PATH")) {
            (Some(_), Some(_)) => {
                bail!("Set either LOCAL_MODEL_PATH or LOCAL_TEMPLATE_TABLE, not both")
            }
            (Some(table), None) => LocalModelSource::Table(PathBuf::from(table)),
            (None, Some(path)) => LocalModelSource::Gguf(GgufSource::Path(PathBuf::from(path))),
            (None, None) => LocalModelSource::Gguf(GgufSource::Hub {
                repo: var("LOCAL_MODEL_REPO").unwrap_or_else(|| DEFAULT_GGUF_REPO.to_string()),
                file: var("LOCAL_MODEL_FILE").unwrap_or_else(|| DEFAULT_GGUF_FILE.to_string()),
            }),
        };

        Ok(Config {
            ollama_base_url: var("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            default_model: var("DEFAULT_MODEL").unwrap_or_else(|| "llama3".to_string()),
            tier_order,
            remote_timeout: Some(Duration::from_millis(remote_timeout)),
            local_timeout: local_timeout.map(Duration::from_millis),
            local_model_name: var("LOCAL_MODEL_NAME")
                .unwrap_or_else(|| "tinyllama-local".to_string()),
            local_model,
            local_max_new_tokens: parse_or(
                var("LOCAL_MAX_NEW_TOKENS"),
                DEFAULT_MAX_NEW_TOKENS,
                "LOCAL_MAX_NEW_TOKENS",
            )?,
            dev_mode: var("DEV_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            port: parse_or(var("PORT"), 8000, "PORT")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{value}'"))
}

fn parse_or<T: FromStr>(value: Option<String>, default: T, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => parse(&v, key),
        None => Ok(default),
    }
}
