use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use competitor_scout::ServiceCredentials;
use dotenvy::dotenv;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub anspire: ServiceCredentials,
    pub llm: ServiceCredentials,
    pub llm_model: String,
    pub jina_reader_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub search_timeout: Duration,
    pub fetch_timeout: Duration,
    pub llm_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let anspire = ServiceCredentials::new(
            var("ANSPIRE_API_KEY").context("ANSPIRE_API_KEY must be set")?,
        )
        .with_base_url(var("ANSPIRE_BASE_URL").unwrap_or_default());

        let llm = ServiceCredentials::new(var("LLM_API_KEY").context("LLM_API_KEY must be set")?)
            .with_base_url(var("LLM_BASE_URL").unwrap_or_default());

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8888".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            port: parse_or(&var, "PORT", 8000)?,
            anspire,
            llm,
            llm_model: var("LLM_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            jina_reader_url: var("JINA_READER_URL"),
            allowed_origins,
            search_timeout: Duration::from_secs(parse_or(&var, "SEARCH_TIMEOUT_SECS", 30)?),
            fetch_timeout: Duration::from_secs(parse_or(&var, "FETCH_TIMEOUT_SECS", 30)?),
            llm_timeout: Duration::from_secs(parse_or(&var, "LLM_TIMEOUT_SECS", 60)?),
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}
