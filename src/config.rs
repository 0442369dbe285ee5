//! Configuration for Copysmith.
//!
//! Everything is environment-driven. A `.env` file is honored if present;
//! nothing is read from disk beyond that and the reference data files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Main configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            llm: LlmConfig::from_env()?,
            engine: EngineConfig::from_env()?,
        })
    }
}

/// Which text-generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Any endpoint that speaks the OpenAI Chat Completions API
    /// (OpenAI, OpenRouter, vLLM, Ollama with OpenAI format).
    #[default]
    OpenAiCompatible,
    /// No network at all: every attempt uses the deterministic
    /// template fallback.
    Offline,
}

impl std::str::FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai_compatible" | "openai-compatible" | "compatible" => Ok(Self::OpenAiCompatible),
            "offline" | "none" => Ok(Self::Offline),
            _ => Err(format!(
                "invalid LLM backend '{}', expected one of: openai_compatible, offline",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Text-generation settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    /// Base URL of the Chat Completions endpoint.
    pub base_url: String,
    /// API key; optional for local endpoints.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match optional_env("LLM_BACKEND") {
            Some(raw) => raw
                .parse::<LlmBackend>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "LLM_BACKEND".to_string(),
                    message,
                })?,
            None => LlmBackend::default(),
        };

        Ok(Self {
            backend,
            base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            api_key: optional_env("LLM_API_KEY").map(SecretString::from),
            model: optional_env("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            temperature: parse_optional_env("LLM_TEMPERATURE")?.unwrap_or(0.7),
            max_tokens: parse_optional_env("LLM_MAX_TOKENS")?,
            timeout: Duration::from_secs(parse_optional_env("LLM_TIMEOUT_SECS")?.unwrap_or(120)),
        })
    }
}

/// Pipeline engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Retry budget for the compliance loop. A run makes at most
    /// `max_retries + 1` generation attempts.
    pub max_retries: u32,
    /// Directory holding products.json, brand_rules.json, customers.json.
    pub data_dir: PathBuf,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_retries: parse_optional_env("MAX_RETRIES")?.unwrap_or(1),
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
        })
    }
}

/// Read an env var, treating empty strings as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an env var, treating empty strings as unset.
fn parse_optional_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}
