use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Request bodies may exceed the 5 MiB file cap so oversized uploads reach the
/// encoder and get its size-limit message instead of a bare 413.
const DEFAULT_MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// Sessions untouched for this long are evicted along with their uploaded file.
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if the model credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Injected UI preference, echoed back in every session view.
    pub theme: Theme,
    pub max_request_bytes: usize,
    pub session_ttl: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => bail!("THEME must be 'light' or 'dark', got '{other}'"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")
                .or_else(|_| require_env("API_KEY"))
                .context("Model credential missing: set GEMINI_API_KEY (or API_KEY)")?,
            gemini_model: optional_env("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: optional_env("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            theme: optional_env("THEME", "light").parse()?,
            max_request_bytes: match std::env::var("MAX_REQUEST_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_REQUEST_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_REQUEST_BYTES,
            },
            session_ttl: Duration::from_secs(
                optional_env("SESSION_TTL_SECS", &DEFAULT_SESSION_TTL_SECS.to_string())
                    .parse::<u64>()
                    .context("SESSION_TTL_SECS must be a number of seconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Offline configuration for handler tests; never used to reach the network.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            theme: Theme::Light,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}
