//! Runtime configuration, read once at startup.
//!
//! Components never read the environment themselves; the binary builds
//! one `AgentConfig` and passes it down. Presence or absence of each API
//! key is the only toggle between real and fallback behavior.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read-once configuration for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// LLM API key; absent means every LLM-backed agent runs in
    /// fallback mode without attempting a network call
    pub llm_api_key: Option<String>,

    /// LLM API base URL
    pub llm_base_url: String,

    /// LLM model name
    pub llm_model: String,

    /// Weather API key; absent means the weather agent runs in
    /// fallback mode
    pub weather_api_key: Option<String>,

    /// Weather API base URL
    pub weather_base_url: String,

    /// Retry attempts per upstream call
    pub max_attempts: u32,

    /// Per-attempt timeout
    pub attempt_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model: "gemini-2.0-flash".to_string(),
            weather_api_key: None,
            weather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl AgentConfig {
    /// Build configuration from environment variables. Called once per
    /// process; no teardown needed.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.llm_api_key = non_empty_env("GEMINI_API_KEY");
        config.weather_api_key = non_empty_env("OPENWEATHER_API_KEY");
        if let Some(url) = non_empty_env("GEMINI_BASE_URL") {
            config.llm_base_url = url;
        }
        if let Some(model) = non_empty_env("GEMINI_MODEL") {
            config.llm_model = model;
        }
        if let Some(url) = non_empty_env("OPENWEATHER_BASE_URL") {
            config.weather_base_url = url;
        }
        config
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
