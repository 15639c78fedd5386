//! LLM completion client: prompt in, text out.
//!
//! Speaks a Gemini-style `generateContent` endpoint. The caller decides
//! what to do with the raw text; this client never parses analysis
//! content, only the completion envelope.

use crate::http::HttpClient;
use planwise_core::{AgentConfig, AgentError};
use serde_json::json;
use tracing::debug;

/// Client for the upstream LLM completion API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: HttpClient,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    /// Build a client from configuration. Returns `None` when no API key
    /// is configured, which callers treat as "fallback mode, no network".
    pub fn from_config(config: &AgentConfig, http: HttpClient) -> Option<Self> {
        let api_key = config.llm_api_key.clone()?;
        Some(Self {
            http,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            api_key,
        })
    }

    /// Send a prompt and return the completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending completion request");

        let response = self
            .http
            .execute_with_retry(|| self.http.inner().post(&url).json(&body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::UpstreamTransport(format!(
                "LLM API error (status {status}): {detail}"
            )));
        }

        #[derive(serde::Deserialize)]
        struct GenerateResponse {
            candidates: Vec<Candidate>,
        }
        #[derive(serde::Deserialize)]
        struct Candidate {
            content: Content,
        }
        #[derive(serde::Deserialize)]
        struct Content {
            parts: Vec<Part>,
        }
        #[derive(serde::Deserialize)]
        struct Part {
            text: String,
        }

        let envelope: GenerateResponse = response.json().await.map_err(|e| {
            AgentError::UpstreamTransport(format!("malformed completion envelope: {e}"))
        })?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                AgentError::UpstreamTransport("completion contained no candidates".to_string())
            })
    }

    /// Lightweight availability probe; never retried.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        match self.http.probe(self.http.inner().get(&url)).await {
            Ok(status) => status.is_success(),
            Err(_) => false,
        }
    }
}
