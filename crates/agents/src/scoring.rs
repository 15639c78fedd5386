//! Organizer-scoring agent: one readiness verdict over the three
//! upstream analyses.
//!
//! The caller sequences the fan-out; by the time this agent runs, the
//! weather, current-events, and historical analyses must already be in
//! the payload.

use crate::dispatch::Agent;
use crate::prompt::{build_prompt, PromptContext};
use crate::{fallback, normalize::truncate_to_word_limit, text_metadata};
use async_trait::async_trait;
use planwise_client::LlmClient;
use planwise_core::{
    AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult, ScoringPayload,
    MAX_FIELD_WORDS,
};
use std::time::Instant;
use tracing::{info, warn};

/// The organizer-scoring agent.
pub struct ScoringAgent {
    llm: Option<LlmClient>,
}

impl ScoringAgent {
    /// Create the agent; `None` means permanent fallback mode.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    fn fallback_result(&self, payload: &ScoringPayload, started: Instant) -> AgentResult {
        AgentResult::Text {
            content: fallback::scoring_report(payload),
            metadata: text_metadata("fallback_generator", true, started),
        }
    }
}

fn validate_payload(payload: &ScoringPayload) -> Result<(), AgentError> {
    payload.event.validate()?;
    let mut missing = Vec::new();
    if payload.weather_analysis.trim().is_empty() {
        missing.push("weatherAnalysis");
    }
    if payload.current_events_analysis.trim().is_empty() {
        missing.push("currentEventsAnalysis");
    }
    if payload.historical_analysis.trim().is_empty() {
        missing.push("historicalAnalysis");
    }
    if !missing.is_empty() {
        return Err(AgentError::Validation(format!(
            "scoring requires the upstream analyses: missing {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

#[async_trait]
impl Agent for ScoringAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::OrganizerScoring
    }

    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError> {
        let AgentPayload::Scoring(payload) = &invocation.payload else {
            return Err(AgentError::Validation(
                "scoring agent requires the event plus the three analyses".to_string(),
            ));
        };
        validate_payload(payload)?;
        let started = Instant::now();

        let Some(llm) = &self.llm else {
            info!("no LLM API key, using heuristic scoring");
            return Ok(self.fallback_result(payload, started));
        };

        let context = PromptContext {
            event: Some(&payload.event),
            weather_analysis: Some(&payload.weather_analysis),
            current_events_analysis: Some(&payload.current_events_analysis),
            historical_analysis: Some(&payload.historical_analysis),
            message: None,
        };
        let prompt = build_prompt(AgentKind::OrganizerScoring, &context);
        match llm.complete(&prompt).await {
            Ok(raw_text) => Ok(AgentResult::Text {
                content: truncate_to_word_limit(raw_text.trim(), MAX_FIELD_WORDS),
                metadata: text_metadata("llm", false, started),
            }),
            Err(err @ AgentError::UpstreamAuth(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "LLM unavailable, using heuristic scoring");
                Ok(self.fallback_result(payload, started))
            }
        }
    }
}
