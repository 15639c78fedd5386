//! Current-events agent: competing events and news around the date.
//!
//! The only agent that returns the structured response shape on the
//! wire; everything the model says goes through the normalizer.

use crate::dispatch::Agent;
use crate::prompt::{build_prompt, PromptContext};
use crate::{fallback, normalize::normalize, text_metadata};
use async_trait::async_trait;
use planwise_client::LlmClient;
use planwise_core::{
    AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult, EventRequest,
};
use std::time::Instant;
use tracing::{info, warn};

/// The current-events analysis agent.
pub struct CurrentEventsAgent {
    llm: Option<LlmClient>,
}

impl CurrentEventsAgent {
    /// Create the agent; `None` means permanent fallback mode.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    fn fallback_result(&self, event: &EventRequest, started: Instant) -> AgentResult {
        let mut response = fallback::current_events_response(event);
        response.metadata.insert(
            "processing_ms".to_string(),
            started.elapsed().as_millis().to_string(),
        );
        response
            .metadata
            .insert("timestamp".to_string(), chrono::Utc::now().to_rfc3339());
        AgentResult::Structured(response)
    }
}

#[async_trait]
impl Agent for CurrentEventsAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::CurrentEvents
    }

    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError> {
        let AgentPayload::Event(event) = &invocation.payload else {
            return Err(AgentError::Validation(
                "current-events agent requires an event payload".to_string(),
            ));
        };
        event.validate()?;
        let started = Instant::now();

        let Some(llm) = &self.llm else {
            info!("no LLM API key, using current-events fallback");
            return Ok(self.fallback_result(event, started));
        };

        let prompt = build_prompt(AgentKind::CurrentEvents, &PromptContext::for_event(event));
        match llm.complete(&prompt).await {
            Ok(raw_text) => {
                let fallback_summary = format!(
                    "Current events scan for {} around {}.",
                    event.location, event.date
                );
                let mut response =
                    normalize(AgentKind::CurrentEvents, &raw_text, &fallback_summary);
                for (key, value) in text_metadata("llm", false, started) {
                    response.metadata.entry(key).or_insert(value);
                }
                Ok(AgentResult::Structured(response))
            }
            Err(err @ AgentError::UpstreamAuth(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "LLM unavailable, using current-events fallback");
                Ok(self.fallback_result(event, started))
            }
        }
    }
}
