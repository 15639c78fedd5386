//! Historic-events agent: comparable past events and their outcomes.

use crate::dispatch::Agent;
use crate::prompt::{build_prompt, PromptContext};
use crate::{fallback, normalize::truncate_to_word_limit, text_metadata};
use async_trait::async_trait;
use planwise_client::LlmClient;
use planwise_core::{
    AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult, EventRequest,
    MAX_FIELD_WORDS,
};
use std::time::Instant;
use tracing::{info, warn};

/// The historic-events analysis agent.
pub struct HistoricEventsAgent {
    llm: Option<LlmClient>,
}

impl HistoricEventsAgent {
    /// Create the agent; `None` means permanent fallback mode.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    fn fallback_result(&self, event: &EventRequest, started: Instant) -> AgentResult {
        AgentResult::Text {
            content: fallback::historical_report(event),
            metadata: text_metadata("fallback_generator", true, started),
        }
    }
}

#[async_trait]
impl Agent for HistoricEventsAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::HistoricEvents
    }

    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError> {
        let AgentPayload::Event(event) = &invocation.payload else {
            return Err(AgentError::Validation(
                "historic-events agent requires an event payload".to_string(),
            ));
        };
        event.validate()?;
        let started = Instant::now();

        let Some(llm) = &self.llm else {
            info!("no LLM API key, using historical fallback");
            return Ok(self.fallback_result(event, started));
        };

        let prompt = build_prompt(AgentKind::HistoricEvents, &PromptContext::for_event(event));
        match llm.complete(&prompt).await {
            Ok(raw_text) => Ok(AgentResult::Text {
                content: truncate_to_word_limit(raw_text.trim(), MAX_FIELD_WORDS),
                metadata: text_metadata("llm", false, started),
            }),
            Err(err @ AgentError::UpstreamAuth(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "LLM unavailable, using historical fallback");
                Ok(self.fallback_result(event, started))
            }
        }
    }
}
