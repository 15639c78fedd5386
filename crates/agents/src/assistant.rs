//! Assistant agent: conversational planning help.

use crate::dispatch::Agent;
use crate::prompt::{build_prompt, PromptContext};
use crate::{fallback, normalize::truncate_to_word_limit, text_metadata};
use async_trait::async_trait;
use planwise_client::LlmClient;
use planwise_core::{
    AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult, ChatPayload,
    MAX_FIELD_WORDS,
};
use std::time::Instant;
use tracing::{info, warn};

/// The conversational assistant agent.
pub struct AssistantAgent {
    llm: Option<LlmClient>,
}

impl AssistantAgent {
    /// Create the agent; `None` means permanent fallback mode.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    fn fallback_result(&self, chat: &ChatPayload, started: Instant) -> AgentResult {
        AgentResult::Text {
            content: fallback::assistant_reply(&chat.message, chat.event_context.as_ref()),
            metadata: text_metadata("fallback_generator", true, started),
        }
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::AiAssistant
    }

    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError> {
        let AgentPayload::Chat(chat) = &invocation.payload else {
            return Err(AgentError::Validation(
                "assistant requires a chat payload".to_string(),
            ));
        };
        if chat.message.trim().is_empty() {
            return Err(AgentError::Validation(
                "chat message must not be empty".to_string(),
            ));
        }
        let started = Instant::now();

        let Some(llm) = &self.llm else {
            info!("no LLM API key, using canned assistant reply");
            return Ok(self.fallback_result(chat, started));
        };

        let context = PromptContext {
            event: chat.event_context.as_ref(),
            message: Some(&chat.message),
            ..PromptContext::default()
        };
        let prompt = build_prompt(AgentKind::AiAssistant, &context);
        match llm.complete(&prompt).await {
            Ok(raw_text) => Ok(AgentResult::Text {
                content: truncate_to_word_limit(raw_text.trim(), MAX_FIELD_WORDS),
                metadata: text_metadata("llm", false, started),
            }),
            Err(err @ AgentError::UpstreamAuth(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "LLM unavailable, using canned assistant reply");
                Ok(self.fallback_result(chat, started))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let agent = AssistantAgent::new(None);
        let invocation = AgentInvocation::new(
            AgentKind::AiAssistant,
            AgentPayload::Chat(ChatPayload {
                message: "   ".to_string(),
                event_context: None,
            }),
        );
        assert!(matches!(
            agent.run(&invocation).await,
            Err(AgentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_gets_canned_reply() {
        let agent = AssistantAgent::new(None);
        let invocation = AgentInvocation::new(
            AgentKind::AiAssistant,
            AgentPayload::Chat(ChatPayload {
                message: "how big should my budget be?".to_string(),
                event_context: None,
            }),
        );
        let result = agent.run(&invocation).await.unwrap();
        assert!(result.is_fallback());
    }
}
