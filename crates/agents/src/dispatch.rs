//! Agent trait and dispatcher.
//!
//! One entry point validates the agent kind, decodes the payload for that
//! kind, and routes to the single matching agent. Agents hold no shared
//! mutable state and may be invoked concurrently.

use crate::assistant::AssistantAgent;
use crate::current_events::CurrentEventsAgent;
use crate::historic_events::HistoricEventsAgent;
use crate::scoring::ScoringAgent;
use crate::weather::WeatherAgent;
use async_trait::async_trait;
use planwise_client::{HttpClient, LlmClient, RetryConfig, WeatherClient};
use planwise_core::{
    AgentConfig, AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// An independently invocable analysis function.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which kind this agent serves.
    fn kind(&self) -> AgentKind;

    /// Run one invocation. Only validation errors and auth problems come
    /// back as `Err`; everything else degrades to fallback output.
    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError>;
}

/// Routes invocations to the matching agent. Stateless across calls.
pub struct Dispatcher {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
}

impl Dispatcher {
    /// Build the five agents from configuration. API clients exist only
    /// for the upstreams that have a key configured.
    pub fn new(config: &AgentConfig) -> Self {
        let http = HttpClient::new(RetryConfig {
            max_attempts: config.max_attempts,
            attempt_timeout: config.attempt_timeout,
            ..RetryConfig::default()
        });
        let llm = LlmClient::from_config(config, http.clone());
        let weather = WeatherClient::from_config(config, http.clone());

        info!(
            llm_configured = llm.is_some(),
            weather_configured = weather.is_some(),
            "building agent dispatcher"
        );

        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(WeatherAgent::new(weather)),
            Arc::new(CurrentEventsAgent::new(llm.clone())),
            Arc::new(HistoricEventsAgent::new(llm.clone())),
            Arc::new(ScoringAgent::new(llm.clone())),
            Arc::new(AssistantAgent::new(llm)),
        ];
        Self::with_agents(agents)
    }

    /// Build a dispatcher from explicit agent implementations. Used by
    /// tests to substitute failing or canned agents.
    pub fn with_agents(agents: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            agents: agents.into_iter().map(|a| (a.kind(), a)).collect(),
        }
    }

    /// Run an already-decoded invocation.
    pub async fn run(
        &self,
        kind: AgentKind,
        payload: AgentPayload,
    ) -> Result<AgentResult, AgentError> {
        let agent = self
            .agents
            .get(&kind)
            .ok_or_else(|| AgentError::UnknownAgentKind(kind.to_string()))?;
        let invocation = AgentInvocation::new(kind, payload);
        info!(
            agent = %kind,
            correlation_id = ?invocation.correlation_id,
            "dispatching agent invocation"
        );
        agent.run(&invocation).await
    }

    /// Wire-level entry point: validate the kind name, decode the payload
    /// for that kind, and run it.
    pub async fn dispatch(
        &self,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<AgentResult, AgentError> {
        let kind: AgentKind = kind.parse()?;
        let payload = AgentPayload::from_value(kind, payload)?;
        self.run(kind, payload).await
    }
}
