//! Agent kinds, payload union, and result shape.

use crate::error::AgentError;
use crate::event::EventRequest;
use crate::response::NormalizedAgentResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ulid::Ulid;

/// The fixed set of analysis agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Weather suitability analysis
    #[serde(rename = "weather")]
    Weather,

    /// Scan of concurrent local events and news
    #[serde(rename = "currentEvents")]
    CurrentEvents,

    /// Comparable past events and their outcomes
    #[serde(rename = "historicEvents")]
    HistoricEvents,

    /// Aggregate readiness score over the three analyses
    #[serde(rename = "organizerScoring")]
    OrganizerScoring,

    /// Conversational planning assistant
    #[serde(rename = "aiAssistant")]
    AiAssistant,
}

impl AgentKind {
    /// Every valid kind, in dispatch order.
    pub const ALL: [AgentKind; 5] = [
        AgentKind::Weather,
        AgentKind::CurrentEvents,
        AgentKind::HistoricEvents,
        AgentKind::OrganizerScoring,
        AgentKind::AiAssistant,
    ];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Weather => "weather",
            AgentKind::CurrentEvents => "currentEvents",
            AgentKind::HistoricEvents => "historicEvents",
            AgentKind::OrganizerScoring => "organizerScoring",
            AgentKind::AiAssistant => "aiAssistant",
        }
    }

    /// Comma-separated list of valid wire names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weather" => Ok(AgentKind::Weather),
            "currentEvents" => Ok(AgentKind::CurrentEvents),
            "historicEvents" => Ok(AgentKind::HistoricEvents),
            "organizerScoring" => Ok(AgentKind::OrganizerScoring),
            "aiAssistant" => Ok(AgentKind::AiAssistant),
            other => Err(AgentError::UnknownAgentKind(other.to_string())),
        }
    }
}

/// Payload for an organizer-scoring invocation.
///
/// The three upstream analyses must already be available; the dispatcher
/// never sequences dependent calls itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPayload {
    /// The event being scored
    pub event: EventRequest,

    /// Output of the weather agent
    pub weather_analysis: String,

    /// Output of the current-events agent
    pub current_events_analysis: String,

    /// Output of the historic-events agent
    pub historical_analysis: String,
}

/// Payload for an assistant chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    /// The organizer's message
    pub message: String,

    /// Event the conversation is about, when one has been submitted
    #[serde(default)]
    pub event_context: Option<EventRequest>,
}

/// Per-kind payload union, statically keyed by [`AgentKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentPayload {
    /// The three independent analyses take the raw event
    Event(EventRequest),
    /// Scoring takes the event plus the three upstream analyses
    Scoring(ScoringPayload),
    /// The assistant takes a chat turn
    Chat(ChatPayload),
}

impl AgentPayload {
    /// Decode a wire payload according to the agent kind it is addressed to.
    pub fn from_value(kind: AgentKind, value: serde_json::Value) -> Result<Self, AgentError> {
        let decoded = match kind {
            AgentKind::Weather | AgentKind::CurrentEvents | AgentKind::HistoricEvents => {
                serde_json::from_value::<EventRequest>(value).map(AgentPayload::Event)
            }
            AgentKind::OrganizerScoring => {
                serde_json::from_value::<ScoringPayload>(value).map(AgentPayload::Scoring)
            }
            AgentKind::AiAssistant => {
                serde_json::from_value::<ChatPayload>(value).map(AgentPayload::Chat)
            }
        };
        decoded.map_err(|e| {
            AgentError::Validation(format!("malformed payload for agent '{kind}': {e}"))
        })
    }

    /// The event record carried by this payload, if any.
    pub fn event(&self) -> Option<&EventRequest> {
        match self {
            AgentPayload::Event(event) => Some(event),
            AgentPayload::Scoring(scoring) => Some(&scoring.event),
            AgentPayload::Chat(chat) => chat.event_context.as_ref(),
        }
    }
}

/// One dispatch call. Created per request, never retained.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    /// Which agent to run
    pub kind: AgentKind,

    /// Kind-specific payload
    pub payload: AgentPayload,

    /// Correlation id for log linkage
    pub correlation_id: Option<Ulid>,
}

impl AgentInvocation {
    /// Create an invocation with a fresh correlation id.
    pub fn new(kind: AgentKind, payload: AgentPayload) -> Self {
        Self {
            kind,
            payload,
            correlation_id: Some(Ulid::new()),
        }
    }
}

/// What an agent returns.
///
/// The prose agents (weather, historic, scoring, assistant) return text
/// plus a metadata map; current-events returns the full structured shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentResult {
    /// Prose analysis
    Text {
        /// The rendered analysis text
        content: String,
        /// Data source, fallback flags, timing
        metadata: HashMap<String, String>,
    },
    /// Structured analysis
    Structured(NormalizedAgentResponse),
}

impl AgentResult {
    /// Metadata attached to the result, whichever variant it is.
    pub fn metadata(&self) -> &HashMap<String, String> {
        match self {
            AgentResult::Text { metadata, .. } => metadata,
            AgentResult::Structured(response) => &response.metadata,
        }
    }

    /// Whether this result was produced in fallback mode.
    pub fn is_fallback(&self) -> bool {
        self.metadata().get("fallback_mode").map(String::as_str) == Some("true")
    }

    /// Wire representation: prose results serialize to a bare string,
    /// structured results to the full response object.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            AgentResult::Text { content, .. } => serde_json::Value::String(content.clone()),
            AgentResult::Structured(response) => {
                serde_json::to_value(response).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_round_trips_through_wire_name() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_a_client_error() {
        let err = AgentKind::from_str("astrology").unwrap_err();
        assert!(matches!(err, AgentError::UnknownAgentKind(_)));
    }

    #[test]
    fn test_payload_decoding_is_keyed_by_kind() {
        let event = serde_json::json!({
            "eventType": "fundraiser",
            "location": "Chicago",
            "date": "2026-09-01",
            "duration": "3 hours",
            "expectedAttendance": 120,
            "budget": 8000.0
        });
        let payload = AgentPayload::from_value(AgentKind::Weather, event.clone()).unwrap();
        assert!(matches!(payload, AgentPayload::Event(_)));

        // The same object is not a valid scoring payload.
        let err = AgentPayload::from_value(AgentKind::OrganizerScoring, event).unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_chat_payload_event_context_is_optional() {
        let payload = AgentPayload::from_value(
            AgentKind::AiAssistant,
            serde_json::json!({ "message": "how do I pick a venue?" }),
        )
        .unwrap();
        assert!(payload.event().is_none());
    }

    #[test]
    fn test_text_result_serializes_to_bare_string() {
        let result = AgentResult::Text {
            content: "clear skies".to_string(),
            metadata: HashMap::new(),
        };
        assert_eq!(result.to_wire(), serde_json::json!("clear skies"));
    }
}
