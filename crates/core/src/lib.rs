//! Planwise core data models.
//!
//! This crate defines the value records that flow through the event
//! analysis pipeline: the submitted event, agent invocations, and the
//! normalized response shape every agent produces.

#![warn(missing_docs)]

mod agent;
mod config;
mod error;
mod event;
mod response;

pub use agent::{
    AgentInvocation, AgentKind, AgentPayload, AgentResult, ChatPayload, ScoringPayload,
};
pub use config::AgentConfig;
pub use error::AgentError;
pub use event::EventRequest;
pub use response::{clamp_confidence, NormalizedAgentResponse, MAX_FIELD_WORDS, MAX_LIST_ITEMS};
