//! Planwise analysis agents.
//!
//! Five independent agents (weather, current events, historic events,
//! organizer scoring, assistant) behind a single dispatcher. Each agent
//! builds a prompt, calls its upstream API through the shared retry
//! client, and normalizes whatever comes back; when the API is missing or
//! failing, a deterministic fallback generator produces degraded output
//! instead of a hard failure.

mod assistant;
mod current_events;
mod dispatch;
mod fallback;
mod historic_events;
mod normalize;
mod orchestrator;
mod prompt;
mod scoring;
mod weather;

pub use dispatch::{Agent, Dispatcher};
pub use fallback::synthetic_snapshot;
pub use normalize::{normalize, truncate_to_word_limit};
pub use orchestrator::{run_full_analysis, FullAnalysis};
pub use prompt::{build_prompt, PromptContext};
pub use weather::{assess_weather, WeatherAssessment};

use std::collections::HashMap;
use std::time::Instant;

/// Metadata map attached to every prose agent result.
pub(crate) fn text_metadata(
    data_source: &str,
    fallback_mode: bool,
    started: Instant,
) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("data_source".to_string(), data_source.to_string());
    metadata.insert("fallback_mode".to_string(), fallback_mode.to_string());
    metadata.insert(
        "processing_ms".to_string(),
        started.elapsed().as_millis().to_string(),
    );
    metadata.insert("timestamp".to_string(), chrono::Utc::now().to_rfc3339());
    metadata
}
