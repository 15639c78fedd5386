//! Fan-out/fan-in over the three independent analyses, then scoring.
//!
//! The three analyses always launch concurrently and are awaited jointly;
//! a failure in one never aborts the others. Scoring runs only after all
//! three settle, fed whatever each produced (real, fallback, or an error
//! note).

use crate::dispatch::Dispatcher;
use planwise_core::{
    AgentError, AgentKind, AgentPayload, AgentResult, EventRequest, ScoringPayload,
};
use std::collections::HashMap;
use tracing::{info, warn};

/// All four results for one event.
#[derive(Debug, Clone)]
pub struct FullAnalysis {
    /// Weather agent result
    pub weather: AgentResult,
    /// Current-events agent result
    pub current_events: AgentResult,
    /// Historic-events agent result
    pub historical: AgentResult,
    /// Organizer-scoring agent result
    pub scoring: AgentResult,
}

/// Flatten a result to the text handed to the scoring prompt.
fn rendered_text(result: &AgentResult) -> String {
    match result {
        AgentResult::Text { content, .. } => content.clone(),
        AgentResult::Structured(response) => {
            let mut text = response.summary.clone();
            for (title, items) in [
                ("Findings", &response.findings),
                ("Recommendations", &response.recommendations),
                ("Risks", &response.risks),
                ("Opportunities", &response.opportunities),
            ] {
                if !items.is_empty() {
                    text.push_str(&format!("\n{title}:\n"));
                    for item in items {
                        text.push_str(&format!("- {item}\n"));
                    }
                }
            }
            text
        }
    }
}

/// Convert a per-call failure into a degraded result so the fan-in
/// always completes.
fn settle(kind: AgentKind, outcome: Result<AgentResult, AgentError>) -> AgentResult {
    match outcome {
        Ok(result) => result,
        Err(err) => {
            warn!(agent = %kind, error = %err, "analysis failed, substituting placeholder");
            let mut metadata = HashMap::new();
            metadata.insert("fallback_mode".to_string(), "true".to_string());
            metadata.insert("error".to_string(), err.to_string());
            AgentResult::Text {
                content: format!("{kind} analysis unavailable: {err}"),
                metadata,
            }
        }
    }
}

/// Run the full pipeline for one event: three concurrent analyses, then
/// scoring over their combined output.
///
/// Only validation of the event itself can fail; every downstream
/// failure degrades into the corresponding result.
pub async fn run_full_analysis(
    dispatcher: &Dispatcher,
    event: &EventRequest,
) -> Result<FullAnalysis, AgentError> {
    event.validate()?;
    info!(location = %event.location, date = %event.date, "running full analysis fan-out");

    let (weather, current_events, historical) = tokio::join!(
        dispatcher.run(AgentKind::Weather, AgentPayload::Event(event.clone())),
        dispatcher.run(AgentKind::CurrentEvents, AgentPayload::Event(event.clone())),
        dispatcher.run(AgentKind::HistoricEvents, AgentPayload::Event(event.clone())),
    );

    let weather = settle(AgentKind::Weather, weather);
    let current_events = settle(AgentKind::CurrentEvents, current_events);
    let historical = settle(AgentKind::HistoricEvents, historical);

    let scoring_payload = ScoringPayload {
        event: event.clone(),
        weather_analysis: rendered_text(&weather),
        current_events_analysis: rendered_text(&current_events),
        historical_analysis: rendered_text(&historical),
    };
    let scoring = settle(
        AgentKind::OrganizerScoring,
        dispatcher
            .run(
                AgentKind::OrganizerScoring,
                AgentPayload::Scoring(scoring_payload),
            )
            .await,
    );

    Ok(FullAnalysis {
        weather,
        current_events,
        historical,
        scoring,
    })
}
