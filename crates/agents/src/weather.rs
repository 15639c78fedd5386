//! Weather agent: forecast suitability analysis for the event date.
//!
//! Real API data and the synthetic fallback snapshot flow through the
//! same assessment and rendering, so only the data source differs
//! between the two paths.

use crate::dispatch::Agent;
use crate::{fallback, normalize::truncate_to_word_limit, text_metadata};
use async_trait::async_trait;
use planwise_client::{WeatherClient, WeatherSnapshot};
use planwise_core::{
    clamp_confidence, AgentError, AgentInvocation, AgentKind, AgentPayload, AgentResult,
    EventRequest, MAX_FIELD_WORDS,
};
use std::time::Instant;
use tracing::{info, warn};

/// Suitability verdict derived from a weather snapshot.
#[derive(Debug, Clone)]
pub struct WeatherAssessment {
    /// 0-100 suitability score
    pub suitability: u8,
    /// Conditions that threaten the event
    pub risks: Vec<String>,
}

/// Score a snapshot against the event. Shared by the real and fallback
/// paths.
pub fn assess_weather(snapshot: &WeatherSnapshot, event: &EventRequest) -> WeatherAssessment {
    let mut score: i64 = 100;
    let mut risks = Vec::new();

    let temp = snapshot.temperature_c;
    if !(5.0..=32.0).contains(&temp) {
        score -= 30;
        risks.push(format!(
            "Temperature around {temp:.0}°C is outside the comfortable range for attendees."
        ));
    } else if !(10.0..=28.0).contains(&temp) {
        score -= 15;
        risks.push(format!(
            "Temperature around {temp:.0}°C may need shade or heating for a {} crowd.",
            event.expected_attendance
        ));
    }

    if snapshot.humidity > 80.0 {
        score -= 10;
        risks.push("High humidity will tire attendees quickly.".to_string());
    }

    if snapshot.wind_speed > 10.0 {
        score -= 20;
        risks.push("Strong wind endangers tents, banners, and staging.".to_string());
    }

    let conditions = snapshot.conditions.to_lowercase();
    if ["rain", "storm", "snow", "drizzle", "thunder"]
        .iter()
        .any(|w| conditions.contains(w))
    {
        score -= 25;
        risks.push(format!(
            "Forecast conditions ({}) call for a covered backup plan.",
            snapshot.conditions
        ));
    }

    WeatherAssessment {
        suitability: clamp_confidence(score),
        risks,
    }
}

/// Render the prose report from a snapshot and its assessment.
fn render_report(
    snapshot: &WeatherSnapshot,
    assessment: &WeatherAssessment,
    event: &EventRequest,
) -> String {
    let verdict = match assessment.suitability {
        80..=100 => "well suited",
        55..=79 => "workable with precautions",
        _ => "risky without a contingency plan",
    };

    let mut report = format!(
        "Weather outlook for the {} in {} on {}: {verdict} \
         (suitability {}/100).\n\n\
         Expected conditions: {}, around {:.0}°C, humidity {:.0}%, wind {:.0} m/s.\n",
        event.event_type,
        event.location,
        event.date,
        assessment.suitability,
        snapshot.conditions,
        snapshot.temperature_c,
        snapshot.humidity,
        snapshot.wind_speed,
    );

    if assessment.risks.is_empty() {
        report.push_str("No significant weather risks identified.\n");
    } else {
        report.push_str("Risks:\n");
        for risk in &assessment.risks {
            report.push_str(&format!("- {risk}\n"));
        }
    }
    truncate_to_word_limit(&report, MAX_FIELD_WORDS)
}

/// The weather analysis agent.
pub struct WeatherAgent {
    client: Option<WeatherClient>,
}

impl WeatherAgent {
    /// Create the agent; `None` means permanent fallback mode.
    pub fn new(client: Option<WeatherClient>) -> Self {
        Self { client }
    }

    fn fallback_result(&self, event: &EventRequest, started: Instant) -> AgentResult {
        let snapshot = fallback::synthetic_snapshot(event);
        let assessment = assess_weather(&snapshot, event);
        AgentResult::Text {
            content: render_report(&snapshot, &assessment, event),
            metadata: text_metadata("fallback_generator", true, started),
        }
    }
}

#[async_trait]
impl Agent for WeatherAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Weather
    }

    async fn run(&self, invocation: &AgentInvocation) -> Result<AgentResult, AgentError> {
        let AgentPayload::Event(event) = &invocation.payload else {
            return Err(AgentError::Validation(
                "weather agent requires an event payload".to_string(),
            ));
        };
        event.validate()?;
        let started = Instant::now();

        let Some(client) = &self.client else {
            info!(location = %event.location, "no weather API key, using fallback");
            return Ok(self.fallback_result(event, started));
        };

        match client.current(&event.location).await {
            Ok(snapshot) => {
                let assessment = assess_weather(&snapshot, event);
                Ok(AgentResult::Text {
                    content: render_report(&snapshot, &assessment, event),
                    metadata: text_metadata("openweathermap", false, started),
                })
            }
            Err(err @ AgentError::UpstreamAuth(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "weather API unavailable, using fallback");
                Ok(self.fallback_result(event, started))
            }
        }
    }
}
