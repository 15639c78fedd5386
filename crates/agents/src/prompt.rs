//! Prompt assembly per agent kind.
//!
//! Pure string building: the same context always produces the same
//! prompt, so prompt changes are testable by comparison. The word-limit
//! line is advisory to the model; actual enforcement happens in the
//! normalizer's truncation step.

use planwise_core::{AgentKind, EventRequest, MAX_FIELD_WORDS};

/// Inputs available to a prompt template: the event plus whatever
/// upstream analyses the caller has already collected.
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    /// The event under analysis
    pub event: Option<&'a EventRequest>,
    /// Weather agent output, for the scoring prompt
    pub weather_analysis: Option<&'a str>,
    /// Current-events agent output, for the scoring prompt
    pub current_events_analysis: Option<&'a str>,
    /// Historic-events agent output, for the scoring prompt
    pub historical_analysis: Option<&'a str>,
    /// Organizer's chat message, for the assistant prompt
    pub message: Option<&'a str>,
}

impl<'a> PromptContext<'a> {
    /// Context holding just the event.
    pub fn for_event(event: &'a EventRequest) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }
}

/// Assemble the prompt for an agent kind. Deterministic, no I/O.
pub fn build_prompt(kind: AgentKind, context: &PromptContext<'_>) -> String {
    let mut prompt = String::new();
    match kind {
        AgentKind::Weather => {
            prompt.push_str(
                "You are a weather analyst advising a charity event organizer.\n\
                 Analysis focus:\n\
                 - outdoor suitability for the planned date\n\
                 - temperature, precipitation, and wind risks\n\
                 - contingency suggestions\n",
            );
            push_event_block(&mut prompt, context);
            prompt.push_str("Respond in short prose with a clear verdict first.\n");
        }
        AgentKind::CurrentEvents => {
            prompt.push_str(
                "You are a local-events researcher advising a charity event organizer.\n\
                 Analysis focus:\n\
                 - competing events near the location on or around the date\n\
                 - news or trends affecting attendance\n\
                 - timing opportunities\n",
            );
            push_event_block(&mut prompt, context);
            prompt.push_str(
                "Respond with a single JSON object with these fields:\n\
                 {\"summary\": string, \"findings\": [string], \"recommendations\": [string],\n\
                  \"risks\": [string], \"opportunities\": [string], \"confidenceScore\": 0-100}\n",
            );
        }
        AgentKind::HistoricEvents => {
            prompt.push_str(
                "You are a researcher of comparable past events advising a charity event organizer.\n\
                 Analysis focus:\n\
                 - similar events held in or near the location\n\
                 - their attendance and budget outcomes\n\
                 - lessons that transfer to this event\n",
            );
            push_event_block(&mut prompt, context);
            prompt.push_str("Respond in short prose, most relevant precedent first.\n");
        }
        AgentKind::OrganizerScoring => {
            prompt.push_str(
                "You are an event readiness assessor. Combine the three analyses below\n\
                 into one overall readiness score (0-100) with justification,\n\
                 top recommendations, and top risks.\n",
            );
            push_event_block(&mut prompt, context);
            push_section(&mut prompt, "Weather analysis", context.weather_analysis);
            push_section(
                &mut prompt,
                "Current events analysis",
                context.current_events_analysis,
            );
            push_section(&mut prompt, "Historical analysis", context.historical_analysis);
        }
        AgentKind::AiAssistant => {
            prompt.push_str(
                "You are a friendly planning assistant for charity event organizers.\n\
                 Answer the organizer's question practically and concretely.\n",
            );
            push_event_block(&mut prompt, context);
            if let Some(message) = context.message {
                prompt.push_str("Organizer's message:\n");
                prompt.push_str(message);
                prompt.push('\n');
            }
        }
    }
    prompt.push_str(&format!(
        "Keep the response under {MAX_FIELD_WORDS} words.\n"
    ));
    prompt
}

fn push_event_block(prompt: &mut String, context: &PromptContext<'_>) {
    let Some(event) = context.event else {
        return;
    };
    prompt.push_str(&format!(
        "Event details:\n\
         - type: {}\n\
         - location: {}\n\
         - date: {}\n\
         - duration: {}\n\
         - expected attendance: {}\n\
         - budget: {:.2}\n",
        event.event_type,
        event.location,
        event.date,
        event.duration,
        event.expected_attendance,
        event.budget,
    ));
    if !event.audience.trim().is_empty() {
        prompt.push_str(&format!("- audience: {}\n", event.audience));
    }
    if !event.special_requirements.trim().is_empty() {
        prompt.push_str(&format!(
            "- special requirements: {}\n",
            event.special_requirements
        ));
    }
}

fn push_section(prompt: &mut String, title: &str, body: Option<&str>) {
    if let Some(body) = body {
        prompt.push_str(&format!("{title}:\n{body}\n"));
    }
}
