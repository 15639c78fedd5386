//! Response normalization: raw model text to the fixed response shape.
//!
//! An ordered chain of parser strategies, first success wins:
//! strict JSON, recovered JSON (fenced block or first balanced object),
//! heuristic section extraction, and finally wrapping the raw text.
//! Whatever the input, the result is a well-formed response; this module
//! never returns an error and never panics.

use planwise_core::{
    clamp_confidence, AgentKind, NormalizedAgentResponse, MAX_FIELD_WORDS, MAX_LIST_ITEMS,
};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// Why a parser strategy did not produce a response.
#[derive(Debug)]
struct ParseFailure {
    reason: String,
}

impl ParseFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Confidence assigned when the model answered but structure had to be
/// recovered heuristically.
const HEURISTIC_CONFIDENCE: u8 = 70;

/// Confidence assigned when nothing structured could be recovered at all.
const WRAPPED_CONFIDENCE: u8 = 65;

/// Default confidence for structured responses that omit the field.
const DEFAULT_CONFIDENCE: u8 = 75;

/// Coerce raw model output into the fixed response shape.
///
/// `fallback_summary` is used when no summary can be recovered from the
/// text. The original text is always retained in `raw_text`.
pub fn normalize(
    kind: AgentKind,
    raw_text: &str,
    fallback_summary: &str,
) -> NormalizedAgentResponse {
    let (mut response, method) = match strict_parse(raw_text) {
        Ok(response) => (response, "strict_json"),
        Err(first) => match recovered_parse(raw_text) {
            Ok(response) => (response, "extracted_json"),
            Err(second) => {
                debug!(
                    agent = %kind,
                    strict = %first.reason,
                    recovered = %second.reason,
                    "no JSON recoverable, using heuristic extraction"
                );
                let heuristic = heuristic_parse(raw_text, fallback_summary);
                if heuristic.findings.is_empty() && heuristic.recommendations.is_empty() {
                    (wrap_raw(raw_text, fallback_summary), "fallback")
                } else {
                    (heuristic, "heuristic")
                }
            }
        },
    };

    response.summary = truncate_to_word_limit(&response.summary, MAX_FIELD_WORDS);
    for list in [
        &mut response.findings,
        &mut response.recommendations,
        &mut response.risks,
        &mut response.opportunities,
    ] {
        for item in list.iter_mut() {
            *item = truncate_to_word_limit(item, MAX_FIELD_WORDS);
        }
    }
    response.clamp_lists();
    response.raw_text = raw_text.to_string();
    response
        .metadata
        .insert("parsing_method".to_string(), method.to_string());
    response
        .metadata
        .insert("agent".to_string(), kind.as_str().to_string());
    response
}

/// Wire shape the model is asked to produce. Aliases accept both the
/// camelCase wire names and snake_case.
#[derive(Debug, Deserialize)]
struct StructuredPayload {
    summary: Option<String>,
    #[serde(default)]
    findings: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    risks: Vec<String>,
    #[serde(default)]
    opportunities: Vec<String>,
    #[serde(default, alias = "confidenceScore", alias = "confidence_score")]
    confidence: Option<i64>,
}

/// Strategy 1: the whole text is a JSON object of the expected shape.
fn strict_parse(raw_text: &str) -> Result<NormalizedAgentResponse, ParseFailure> {
    let payload: StructuredPayload = serde_json::from_str(raw_text.trim())
        .map_err(|e| ParseFailure::new(format!("not strict JSON: {e}")))?;
    structured_to_response(payload)
}

/// Strategy 2: recover a fenced ```json block or the first balanced
/// object and parse that.
fn recovered_parse(raw_text: &str) -> Result<NormalizedAgentResponse, ParseFailure> {
    let candidate = fenced_json(raw_text)
        .or_else(|| balanced_object(raw_text))
        .ok_or_else(|| ParseFailure::new("no JSON block found"))?;
    let payload: StructuredPayload = serde_json::from_str(candidate)
        .map_err(|e| ParseFailure::new(format!("recovered block is not valid JSON: {e}")))?;
    structured_to_response(payload)
}

fn structured_to_response(
    payload: StructuredPayload,
) -> Result<NormalizedAgentResponse, ParseFailure> {
    let summary = payload
        .summary
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ParseFailure::new("missing summary field"))?;
    if payload.findings.is_empty() && payload.recommendations.is_empty() {
        return Err(ParseFailure::new(
            "neither findings nor recommendations present",
        ));
    }
    let mut response = NormalizedAgentResponse::with_summary(summary);
    response.findings = payload.findings;
    response.recommendations = payload.recommendations;
    response.risks = payload.risks;
    response.opportunities = payload.opportunities;
    response.confidence_score = payload
        .confidence
        .map(clamp_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);
    Ok(response)
}

/// Extract the contents of the first ```json fenced block.
fn fenced_json(raw_text: &str) -> Option<&str> {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok()?;
    fence
        .captures(raw_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Find the first balanced `{...}` substring, respecting JSON string
/// literals and escapes.
fn balanced_object(raw_text: &str) -> Option<&str> {
    let start = raw_text.find('{')?;
    let bytes = raw_text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw_text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Which section a classified header opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Findings,
    Recommendations,
    Risks,
    Opportunities,
}

/// Strategy 3: split into lines, let header-like lines select the active
/// section, and collect bullet lines under it. The first free paragraph
/// becomes the summary.
fn heuristic_parse(raw_text: &str, fallback_summary: &str) -> NormalizedAgentResponse {
    let mut response = NormalizedAgentResponse::with_summary("");
    let mut active: Option<Section> = None;

    for line in raw_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // A bulleted line is always content, even when it is short and
        // mentions a section keyword.
        if let Some(item) = strip_bullet(trimmed) {
            let target = match active {
                Some(Section::Findings) | None => &mut response.findings,
                Some(Section::Recommendations) => &mut response.recommendations,
                Some(Section::Risks) => &mut response.risks,
                Some(Section::Opportunities) => &mut response.opportunities,
            };
            target.push(item.to_string());
            continue;
        }
        if let Some(section) = classify_header(trimmed) {
            active = Some(section);
            continue;
        }
        if response.summary.is_empty() && active.is_none() {
            response.summary = trimmed.to_string();
        }
    }

    if response.summary.is_empty() {
        response.summary = fallback_summary.to_string();
    }
    response.confidence_score = HEURISTIC_CONFIDENCE;
    response
}

/// Strategy 4: nothing recoverable; keep the whole text as one finding.
fn wrap_raw(raw_text: &str, fallback_summary: &str) -> NormalizedAgentResponse {
    let mut response = NormalizedAgentResponse::with_summary(fallback_summary);
    let trimmed = raw_text.trim();
    if !trimmed.is_empty() {
        response
            .findings
            .push(truncate_to_word_limit(trimmed, MAX_FIELD_WORDS));
    }
    response.confidence_score = WRAPPED_CONFIDENCE;
    response
}

/// A line is treated as a section header when it is short and header-like
/// and mentions a section keyword.
fn classify_header(line: &str) -> Option<Section> {
    let header_like = line.len() < 80
        && (line.ends_with(':')
            || line.starts_with('#')
            || line.starts_with("**")
            || line.split_whitespace().count() <= 4);
    if !header_like {
        return None;
    }
    let lower = line.to_lowercase();
    if lower.contains("finding") || lower.contains("insight") || lower.contains("observation") {
        Some(Section::Findings)
    } else if lower.contains("recommend") || lower.contains("suggest") {
        Some(Section::Recommendations)
    } else if lower.contains("risk") || lower.contains("concern") || lower.contains("challenge") {
        Some(Section::Risks)
    } else if lower.contains("opportunit") {
        Some(Section::Opportunities)
    } else {
        None
    }
}

/// Strip a bullet prefix (`-`, `*`, `•`, or `1.`/`1)`) from a line.
fn strip_bullet(line: &str) -> Option<&str> {
    for prefix in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    let numbered = Regex::new(r"^\d+[.)]\s+").ok()?;
    numbered.find(line).map(|m| line[m.end()..].trim())
}

/// Truncate text to at most `limit` words.
///
/// Prefers to cut at a sentence boundary within the last 20% of the
/// allowed length; otherwise hard-cuts and appends an ellipsis. The
/// result is always a prefix of the input (up to the ellipsis marker).
pub fn truncate_to_word_limit(text: &str, limit: usize) -> String {
    let mut words = 0usize;
    let mut end = 0usize;
    let mut in_word = false;
    let mut over_limit = false;

    for (index, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
        } else {
            if !in_word {
                words += 1;
                if words > limit {
                    over_limit = true;
                    break;
                }
                in_word = true;
            }
            end = index + ch.len_utf8();
        }
    }

    if !over_limit {
        return text.to_string();
    }

    let hard = &text[..end];
    let boundary_floor = hard.len().saturating_sub(hard.len() / 5);
    if let Some(position) = hard.rfind(&['.', '!', '?'][..]) {
        if position + 1 >= boundary_floor {
            return hard[..=position].to_string();
        }
    }
    format!("{}...", hard.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json_passes_through() {
        let raw = r#"{
            "summary": "quiet week",
            "findings": ["no competing events"],
            "recommendations": ["book the park early"],
            "risks": [],
            "opportunities": ["local press attention"],
            "confidenceScore": 88
        }"#;
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback");
        assert_eq!(response.summary, "quiet week");
        assert_eq!(response.findings, vec!["no competing events"]);
        assert_eq!(response.confidence_score, 88);
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("strict_json")
        );
        assert_eq!(response.raw_text, raw);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let raw = r#"{"summary": "s", "findings": ["f"], "confidenceScore": 400}"#;
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback");
        assert_eq!(response.confidence_score, 100);
    }

    #[test]
    fn test_fenced_json_is_recovered() {
        let raw = "Here is the analysis you asked for:\n```json\n{\"summary\": \"busy weekend\", \"findings\": [\"marathon on Saturday\"]}\n```\nLet me know if you need more.";
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback");
        assert_eq!(response.summary, "busy weekend");
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("extracted_json")
        );
    }

    #[test]
    fn test_embedded_object_is_recovered() {
        let raw = "Sure! {\"summary\": \"all clear\", \"recommendations\": [\"proceed\"]} hope that helps";
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback");
        assert_eq!(response.summary, "all clear");
        assert_eq!(response.recommendations, vec!["proceed"]);
    }

    #[test]
    fn test_balanced_scan_ignores_braces_in_strings() {
        let raw = r#"note {"summary": "has { brace }", "findings": ["a"]} tail"#;
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback");
        assert_eq!(response.summary, "has { brace }");
    }

    #[test]
    fn test_heuristic_sections_are_classified() {
        let raw = "The outlook is good overall.\n\n\
                   Findings:\n- sunny forecast\n- low winds\n\n\
                   Recommendations:\n* confirm the marquee\n\n\
                   Risks:\n• vendor cancellation\n\n\
                   Opportunities:\n1. partner with the farmers market\n";
        let response = normalize(AgentKind::HistoricEvents, raw, "fallback");
        assert_eq!(response.summary, "The outlook is good overall.");
        assert_eq!(response.findings, vec!["sunny forecast", "low winds"]);
        assert_eq!(response.recommendations, vec!["confirm the marquee"]);
        assert_eq!(response.risks, vec!["vendor cancellation"]);
        assert_eq!(
            response.opportunities,
            vec!["partner with the farmers market"]
        );
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("heuristic")
        );
    }

    #[test]
    fn test_short_bullet_mentioning_a_keyword_stays_content() {
        let raw = "Overall the plan looks sound.\n\n\
                   Findings:\n- weather risk\n- venue already booked";
        let response = normalize(AgentKind::HistoricEvents, raw, "fallback");
        assert_eq!(
            response.findings,
            vec!["weather risk", "venue already booked"]
        );
        assert!(response.risks.is_empty());
        assert_eq!(response.summary, "Overall the plan looks sound.");
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("heuristic")
        );
    }

    #[test]
    fn test_malformed_json_never_panics() {
        let raw = "Sure! Here's the analysis: {bad json";
        let response = normalize(AgentKind::CurrentEvents, raw, "fallback summary");
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("fallback")
        );
        assert_eq!(response.summary, "fallback summary");
        assert_eq!(response.raw_text, raw);
        assert!(response.confidence_score >= 60 && response.confidence_score <= 70);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "Findings:\n- one\n- two\nRecommendations:\n- three";
        let a = normalize(AgentKind::Weather, raw, "fb");
        let b = normalize(AgentKind::Weather, raw, "fb");
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip_through_strict_path() {
        let raw = r#"{"summary": "s", "findings": ["f1", "f2"], "recommendations": ["r1"], "confidenceScore": 80}"#;
        let first = normalize(AgentKind::CurrentEvents, raw, "fb");
        let serialized = serde_json::to_string(&first).unwrap();
        let second = normalize(AgentKind::CurrentEvents, &serialized, "fb");
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.recommendations, second.recommendations);
    }

    #[test]
    fn test_lists_are_capped() {
        let items: Vec<String> = (0..30).map(|i| format!("\"item {i}\"")).collect();
        let raw = format!(
            "{{\"summary\": \"s\", \"findings\": [{}]}}",
            items.join(", ")
        );
        let response = normalize(AgentKind::CurrentEvents, &raw, "fb");
        assert_eq!(response.findings.len(), MAX_LIST_ITEMS);
    }

    #[test]
    fn test_truncate_under_limit_is_identity() {
        let text = "a short sentence";
        assert_eq!(truncate_to_word_limit(text, 10), text);
    }

    #[test]
    fn test_truncate_bounds_word_count() {
        let text = "one two three four five six seven eight nine ten";
        let cut = truncate_to_word_limit(text, 4);
        assert!(cut.split_whitespace().count() <= 4);
        assert!(text.starts_with(cut.trim_end_matches("...")));
    }

    #[test]
    fn test_truncate_prefers_sentence_boundary() {
        // 10-word allowance; the period after word nine falls inside the
        // last 20% of the cut, so the cut lands there.
        let text = "one two three four five six seven eight nine. ten eleven twelve";
        let cut = truncate_to_word_limit(text, 10);
        assert_eq!(cut, "one two three four five six seven eight nine.");
    }

    #[test]
    fn test_truncate_hard_cut_appends_ellipsis() {
        let text = "alpha beta gamma delta epsilon zeta";
        let cut = truncate_to_word_limit(text, 3);
        assert_eq!(cut, "alpha beta gamma...");
    }

    #[test]
    fn test_truncate_is_prefix_of_input() {
        let text = "words repeated over and over again without punctuation at all";
        let cut = truncate_to_word_limit(text, 5);
        let stem = cut.trim_end_matches("...");
        assert!(text.starts_with(stem));
    }

    #[test]
    fn test_empty_input_wraps_cleanly() {
        let response = normalize(AgentKind::Weather, "", "nothing came back");
        assert_eq!(response.summary, "nothing came back");
        assert!(response.findings.is_empty());
        assert_eq!(
            response.metadata.get("parsing_method").map(String::as_str),
            Some("fallback")
        );
    }
}
