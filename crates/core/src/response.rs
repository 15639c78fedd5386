//! Normalized agent response - the fixed shape every analysis ends up in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display cap for each list field.
pub const MAX_LIST_ITEMS: usize = 8;

/// Display cap, in words, for each free-text field.
pub const MAX_FIELD_WORDS: usize = 250;

/// The fixed shape every agent response is coerced into.
///
/// However malformed the upstream output, normalization always yields a
/// well-formed value: `confidence_score` is always present and in range,
/// and `raw_text` retains the original output regardless of parse success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAgentResponse {
    /// One-paragraph summary
    pub summary: String,

    /// Key findings, display-capped
    #[serde(default)]
    pub findings: Vec<String>,

    /// Actionable recommendations
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Identified risks
    #[serde(default)]
    pub risks: Vec<String>,

    /// Identified opportunities
    #[serde(default)]
    pub opportunities: Vec<String>,

    /// Confidence in the analysis, 0-100
    pub confidence_score: u8,

    /// Open key-value map: data source, parsing method, timing, flags
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// The original unparsed model output
    #[serde(default)]
    pub raw_text: String,
}

impl NormalizedAgentResponse {
    /// Empty response scaffold with the given summary.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            findings: Vec::new(),
            recommendations: Vec::new(),
            risks: Vec::new(),
            opportunities: Vec::new(),
            confidence_score: 0,
            metadata: HashMap::new(),
            raw_text: String::new(),
        }
    }

    /// Clamp list lengths to the display cap.
    pub fn clamp_lists(&mut self) {
        self.findings.truncate(MAX_LIST_ITEMS);
        self.recommendations.truncate(MAX_LIST_ITEMS);
        self.risks.truncate(MAX_LIST_ITEMS);
        self.opportunities.truncate(MAX_LIST_ITEMS);
    }

    /// Set a metadata entry, returning self for chaining.
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Clamp an arbitrary integer confidence value into the 0-100 range.
pub fn clamp_confidence(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_confidence_bounds() {
        assert_eq!(clamp_confidence(-5), 0);
        assert_eq!(clamp_confidence(0), 0);
        assert_eq!(clamp_confidence(87), 87);
        assert_eq!(clamp_confidence(250), 100);
    }

    #[test]
    fn test_clamp_lists_enforces_display_cap() {
        let mut response = NormalizedAgentResponse::with_summary("s");
        response.findings = (0..20).map(|i| format!("finding {i}")).collect();
        response.clamp_lists();
        assert_eq!(response.findings.len(), MAX_LIST_ITEMS);
        assert_eq!(response.findings[0], "finding 0");
    }

    #[test]
    fn test_wire_shape_uses_camel_case() {
        let response = NormalizedAgentResponse::with_summary("s");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("confidenceScore").is_some());
        assert!(json.get("rawText").is_some());
    }
}
