//! Event request model - what the organizer submits for analysis.

use crate::error::AgentError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Details of a charity or community event submitted for analysis.
///
/// Immutable once dispatched; every agent receives the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    /// Kind of event (fundraiser, gala, conference, ...)
    pub event_type: String,

    /// Where the event takes place
    pub location: String,

    /// Calendar date, "YYYY-MM-DD"
    pub date: String,

    /// How long the event runs (free text, e.g. "4 hours")
    pub duration: String,

    /// Expected headcount
    pub expected_attendance: u32,

    /// Planned budget in the organizer's currency
    pub budget: f64,

    /// Target audience
    #[serde(default)]
    pub audience: String,

    /// Accessibility or logistics requirements
    #[serde(default)]
    pub special_requirements: String,
}

impl EventRequest {
    /// Check the invariants required before any agent may run.
    ///
    /// Missing required fields are a caller error and are never retried
    /// or converted into fallback output.
    pub fn validate(&self) -> Result<(), AgentError> {
        let mut missing = Vec::new();
        if self.event_type.trim().is_empty() {
            missing.push("eventType");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if self.duration.trim().is_empty() {
            missing.push("duration");
        }
        if !missing.is_empty() {
            return Err(AgentError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        if self.expected_attendance == 0 {
            return Err(AgentError::Validation(
                "expectedAttendance must be greater than zero".to_string(),
            ));
        }
        if self.budget < 0.0 {
            return Err(AgentError::Validation(
                "budget must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Month of the event (1-12), if the date string parses.
    pub fn month(&self) -> Option<u32> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .ok()
            .map(|d| d.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventRequest {
        EventRequest {
            event_type: "charity gala".to_string(),
            location: "New York".to_string(),
            date: "2026-06-14".to_string(),
            duration: "4 hours".to_string(),
            expected_attendance: 250,
            budget: 15000.0,
            audience: "donors".to_string(),
            special_requirements: String::new(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_fields_by_name() {
        let mut req = sample();
        req.date = String::new();
        req.duration = "  ".to_string();
        let err = req.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("date"));
        assert!(msg.contains("duration"));
    }

    #[test]
    fn test_validate_rejects_zero_attendance() {
        let mut req = sample();
        req.expected_attendance = 0;
        assert!(matches!(
            req.validate(),
            Err(AgentError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_budget() {
        let mut req = sample();
        req.budget = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_month_parses_iso_date() {
        assert_eq!(sample().month(), Some(6));
    }

    #[test]
    fn test_month_tolerates_unparseable_date() {
        let mut req = sample();
        req.date = "next summer".to_string();
        assert!(req.validate().is_ok());
        assert_eq!(req.month(), None);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("eventType").is_some());
        assert!(json.get("expectedAttendance").is_some());
    }
}
