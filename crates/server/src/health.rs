//! Upstream health probing.
//!
//! Each configured upstream gets a lightweight call with a short
//! timeout. An upstream without a key reports degraded (the agent works,
//! in fallback mode), not unhealthy. Probing never mutates state.

use planwise_client::{HttpClient, LlmClient, RetryConfig, WeatherClient};
use planwise_core::AgentConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health of one upstream, or of the service as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Upstream reachable and responding
    Healthy,
    /// Not configured; agents degrade to fallback output
    Degraded,
    /// Configured but unreachable
    Unhealthy,
}

/// Per-upstream statuses plus the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status: worst of the components
    pub status: HealthStatus,
    /// Status per upstream dependency
    pub components: BTreeMap<String, HealthStatus>,
}

/// Worst-of aggregation: any unhealthy component wins, then degraded.
pub fn aggregate_status<'a>(statuses: impl IntoIterator<Item = &'a HealthStatus>) -> HealthStatus {
    let mut aggregate = HealthStatus::Healthy;
    for status in statuses {
        match status {
            HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
            HealthStatus::Degraded => aggregate = HealthStatus::Degraded,
            HealthStatus::Healthy => {}
        }
    }
    aggregate
}

/// Probe every upstream the configuration names.
pub async fn check_health(config: &AgentConfig) -> HealthReport {
    let http = HttpClient::new(RetryConfig {
        max_attempts: 1,
        ..RetryConfig::default()
    });

    let llm_status = match LlmClient::from_config(config, http.clone()) {
        None => HealthStatus::Degraded,
        Some(client) => {
            if client.probe().await {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            }
        }
    };
    let weather_status = match WeatherClient::from_config(config, http) {
        None => HealthStatus::Degraded,
        Some(client) => {
            if client.probe().await {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            }
        }
    };

    let mut components = BTreeMap::new();
    components.insert("llm".to_string(), llm_status);
    components.insert("weather".to_string(), weather_status);

    HealthReport {
        status: aggregate_status(components.values()),
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_prefers_worst_status() {
        use HealthStatus::*;
        assert_eq!(aggregate_status([&Healthy, &Healthy]), Healthy);
        assert_eq!(aggregate_status([&Healthy, &Degraded]), Degraded);
        assert_eq!(aggregate_status([&Degraded, &Unhealthy]), Unhealthy);
        assert_eq!(aggregate_status([]), Healthy);
    }

    #[tokio::test]
    async fn test_unconfigured_upstreams_report_degraded_without_network() {
        let report = check_health(&AgentConfig::default()).await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(
            report.components.get("llm"),
            Some(&HealthStatus::Degraded)
        );
        assert_eq!(
            report.components.get("weather"),
            Some(&HealthStatus::Degraded)
        );
    }
}
