//! HTTP endpoints: dispatch and health.

use crate::health::{check_health, HealthStatus};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use planwise_agents::Dispatcher;
use planwise_core::{AgentConfig, AgentError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Shared request state: the dispatcher plus the read-only configuration.
pub struct AppState {
    /// Agent router
    pub dispatcher: Dispatcher,
    /// Read-once configuration, used by health probes
    pub config: AgentConfig,
}

impl AppState {
    /// Build the state from configuration.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(&config),
            config,
        }
    }
}

/// Wire shape of a dispatch request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchRequest {
    agent: String,
    payload: Value,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

/// Build the router. Non-POST verbs on the dispatch route get 405 from
/// the method router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/dispatch", post(dispatch))
        .route("/api/health", get(health))
        .with_state(state)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> impl IntoResponse {
    info!(
        agent = %request.agent,
        event_id = ?request.event_id,
        user_id = ?request.user_id,
        "dispatch request received"
    );

    match state
        .dispatcher
        .dispatch(&request.agent, request.payload)
        .await
    {
        Ok(result) => {
            let body = json!({
                "success": true,
                "agent": request.agent,
                "result": result.to_wire(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            });
            (StatusCode::OK, Json(body))
        }
        Err(err) => error_envelope(&err),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = check_health(&state.config).await;
    let status_code = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = json!({
        "status": report.status,
        "components": report.components,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (status_code, Json(body))
}

/// Map an agent error to its wire envelope.
fn error_envelope(err: &AgentError) -> (StatusCode, Json<Value>) {
    let (status, label, message) = match err {
        AgentError::Validation(detail) => {
            (StatusCode::BAD_REQUEST, "validation_error", detail.clone())
        }
        AgentError::UnknownAgentKind(name) => (
            StatusCode::BAD_REQUEST,
            "unknown_agent",
            format!(
                "unknown agent '{name}'; valid agents: {}",
                planwise_core::AgentKind::valid_names()
            ),
        ),
        AgentError::UpstreamAuth(detail) => (
            StatusCode::BAD_GATEWAY,
            "upstream_auth_error",
            format!("upstream credentials rejected; check server configuration ({detail})"),
        ),
        AgentError::UpstreamTransport(detail) | AgentError::Parse(detail) => {
            // These should have degraded into fallback output upstream.
            error!(error = %err, "unexpected hard failure surfaced from an agent");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                detail.clone(),
            )
        }
    };
    let body = json!({
        "error": label,
        "message": message,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (status, Json(body))
}
