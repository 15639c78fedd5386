//! Planwise HTTP surface.
//!
//! A small axum app: `POST /api/dispatch` routes agent invocations,
//! `GET /api/health` probes the configured upstreams. Results are not
//! persisted; the optional correlation fields are logged only.

mod health;
mod http;

pub use health::{aggregate_status, check_health, HealthReport, HealthStatus};
pub use http::{build_router, AppState};
