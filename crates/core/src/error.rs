//! Error taxonomy for the analysis pipeline.
//!
//! Only `Validation` and `UnknownAgentKind` surface as user-facing
//! failures. Transport errors convert to fallback output after retries,
//! auth errors surface as a configuration problem, and parse errors are
//! absorbed inside normalization.

use thiserror::Error;

/// Everything that can go wrong between dispatch and response.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Required payload fields are missing or malformed. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested agent kind is not in the fixed enumeration.
    #[error("unknown agent kind '{0}'")]
    UnknownAgentKind(String),

    /// Network failure, timeout, 5xx, or 429 from an upstream API,
    /// after the retry budget is exhausted.
    #[error("upstream transport failure: {0}")]
    UpstreamTransport(String),

    /// 401/403 from an upstream API. Retrying cannot fix a bad key.
    #[error("upstream rejected credentials: {0}")]
    UpstreamAuth(String),

    /// Malformed model output. Absorbed by the normalizer, never
    /// surfaced to a caller.
    #[error("unparseable model output: {0}")]
    Parse(String),
}

impl AgentError {
    /// Whether this error should be reported to the caller as their
    /// mistake (a 400-class response) rather than a degraded analysis.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AgentError::Validation(_) | AgentError::UnknownAgentKind(_)
        )
    }
}
