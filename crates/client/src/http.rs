//! HTTP client with retry, timeout, and status classification.

use crate::retry::{AttemptDecision, AttemptOutcome, RetryConfig, RetryPolicy};
use planwise_core::AgentError;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Which side of the retry policy a status falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    /// 2xx, or a 4xx the caller interprets; ends the loop with the response
    Settled,
    /// 5xx or 429
    Retryable,
    /// 401/403; retrying cannot fix a bad key
    AuthFailure,
}

fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        StatusClass::Retryable
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StatusClass::AuthFailure
    } else {
        StatusClass::Settled
    }
}

/// Shared HTTP client used by every upstream consumer.
///
/// Each attempt races the request against the per-attempt timeout; on
/// expiry the request is aborted and counted as retryable. 5xx and 429
/// retry, 401/403 fail fatally, any other 4xx is returned to the caller
/// to interpret.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Build a client with the given retry configuration.
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .user_agent(concat!("planwise/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            policy: RetryPolicy::new(retry),
        }
    }

    /// The underlying reqwest client, for building requests.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Retry configuration in effect.
    pub fn retry_config(&self) -> &RetryConfig {
        self.policy.config()
    }

    /// Send a request with the full retry policy. `make` is called once
    /// per attempt to rebuild the request.
    pub async fn execute_with_retry<F>(&self, mut make: F) -> Result<Response, AgentError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let timeout = self.policy.config().attempt_timeout;
        self.policy
            .run(|_attempt| {
                let request = make().timeout(timeout);
                async move {
                    match request.send().await {
                        Ok(response) => match classify_status(response.status()) {
                            StatusClass::Settled => AttemptDecision::Done(response),
                            StatusClass::Retryable => AttemptDecision::Retry {
                                outcome: AttemptOutcome::ServerError,
                                message: format!("HTTP {}", response.status()),
                            },
                            StatusClass::AuthFailure => {
                                AttemptDecision::Fatal(AgentError::UpstreamAuth(format!(
                                    "upstream returned HTTP {}",
                                    response.status()
                                )))
                            }
                        },
                        Err(err) if err.is_timeout() => AttemptDecision::Retry {
                            outcome: AttemptOutcome::Timeout,
                            message: format!("request timed out: {err}"),
                        },
                        Err(err) => AttemptDecision::Retry {
                            outcome: AttemptOutcome::Transport,
                            message: format!("transport failure: {err}"),
                        },
                    }
                }
            })
            .await
    }

    /// Single-attempt request with a short timeout, for health probes.
    pub async fn probe(&self, request: RequestBuilder) -> Result<StatusCode, AgentError> {
        let response = request
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map_err(|e| AgentError::UpstreamTransport(format!("probe failed: {e}")))?;
        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_plain_4xx_settle_immediately() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Settled);
        assert_eq!(classify_status(StatusCode::CREATED), StatusClass::Settled);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), StatusClass::Settled);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), StatusClass::Settled);
    }

    #[test]
    fn test_server_errors_and_rate_limits_retry() {
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            StatusClass::Retryable
        );
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), StatusClass::Retryable);
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            StatusClass::Retryable
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            StatusClass::Retryable
        );
    }

    #[test]
    fn test_auth_rejections_are_fatal() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            StatusClass::AuthFailure
        );
        assert_eq!(classify_status(StatusCode::FORBIDDEN), StatusClass::AuthFailure);
    }
}
