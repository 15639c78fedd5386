//! Planwise upstream API clients.
//!
//! One retry policy wraps every outbound call; the LLM and weather
//! clients are thin consumers of it. Everything here is stateless across
//! invocations.

mod http;
mod llm;
mod retry;
mod weather;

pub use http::HttpClient;
pub use llm::LlmClient;
pub use retry::{AttemptDecision, AttemptOutcome, RetryAttempt, RetryConfig, RetryPolicy};
pub use weather::{WeatherClient, WeatherSnapshot};
