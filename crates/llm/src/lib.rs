//! Completion-service integration
//!
//! Features:
//! - HTTP backend implementing the core `CompletionModel` trait
//! - Injected cost tracking with a hard monthly budget cap
//! - The assist layer: call gating, token caps, deterministic fallback

pub mod assist;
pub mod backend;
pub mod budget;

pub use assist::{AssistLayer, AssistOutcome, FallbackClassifier};
pub use backend::{HttpCompletionModel, MockCompletionModel};
pub use budget::{CostTracker, InMemoryCostTracker};

use thiserror::Error;

/// Completion-layer errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for intake_agent_core::Error {
    fn from(err: LlmError) -> Self {
        intake_agent_core::Error::External(err.to_string())
    }
}
