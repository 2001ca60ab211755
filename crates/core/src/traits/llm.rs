//! Completion-service trait
//!
//! The engine only depends on this call contract: prompt in, text and
//! token usage out. Provider specifics (HTTP shape, auth, retries) live
//! behind the trait. Failures are recoverable by design — callers fall
//! back to the deterministic path, never propagate a provider error to
//! the end user.

use async_trait::async_trait;

use crate::error::Result;

/// Output of a single completion call
#[derive(Debug, Clone)]
pub struct CompletionOutput {
    /// Generated text
    pub text: String,
    /// Total tokens consumed (prompt + completion), for cost accounting
    pub tokens_used: u32,
}

/// An external completion service
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run one completion. `max_tokens` caps the output length.
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<CompletionOutput>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}
