//! Error types shared across the engine
//!
//! The taxonomy mirrors how failures are handled at runtime:
//! - `StateCorruption` and `FrameContract` are fatal for the turn; the
//!   caller rolls intake state back and re-raises.
//! - `Validation` failures are local re-prompts, never raised.
//! - `External` and `BudgetExhausted` select the deterministic fallback
//!   path and are only logged.

use thiserror::Error;

/// Result alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Session state violates an internal invariant (e.g. active intake
    /// with no current field outside the consent-transition window).
    #[error("state corruption: {0}")]
    StateCorruption(String),

    /// A golden frame was executed with its preconditions unmet. This
    /// indicates a routing bug, not a user-input problem.
    #[error("frame contract violation: {0}")]
    FrameContract(String),

    /// User input failed a validator. Recoverable; carries the re-prompt.
    #[error("validation failed: {0}")]
    Validation(String),

    /// External collaborator (completion service, persistence) failed.
    #[error("external service error: {0}")]
    External(String),

    /// The monthly completion budget is exhausted. A policy stop, not a
    /// fault; logged distinctly from `External`.
    #[error("completion budget exhausted")]
    BudgetExhausted,

    /// Malformed request at the boundary.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Whether this error is recoverable by falling back to the
    /// deterministic response path.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::External(_) | Error::BudgetExhausted
        )
    }
}
