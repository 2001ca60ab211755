//! Conversation engine for the business-intake assistant
//!
//! Features:
//! - Phase-gated turn routing (orient → discovery → intake →
//!   scheduling → confirmed, monotonic)
//! - Consent-gated golden-frame field collection
//! - Rule-based intent detection and input validation
//! - Deterministic lead scoring and escalation gatekeeping
//! - Business-hours slot generation and ordinal selection

pub mod confidence;
pub mod frames;
pub mod gatekeeper;
pub mod intents;
pub mod router;
pub mod scheduling;
pub mod scoring;

pub use confidence::{score_confidence, ConfidenceTier};
pub use frames::{detect_frame, execute_frame, FrameId, FrameOutcome};
pub use gatekeeper::{evaluate_escalation, should_auto_escalate, EscalationDecision, EscalationType};
pub use intents::{
    detect_intent, extract_business_type, extract_location, is_negative_response,
    is_positive_response, validate_business_type, validate_location, validate_yes_no,
    RuleBasedClassifier, Validation, ValidationReason,
};
pub use router::{route_turn, RouterDeps, TurnMetadata, TurnOutcome};
pub use scheduling::{confirm_slot, generate_slots, parse_slot_selection, SlotSelection};
pub use scoring::{hotness_explanation, score_lead, LeadScore};

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Router error: {0}")]
    Router(String),

    #[error("Frame error: {0}")]
    Frame(String),

    #[error(transparent)]
    Core(#[from] intake_agent_core::Error),
}
