//! Core traits and types for the intake conversation engine
//!
//! This crate provides foundational types used across all other crates:
//! - Session state carried across conversation turns
//! - Conversation turn types
//! - The consolidated trigger-phrase lexicon
//! - Lead record types handed to downstream capture
//! - Core traits for pluggable backends (completion model, persistence)
//! - Error types

pub mod conversation;
pub mod error;
pub mod lead;
pub mod lexicon;
pub mod session;
pub mod traits;

pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
pub use lead::{Hotness, HotnessFactor, LeadRecord, SuggestedAction, UserIntent};
pub use lexicon::Lexicon;
pub use session::{
    Consent, Consultation, FieldId, FieldStatus, IntakeMode, IntakeState, Mode, Phase,
    SessionData, TimeSlot,
};
pub use traits::{CompletionModel, CompletionOutput, LeadSink};
