//! Session state carried across conversation turns
//!
//! `SessionData` is the single mutable aggregate threaded through every
//! turn. It is caller-owned: the engine takes it by reference, mutates
//! it, and never retains it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::Turn;
use crate::error::{Error, Result};

/// Top-level conversation lifecycle phase.
///
/// Progression is monotonic in the fixed ordering
/// `Orient < Discovery < Intake < Scheduling < Confirmed`; the router
/// rejects any transition that would decrease the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// One-shot introduction at first contact
    #[default]
    Orient,
    /// Open diagnostic exchanges, completion-assisted, capped at 3 turns
    Discovery,
    /// Consent-gated structured field collection
    Intake,
    /// Slot presentation and selection
    Scheduling,
    /// Terminal: consultation booked, no further business logic runs
    Confirmed,
}

impl Phase {
    /// Position in the fixed phase ordering
    pub fn index(&self) -> usize {
        match self {
            Phase::Orient => 0,
            Phase::Discovery => 1,
            Phase::Intake => 2,
            Phase::Scheduling => 3,
            Phase::Confirmed => 4,
        }
    }

    /// Whether moving to `next` preserves monotonicity
    pub fn can_advance_to(&self, next: Phase) -> bool {
        next.index() >= self.index()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Orient => "orient",
            Phase::Discovery => "discovery",
            Phase::Intake => "intake",
            Phase::Scheduling => "scheduling",
            Phase::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse routing split: diagnostic turns go to the completion-assist
/// layer, intake turns go to the golden frame machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Diagnostic,
    Intake,
}

/// Intake sub-machine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeMode {
    /// Pre-consent qualification chat
    #[default]
    Qualification,
    /// Structured field collection in progress
    IntakeActive,
    /// Collection deferred at the user's request
    IntakePaused,
}

/// Explicit user consent state for structured collection.
///
/// Consent is never inferred: ambiguous replies keep `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consent {
    Pending,
    Confirmed,
    Declined,
}

/// Fields collected during structured intake, in plan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FullLegalName,
    PreferredName,
    Email,
    Phone,
    BusinessType,
    BusinessGoal,
}

impl FieldId {
    /// Whether this is one of the name fields handled by the name frame
    pub fn is_name_field(&self) -> bool {
        matches!(self, FieldId::FullLegalName | FieldId::PreferredName)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::FullLegalName => "full_legal_name",
            FieldId::PreferredName => "preferred_name",
            FieldId::Email => "email",
            FieldId::Phone => "phone",
            FieldId::BusinessType => "business_type",
            FieldId::BusinessGoal => "business_goal",
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection status per field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    Unasked,
    InProgress,
    Completed,
    Skipped,
}

/// Nested state for the consent-gated field-collection machine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntakeState {
    pub mode: IntakeMode,
    /// Field currently being collected. Invariant: `IntakeActive`
    /// implies this is set, except in the single turn immediately after
    /// consent confirmation (the name frame sets it right away).
    pub current_field: Option<FieldId>,
    /// Per-field collection status
    #[serde(default)]
    pub field_status: HashMap<FieldId, FieldStatus>,
    /// Collected field values
    #[serde(default)]
    pub fields: HashMap<FieldId, String>,
    /// Consent sub-dialogue state; `None` until the transition frame runs
    pub user_consent: Option<Consent>,
    /// When consent was confirmed and collection became active
    pub transition_at: Option<DateTime<Utc>>,
}

impl IntakeState {
    /// Reset to the pre-consent baseline. Used for rollback after a
    /// frame contract violation or detected state corruption.
    pub fn rollback(&mut self) {
        self.mode = IntakeMode::Qualification;
        self.current_field = None;
        self.user_consent = None;
    }

    pub fn set_status(&mut self, field: FieldId, status: FieldStatus) {
        self.field_status.insert(field, status);
    }

    pub fn status(&self, field: FieldId) -> FieldStatus {
        self.field_status.get(&field).copied().unwrap_or_default()
    }

    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) {
        self.fields.insert(field, value.into());
        self.set_status(field, FieldStatus::Completed);
    }

    /// Verify the "active implies field set" invariant.
    ///
    /// `transition_window` is true only for the single step right after
    /// consent confirmation, where `current_field` is legitimately unset.
    pub fn check_invariant(&self, transition_window: bool) -> Result<()> {
        if self.mode == IntakeMode::IntakeActive
            && self.current_field.is_none()
            && !transition_window
        {
            return Err(Error::StateCorruption(
                "intake active with no current field".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduling fields collected for the consultation hand-off
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Consultation {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub business_type: Option<String>,
    pub business_goal: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub scheduled_slot: Option<TimeSlot>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// An offered consultation slot.
///
/// Slots are generated fresh per scheduling request and numbered
/// 1-based for ordinal selection; they are not persisted entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// ISO date, e.g. "2026-08-24"
    pub date: String,
    /// 24h time, e.g. "13:00"
    pub time: String,
    /// Human-readable label shown in the slot list
    pub display: String,
}

/// The mutable conversation state threaded through every turn
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionData {
    pub phase: Phase,
    pub mode: Mode,
    /// Completion-assisted diagnostic turns taken so far; once this
    /// reaches the discovery cap the phase must leave `Discovery`.
    pub discovery_turns: u32,
    /// Question-and-answer exchanges completed in diagnostic mode
    pub qa_exchanges: u32,
    pub intake: IntakeState,
    pub consultation: Consultation,
    /// Append-only transcript
    pub history: Vec<Turn>,

    // Qualification-flow scalars
    pub business_type: Option<String>,
    pub is_operating: Option<bool>,
    pub has_partners: Option<bool>,
    pub location: Option<String>,
    pub multi_state: Option<bool>,
    pub licensing: Option<String>,
    pub mission_driven: Option<bool>,
    pub intent: Option<String>,
    /// Page the visitor started the conversation from, e.g. "/pricing"
    pub source_page: Option<String>,
    /// Slots offered during scheduling; selection parses against these
    #[serde(default)]
    pub offered_slots: Vec<TimeSlot>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub escalation_reason: Option<String>,

    /// Set exactly once when the orient intro fires
    pub orient_completed: bool,
    /// Set exactly once by the bootstrap frame; guards re-greeting
    pub bootstrap_completed: bool,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn to the transcript
    pub fn push_user(&mut self, message: impl Into<String>) {
        self.history.push(Turn::user(message));
    }

    /// Append a bot turn to the transcript
    pub fn push_bot(&mut self, message: impl Into<String>) {
        self.history.push(Turn::bot(message));
    }

    /// Plain-text user messages, oldest first. Used by lead scoring.
    pub fn user_messages(&self) -> Vec<&str> {
        self.history
            .iter()
            .filter(|t| t.role == crate::conversation::TurnRole::User)
            .map(|t| t.message.as_str())
            .collect()
    }
}
