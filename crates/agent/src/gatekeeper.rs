//! Escalation gatekeeping
//!
//! Decides when a conversation must be routed to human consultation.
//! Trigger lists are checked in a fixed order, first match wins.
//! Uncertainty only escalates after the conversation has some depth,
//! so a hesitant opening line doesn't bounce straight to a human.

use intake_agent_core::{Lexicon, SessionData};

/// Minimum history length before uncertainty language escalates
const UNCERTAINTY_MIN_HISTORY: usize = 5;

/// Why the conversation is being handed to a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationType {
    LicensedProfession,
    MultiState,
    TaxQuestion,
    Partnership,
    Uncertainty,
    ExistingBusiness,
    Funding,
    Nonprofit,
}

impl EscalationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationType::LicensedProfession => "LICENSED_PROFESSION",
            EscalationType::MultiState => "MULTI_STATE",
            EscalationType::TaxQuestion => "TAX_QUESTION",
            EscalationType::Partnership => "PARTNERSHIP",
            EscalationType::Uncertainty => "UNCERTAINTY",
            EscalationType::ExistingBusiness => "EXISTING_BUSINESS",
            EscalationType::Funding => "FUNDING",
            EscalationType::Nonprofit => "NONPROFIT",
        }
    }
}

/// Gatekeeper verdict
#[derive(Debug, Clone)]
pub struct EscalationDecision {
    pub should_escalate: bool,
    pub kind: Option<EscalationType>,
    pub reason: Option<String>,
}

impl EscalationDecision {
    fn none() -> Self {
        Self {
            should_escalate: false,
            kind: None,
            reason: None,
        }
    }

    fn escalate(kind: EscalationType, reason: impl Into<String>) -> Self {
        Self {
            should_escalate: true,
            kind: Some(kind),
            reason: Some(reason.into()),
        }
    }
}

/// Evaluate whether this turn forces a human hand-off.
///
/// Session flags (`has_partners`, `multi_state`) force escalation even
/// without fresh trigger language in the current input.
pub fn evaluate_escalation(input: &str, session: &SessionData) -> EscalationDecision {
    let lex = Lexicon::current();

    // Fixed check order; first match wins.
    if let Some(hit) = Lexicon::first_match(input, lex.licensed_professions) {
        return EscalationDecision::escalate(
            EscalationType::LicensedProfession,
            format!("licensed profession mentioned: {hit}"),
        );
    }
    if let Some(hit) = Lexicon::first_match(input, lex.multi_state_triggers) {
        return EscalationDecision::escalate(
            EscalationType::MultiState,
            format!("multi-state operation mentioned: {hit}"),
        );
    }
    if let Some(hit) = Lexicon::first_match(input, lex.tax_triggers) {
        return EscalationDecision::escalate(
            EscalationType::TaxQuestion,
            format!("tax question raised: {hit}"),
        );
    }
    if let Some(hit) = Lexicon::first_match(input, lex.partnership_triggers) {
        return EscalationDecision::escalate(
            EscalationType::Partnership,
            format!("partnership mentioned: {hit}"),
        );
    }
    if session.history.len() > UNCERTAINTY_MIN_HISTORY - 1 {
        if let Some(hit) = Lexicon::first_match(input, lex.uncertainty_triggers) {
            return EscalationDecision::escalate(
                EscalationType::Uncertainty,
                format!("persistent uncertainty: {hit}"),
            );
        }
    }
    if let Some(hit) = Lexicon::first_match(input, lex.existing_business_triggers) {
        return EscalationDecision::escalate(
            EscalationType::ExistingBusiness,
            format!("existing business mentioned: {hit}"),
        );
    }
    if let Some(hit) = Lexicon::first_match(input, lex.funding_triggers) {
        return EscalationDecision::escalate(
            EscalationType::Funding,
            format!("funding topic raised: {hit}"),
        );
    }
    if let Some(hit) = Lexicon::first_match(input, lex.nonprofit_triggers) {
        return EscalationDecision::escalate(
            EscalationType::Nonprofit,
            format!("nonprofit structure mentioned: {hit}"),
        );
    }

    // Flags persisted on the session force escalation on their own.
    if session.has_partners == Some(true) {
        return EscalationDecision::escalate(
            EscalationType::Partnership,
            "session flagged as having partners",
        );
    }
    if session.multi_state == Some(true) {
        return EscalationDecision::escalate(
            EscalationType::MultiState,
            "session flagged as multi-state",
        );
    }

    EscalationDecision::none()
}

/// "We have enough to hand off": true once at least 3 of
/// {business_type, location, has_partners defined, licensing} are
/// populated, regardless of explicit triggers.
pub fn should_auto_escalate(session: &SessionData) -> bool {
    let populated = [
        session.business_type.is_some(),
        session.location.is_some(),
        session.has_partners.is_some(),
        session.licensing.is_some(),
    ]
    .iter()
    .filter(|&&b| b)
    .count();

    populated >= 3
}
