//! Golden frames: consent-gated structured field collection
//!
//! A frame is a named, numbered dialogue step and the only legitimate
//! source of bot output during structured intake. The detector inspects
//! the input and intake state and names the frame that applies;
//! returning `None` ("no frame applies") is distinct from a frame
//! failing. Frame preconditions are contracts: a violation rolls the
//! intake state back to qualification and re-raises.
//!
//! Frame numbering follows the intake script: 0 bootstrap, 61 the
//! qualification-to-intake consent transition, 62 name collection,
//! 63 the remaining field plan (contact, business type, goal).

use once_cell::sync::Lazy;
use regex::Regex;

use intake_agent_core::{
    Consent, Error, FieldId, FieldStatus, IntakeMode, Lexicon, Result, SessionData,
};

use crate::intents::{
    extract_business_type, is_negative_response, is_positive_response, validate_business_type,
};

/// The ordered collection plan walked after consent
const FIELD_PLAN: [FieldId; 6] = [
    FieldId::FullLegalName,
    FieldId::PreferredName,
    FieldId::Email,
    FieldId::Phone,
    FieldId::BusinessType,
    FieldId::BusinessGoal,
];

/// Named, numbered dialogue frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameId {
    /// Frame 0: one-shot session introduction
    Bootstrap,
    /// Frame 61: readiness-triggered consent sub-dialogue
    ConsentTransition,
    /// Frame 62: legal + preferred name collection
    NameCollection,
    /// Frame 63: remaining field plan after the name fields
    ContactCollection,
}

impl FrameId {
    pub fn number(&self) -> u32 {
        match self {
            FrameId::Bootstrap => 0,
            FrameId::ConsentTransition => 61,
            FrameId::NameCollection => 62,
            FrameId::ContactCollection => 63,
        }
    }
}

/// Result of executing a frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// Bot response for this turn
    pub response: String,
    /// True once every field in the plan is completed or skipped;
    /// the router moves to scheduling.
    pub intake_complete: bool,
}

impl FrameOutcome {
    fn reply(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            intake_complete: false,
        }
    }
}

/// Decide which frame (if any) applies to this input and state.
///
/// Priority order, first match wins. `None` means no frame applies and
/// the caller must fall back to standard routing — it must never invent
/// a frame response.
pub fn detect_frame(input: &str, session: &SessionData) -> Option<FrameId> {
    let lex = Lexicon::current();
    let intake = &session.intake;

    // 1. Bootstrap runs before anything else, even on empty input.
    if !session.bootstrap_completed {
        return Some(FrameId::Bootstrap);
    }

    // 2. Nothing to react to post-bootstrap.
    if input.trim().is_empty() {
        return None;
    }

    // 3. Mid-collection input routes to the field frame in progress.
    if intake.mode == IntakeMode::IntakeActive {
        if let Some(field) = intake.current_field {
            return Some(if field.is_name_field() {
                FrameId::NameCollection
            } else {
                FrameId::ContactCollection
            });
        }
    }

    // 4. Qualification (or paused intake): the consent dialogue. While
    //    consent is pending every input continues Frame 61; otherwise
    //    curiosity is explicitly rejected before readiness is checked.
    if matches!(
        intake.mode,
        IntakeMode::Qualification | IntakeMode::IntakePaused
    ) {
        if intake.user_consent == Some(Consent::Pending) {
            return Some(FrameId::ConsentTransition);
        }
        if Lexicon::matches_any(input, lex.curiosity_signals) {
            return None;
        }
        if Lexicon::matches_any(input, lex.readiness_signals) {
            return Some(FrameId::ConsentTransition);
        }
    }

    // 5. Active with consent but between fields: start the first field.
    if intake.mode == IntakeMode::IntakeActive
        && intake.user_consent == Some(Consent::Confirmed)
        && intake.current_field.is_none()
    {
        return Some(FrameId::NameCollection);
    }

    // 6. No frame applies.
    None
}

/// Execute a frame. Any contract violation rolls the intake state back
/// to qualification and re-raises; the caller surfaces it as a hard
/// error rather than swallowing it.
pub fn execute_frame(
    frame: FrameId,
    input: &str,
    session: &mut SessionData,
    agent_name: &str,
) -> Result<FrameOutcome> {
    let result = match frame {
        FrameId::Bootstrap => bootstrap(session, agent_name),
        FrameId::ConsentTransition => consent_transition(input, session),
        FrameId::NameCollection => name_collection(input, session),
        FrameId::ContactCollection => contact_collection(input, session),
    };

    if let Err(ref e) = result {
        tracing::error!(frame = frame.number(), error = %e, "frame failed, rolling intake state back");
        session.intake.rollback();
    }

    result
}

/// Frame 0 — Bootstrap. Runs exactly once per session; a second call is
/// a programming-contract violation, not a recoverable input error.
fn bootstrap(session: &mut SessionData, agent_name: &str) -> Result<FrameOutcome> {
    if session.bootstrap_completed {
        return Err(Error::FrameContract(
            "bootstrap frame called after bootstrap already completed".to_string(),
        ));
    }
    session.bootstrap_completed = true;

    Ok(FrameOutcome::reply(format!(
        "Hi! I'm {agent_name}, and I help people get their business off the ground — \
formation, paperwork, the works. What are you looking to start?"
    )))
}

const CONSENT_QUESTION: &str = "Great — let's get you set up. Before we start, I'll need to \
collect a few details like your name and contact info so we can prepare your consultation. \
Is that okay with you?";

const CONSENT_REPROMPT: &str = "No pressure either way — I just need a clear yes or no before \
I collect anything. Shall we go ahead?";

/// Frame 61 — Qualification→Intake transition.
///
/// Consent is never inferred: only an explicit affirmative confirms and
/// only an explicit negative declines; the ambiguous list re-prompts.
fn consent_transition(input: &str, session: &mut SessionData) -> Result<FrameOutcome> {
    let lex = Lexicon::current();

    match session.intake.user_consent {
        Some(Consent::Pending) => {
            if Lexicon::matches_any(input, lex.ambiguous_consent) {
                return Ok(FrameOutcome::reply(CONSENT_REPROMPT));
            }
            if is_positive_response(input) {
                session.intake.user_consent = Some(Consent::Confirmed);
                session.intake.mode = IntakeMode::IntakeActive;
                session.intake.transition_at = Some(chrono::Utc::now());
                // current_field is transiently unset here; the name frame
                // re-establishes the invariant in this same turn.
                session.intake.current_field = None;
                session.intake.check_invariant(true)?;

                let first_question = begin_field(session, FieldId::FullLegalName);
                return Ok(FrameOutcome::reply(format!("Perfect. {first_question}")));
            }
            if is_negative_response(input) {
                session.intake.user_consent = Some(Consent::Declined);
                session.intake.mode = IntakeMode::Qualification;
                return Ok(FrameOutcome::reply(
                    "Completely fine — we can keep chatting, and whenever you're ready just say so.",
                ));
            }
            // Neither clearly yes nor no: keep asking.
            Ok(FrameOutcome::reply(CONSENT_REPROMPT))
        }
        _ => {
            session.intake.user_consent = Some(Consent::Pending);
            Ok(FrameOutcome::reply(CONSENT_QUESTION))
        }
    }
}

static COMBINED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    // "my name is Jonathan Smith but I go by Jon"
    Regex::new(
        r"(?i)(?:my name is|i'?m|i am|it'?s|name'?s)\s+([a-z][a-z .'-]*?)\s+but\s+(?:i go by|you can call me|call me|people call me|everyone calls me)\s+([a-z][a-z .'-]*)",
    )
    .unwrap_or_else(|e| panic!("combined name regex: {e}"))
});

static NAME_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:my name is|my full name is|i'?m|i am|it'?s|name'?s)\s+")
        .unwrap_or_else(|e| panic!("name prefix regex: {e}"))
});

static PREFERRED_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:call me|i go by|you can call me|everyone calls me|i prefer)\s+")
        .unwrap_or_else(|e| panic!("preferred prefix regex: {e}"))
});

/// Frame 62 — Name collection.
fn name_collection(input: &str, session: &mut SessionData) -> Result<FrameOutcome> {
    require_active_consented(session, FrameId::NameCollection)?;

    match session.intake.current_field {
        None => {
            // First field right after consent (detector rule 5).
            let question = begin_field(session, FieldId::FullLegalName);
            Ok(FrameOutcome::reply(question))
        }
        Some(FieldId::FullLegalName) => collect_legal_name(input, session),
        Some(FieldId::PreferredName) => collect_preferred_name(input, session),
        Some(other) => Err(Error::FrameContract(format!(
            "name frame invoked while collecting {other}"
        ))),
    }
}

fn collect_legal_name(input: &str, session: &mut SessionData) -> Result<FrameOutcome> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Combined pattern closes both name fields in one turn.
    if let Some(caps) = COMBINED_NAME_RE.captures(trimmed) {
        let legal = title_case(caps[1].trim());
        let preferred = title_case(caps[2].trim());
        session.name = Some(legal.clone());
        session.consultation.user_name = Some(preferred.clone());
        session.intake.set_field(FieldId::FullLegalName, legal);
        session.intake.set_field(FieldId::PreferredName, preferred.clone());
        let next = advance_after(session, FieldId::PreferredName);
        return Ok(match next {
            Some(question) => {
                FrameOutcome::reply(format!("Got it, {preferred}. {question}"))
            }
            None => completion_outcome(session),
        });
    }

    // "Why do you need this" deflection: answer briefly, re-ask.
    if lower.contains("why do you need") || lower.contains("why is that") {
        return Ok(FrameOutcome::reply(
            "Fair question — your legal name goes on the formation documents, so it has to be \
exact. What's your full legal name?",
        ));
    }

    // Privacy objection: reassure, offer to continue or defer.
    if lower.contains("privacy")
        || lower.contains("not comfortable")
        || lower.contains("personal info")
        || lower.contains("don't want to share")
        || lower.contains("dont want to share")
    {
        return Ok(FrameOutcome::reply(
            "Totally understandable. Your details stay between you and our team and are only \
used to prepare your paperwork. Happy to continue whenever you are — or we can hold off \
for now. What would you like to do?",
        ));
    }

    // Declining the field defers collection.
    if is_negative_response(trimmed) {
        session.intake.mode = IntakeMode::IntakePaused;
        session.intake.current_field = None;
        return Ok(FrameOutcome::reply(
            "No problem — we can pick this up whenever you're ready.",
        ));
    }

    let cleaned = NAME_PREFIX_RE.replace(trimmed, "").trim().to_string();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    match words.len() {
        0 => Ok(FrameOutcome::reply("What's your full legal name?")),
        1 => {
            // Single-word partial: hold it and ask for the remainder.
            if let Some(partial) = session.intake.fields.get(&FieldId::FullLegalName).cloned() {
                let full = title_case(&format!("{partial} {cleaned}"));
                session.name = Some(full.clone());
                session.intake.set_field(FieldId::FullLegalName, full);
                let question = begin_field(session, FieldId::PreferredName);
                Ok(FrameOutcome::reply(question))
            } else {
                let partial = title_case(&cleaned);
                session
                    .intake
                    .fields
                    .insert(FieldId::FullLegalName, partial.clone());
                session
                    .intake
                    .set_status(FieldId::FullLegalName, FieldStatus::InProgress);
                Ok(FrameOutcome::reply(format!(
                    "Thanks, {partial}! And your last name?"
                )))
            }
        }
        _ => {
            // A held partial joins the answer unless the user restated
            // the whole name from the top.
            let full = match session.intake.fields.get(&FieldId::FullLegalName) {
                Some(partial) if !cleaned.to_lowercase().starts_with(&partial.to_lowercase()) => {
                    title_case(&format!("{partial} {cleaned}"))
                }
                _ => title_case(&cleaned),
            };
            session.name = Some(full.clone());
            session.intake.set_field(FieldId::FullLegalName, full);
            let question = begin_field(session, FieldId::PreferredName);
            Ok(FrameOutcome::reply(question))
        }
    }
}

fn collect_preferred_name(input: &str, session: &mut SessionData) -> Result<FrameOutcome> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    let legal = session
        .intake
        .fields
        .get(&FieldId::FullLegalName)
        .cloned()
        .unwrap_or_default();
    let legal_first = legal.split_whitespace().next().unwrap_or("").to_string();

    // Opt-out closes the field with no preferred name.
    if is_negative_response(trimmed) || lower.starts_with("just use") || lower.contains("that's fine")
    {
        session
            .intake
            .set_status(FieldId::PreferredName, FieldStatus::Completed);
        session.consultation.user_name = Some(legal_first.clone());
        let next = advance_after(session, FieldId::PreferredName);
        return Ok(match next {
            Some(question) => FrameOutcome::reply(format!("{legal_first} it is. {question}")),
            None => completion_outcome(session),
        });
    }

    let cleaned = PREFERRED_PREFIX_RE.replace(trimmed, "");
    let preferred = title_case(cleaned.split_whitespace().next().unwrap_or(&cleaned));
    session.consultation.user_name = Some(preferred.clone());
    session.intake.set_field(FieldId::PreferredName, preferred.clone());
    let next = advance_after(session, FieldId::PreferredName);
    Ok(match next {
        Some(question) => FrameOutcome::reply(format!("Nice to meet you, {preferred}. {question}")),
        None => completion_outcome(session),
    })
}

/// Frame 63 — the remaining field plan: email, phone, business type, goal.
fn contact_collection(input: &str, session: &mut SessionData) -> Result<FrameOutcome> {
    require_active_consented(session, FrameId::ContactCollection)?;

    let Some(field) = session.intake.current_field else {
        return Err(Error::FrameContract(
            "contact frame invoked with no current field".to_string(),
        ));
    };

    let trimmed = input.trim();

    match field {
        FieldId::Email => {
            let candidate = trimmed
                .split_whitespace()
                .find(|w| w.contains('@') && w.contains('.'))
                .map(|w| w.trim_matches(['.', ',', '!']).to_string());
            match candidate {
                Some(email) => {
                    session.email = Some(email.clone());
                    session.consultation.user_email = Some(email.clone());
                    session.intake.set_field(FieldId::Email, email);
                    let next = advance_after(session, FieldId::Email);
                    Ok(next_or_complete(session, next, "Got it."))
                }
                None => Ok(FrameOutcome::reply(
                    "That doesn't look like an email address — could you double-check it?",
                )),
            }
        }
        FieldId::Phone => {
            if lower_contains_skip(trimmed) || is_negative_response(trimmed) {
                session.intake.set_status(FieldId::Phone, FieldStatus::Skipped);
                let next = advance_after(session, FieldId::Phone);
                return Ok(next_or_complete(session, next, "No problem."));
            }
            let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() >= 7 {
                session.phone = Some(digits.clone());
                session.intake.set_field(FieldId::Phone, digits);
                let next = advance_after(session, FieldId::Phone);
                Ok(next_or_complete(session, next, "Thanks."))
            } else {
                Ok(FrameOutcome::reply(
                    "I couldn't read a phone number there — you can also say \"skip\" and we'll stick with email.",
                ))
            }
        }
        FieldId::BusinessType => {
            let validation = validate_business_type(trimmed);
            if !validation.is_valid {
                // Validation failures are local re-prompts, never rollbacks.
                return Ok(FrameOutcome::reply(
                    validation
                        .suggested_response
                        .unwrap_or("What kind of business are you starting?"),
                ));
            }
            let business = extract_business_type(trimmed)
                .unwrap_or_else(|| trimmed.to_string());
            session.business_type = Some(business.clone());
            session.consultation.business_type = Some(business.clone());
            session.intake.set_field(FieldId::BusinessType, business);
            let next = advance_after(session, FieldId::BusinessType);
            Ok(next_or_complete(session, next, "Great choice."))
        }
        FieldId::BusinessGoal => {
            session.consultation.business_goal = Some(trimmed.to_string());
            session.intake.set_field(FieldId::BusinessGoal, trimmed.to_string());
            let next = advance_after(session, FieldId::BusinessGoal);
            Ok(next_or_complete(session, next, "Love it."))
        }
        other => Err(Error::FrameContract(format!(
            "contact frame invoked while collecting {other}"
        ))),
    }
}

fn lower_contains_skip(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower == "skip" || lower.contains("skip it") || lower.contains("rather not")
}

/// Hard precondition shared by the field-collection frames
fn require_active_consented(session: &SessionData, frame: FrameId) -> Result<()> {
    if session.intake.mode != IntakeMode::IntakeActive {
        return Err(Error::FrameContract(format!(
            "frame {} requires active intake, mode is {:?}",
            frame.number(),
            session.intake.mode
        )));
    }
    if session.intake.user_consent != Some(Consent::Confirmed) {
        return Err(Error::FrameContract(format!(
            "frame {} requires confirmed consent, consent is {:?}",
            frame.number(),
            session.intake.user_consent
        )));
    }
    Ok(())
}

/// Question copy per field
fn field_question(field: FieldId) -> &'static str {
    match field {
        FieldId::FullLegalName => "What's your full legal name, exactly as it should appear on the paperwork?",
        FieldId::PreferredName => "And do you go by anything else, or should we use your first name?",
        FieldId::Email => "What's the best email address to reach you?",
        FieldId::Phone => "And a phone number, in case email is slow? You can say \"skip\".",
        FieldId::BusinessType => "What kind of business are you starting?",
        FieldId::BusinessGoal => "Last one — what's the main goal for the business this year?",
    }
}

/// Mark a field as the one being collected and return its question
fn begin_field(session: &mut SessionData, field: FieldId) -> String {
    session.intake.current_field = Some(field);
    session.intake.set_status(field, FieldStatus::InProgress);
    field_question(field).to_string()
}

/// Move to the next unfinished field after `field`; returns its
/// question, or `None` when the plan is finished.
fn advance_after(session: &mut SessionData, field: FieldId) -> Option<String> {
    let position = FIELD_PLAN.iter().position(|f| *f == field)?;
    for next in FIELD_PLAN.iter().skip(position + 1) {
        let status = session.intake.status(*next);
        if matches!(status, FieldStatus::Unasked | FieldStatus::InProgress) {
            return Some(begin_field(session, *next));
        }
    }
    None
}

fn next_or_complete(
    session: &mut SessionData,
    next: Option<String>,
    ack: &str,
) -> FrameOutcome {
    match next {
        Some(question) => FrameOutcome::reply(format!("{ack} {question}")),
        None => completion_outcome(session),
    }
}

/// Plan finished: clear the current field (re-establishing the "active
/// implies field set" invariant trivially) and hand off to scheduling.
fn completion_outcome(session: &mut SessionData) -> FrameOutcome {
    session.intake.current_field = None;
    FrameOutcome {
        response: "That's everything I need. Let's get your consultation scheduled — here are the next available times:".to_string(),
        intake_complete: true,
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consented_session() -> SessionData {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        session.intake.mode = IntakeMode::IntakeActive;
        session.intake.user_consent = Some(Consent::Confirmed);
        session.intake.current_field = Some(FieldId::FullLegalName);
        session
            .intake
            .set_status(FieldId::FullLegalName, FieldStatus::InProgress);
        session
    }

    #[test]
    fn test_bootstrap_runs_once_then_errors() {
        let mut session = SessionData::new();
        assert_eq!(detect_frame("", &session), Some(FrameId::Bootstrap));

        let outcome = execute_frame(FrameId::Bootstrap, "", &mut session, "Avery").unwrap();
        assert!(outcome.response.contains("Avery"));
        assert!(session.bootstrap_completed);

        let err = execute_frame(FrameId::Bootstrap, "", &mut session, "Avery").unwrap_err();
        assert!(matches!(err, Error::FrameContract(_)));
    }

    #[test]
    fn test_detector_empty_input_after_bootstrap() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        assert_eq!(detect_frame("   ", &session), None);
    }

    #[test]
    fn test_curiosity_never_triggers_consent() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        assert_eq!(detect_frame("how does this work", &session), None);
        assert_eq!(
            detect_frame("I'm ready to start", &session),
            Some(FrameId::ConsentTransition)
        );
    }

    #[test]
    fn test_pending_consent_captures_all_input() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        session.intake.user_consent = Some(Consent::Pending);
        // Even curiosity language continues the consent dialogue.
        assert_eq!(
            detect_frame("how does this work", &session),
            Some(FrameId::ConsentTransition)
        );
    }

    #[test]
    fn test_consent_never_inferred_from_ambiguity() {
        for ambiguous in ["I guess", "maybe", "I suppose"] {
            let mut session = SessionData::new();
            session.bootstrap_completed = true;
            session.intake.user_consent = Some(Consent::Pending);

            let outcome =
                execute_frame(FrameId::ConsentTransition, ambiguous, &mut session, "Avery")
                    .unwrap();
            assert_eq!(session.intake.user_consent, Some(Consent::Pending));
            assert_eq!(session.intake.mode, IntakeMode::Qualification);
            assert_eq!(outcome.response, CONSENT_REPROMPT);
        }
    }

    #[test]
    fn test_consent_confirmed_activates_and_asks_name() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        session.intake.user_consent = Some(Consent::Pending);

        let outcome =
            execute_frame(FrameId::ConsentTransition, "yes", &mut session, "Avery").unwrap();
        assert_eq!(session.intake.user_consent, Some(Consent::Confirmed));
        assert_eq!(session.intake.mode, IntakeMode::IntakeActive);
        assert!(session.intake.transition_at.is_some());
        // Invariant re-established within the same turn.
        assert_eq!(session.intake.current_field, Some(FieldId::FullLegalName));
        assert!(outcome.response.contains("full legal name"));
    }

    #[test]
    fn test_consent_declined_returns_to_qualification() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        session.intake.user_consent = Some(Consent::Pending);

        execute_frame(FrameId::ConsentTransition, "no thanks", &mut session, "Avery").unwrap();
        assert_eq!(session.intake.user_consent, Some(Consent::Declined));
        assert_eq!(session.intake.mode, IntakeMode::Qualification);
    }

    #[test]
    fn test_combined_name_pattern_closes_both_fields() {
        let mut session = consented_session();
        let outcome = execute_frame(
            FrameId::NameCollection,
            "my name is Jonathan Smith but I go by Jon",
            &mut session,
            "Avery",
        )
        .unwrap();
        assert_eq!(
            session.intake.fields.get(&FieldId::FullLegalName),
            Some(&"Jonathan Smith".to_string())
        );
        assert_eq!(
            session.intake.fields.get(&FieldId::PreferredName),
            Some(&"Jon".to_string())
        );
        assert_eq!(session.intake.status(FieldId::PreferredName), FieldStatus::Completed);
        // Plan advances straight to email.
        assert_eq!(session.intake.current_field, Some(FieldId::Email));
        assert!(outcome.response.contains("Jon"));
    }

    #[test]
    fn test_why_deflection_reasks() {
        let mut session = consented_session();
        let outcome = execute_frame(
            FrameId::NameCollection,
            "why do you need that?",
            &mut session,
            "Avery",
        )
        .unwrap();
        assert!(outcome.response.to_lowercase().contains("legal name"));
        assert_eq!(session.intake.current_field, Some(FieldId::FullLegalName));
        assert!(session.intake.fields.get(&FieldId::FullLegalName).is_none());
    }

    #[test]
    fn test_single_word_partial_then_remainder() {
        let mut session = consented_session();
        let outcome =
            execute_frame(FrameId::NameCollection, "Maria", &mut session, "Avery").unwrap();
        assert!(outcome.response.contains("last name"));
        assert_eq!(session.intake.status(FieldId::FullLegalName), FieldStatus::InProgress);

        execute_frame(FrameId::NameCollection, "Gonzalez", &mut session, "Avery").unwrap();
        assert_eq!(
            session.intake.fields.get(&FieldId::FullLegalName),
            Some(&"Maria Gonzalez".to_string())
        );
        assert_eq!(session.intake.current_field, Some(FieldId::PreferredName));
    }

    #[test]
    fn test_partial_then_multiword_remainder_merges() {
        let mut session = consented_session();
        execute_frame(FrameId::NameCollection, "Maria", &mut session, "Avery").unwrap();
        execute_frame(FrameId::NameCollection, "de la Cruz", &mut session, "Avery").unwrap();
        assert_eq!(
            session.intake.fields.get(&FieldId::FullLegalName),
            Some(&"Maria De La Cruz".to_string())
        );
        assert_eq!(session.intake.current_field, Some(FieldId::PreferredName));
    }

    #[test]
    fn test_partial_then_full_restatement_is_not_duplicated() {
        let mut session = consented_session();
        execute_frame(FrameId::NameCollection, "Maria", &mut session, "Avery").unwrap();
        execute_frame(FrameId::NameCollection, "Maria Gonzalez", &mut session, "Avery").unwrap();
        assert_eq!(
            session.intake.fields.get(&FieldId::FullLegalName),
            Some(&"Maria Gonzalez".to_string())
        );
    }

    #[test]
    fn test_preferred_name_opt_out() {
        let mut session = consented_session();
        execute_frame(FrameId::NameCollection, "Maria Gonzalez", &mut session, "Avery").unwrap();
        assert_eq!(session.intake.current_field, Some(FieldId::PreferredName));

        execute_frame(FrameId::NameCollection, "no", &mut session, "Avery").unwrap();
        assert_eq!(session.intake.status(FieldId::PreferredName), FieldStatus::Completed);
        assert!(session.intake.fields.get(&FieldId::PreferredName).is_none());
        assert_eq!(session.consultation.user_name, Some("Maria".to_string()));
        assert_eq!(session.intake.current_field, Some(FieldId::Email));
    }

    #[test]
    fn test_precondition_violation_rolls_back() {
        let mut session = SessionData::new();
        session.bootstrap_completed = true;
        session.intake.mode = IntakeMode::IntakeActive;
        session.intake.user_consent = Some(Consent::Pending); // not confirmed
        session.intake.current_field = Some(FieldId::FullLegalName);

        let err =
            execute_frame(FrameId::NameCollection, "Maria Gonzalez", &mut session, "Avery")
                .unwrap_err();
        assert!(matches!(err, Error::FrameContract(_)));
        // Rolled back to the qualification baseline.
        assert_eq!(session.intake.mode, IntakeMode::Qualification);
        assert!(session.intake.current_field.is_none());
        assert!(session.intake.user_consent.is_none());
    }

    #[test]
    fn test_full_plan_completion() {
        let mut session = consented_session();
        execute_frame(FrameId::NameCollection, "Maria Gonzalez", &mut session, "Avery").unwrap();
        execute_frame(FrameId::NameCollection, "no", &mut session, "Avery").unwrap();
        execute_frame(
            FrameId::ContactCollection,
            "maria@example.com",
            &mut session,
            "Avery",
        )
        .unwrap();
        execute_frame(FrameId::ContactCollection, "skip", &mut session, "Avery").unwrap();
        execute_frame(FrameId::ContactCollection, "a bakery", &mut session, "Avery").unwrap();
        let outcome = execute_frame(
            FrameId::ContactCollection,
            "open by the holidays",
            &mut session,
            "Avery",
        )
        .unwrap();

        assert!(outcome.intake_complete);
        assert!(session.intake.current_field.is_none());
        assert_eq!(session.email, Some("maria@example.com".to_string()));
        assert_eq!(session.intake.status(FieldId::Phone), FieldStatus::Skipped);
        assert_eq!(session.business_type, Some("bakery".to_string()));
    }

    #[test]
    fn test_invalid_email_reprompts_without_rollback() {
        let mut session = consented_session();
        session.intake.current_field = Some(FieldId::Email);
        let outcome = execute_frame(
            FrameId::ContactCollection,
            "just send me mail",
            &mut session,
            "Avery",
        )
        .unwrap();
        assert!(outcome.response.contains("email"));
        assert_eq!(session.intake.mode, IntakeMode::IntakeActive);
        assert_eq!(session.intake.current_field, Some(FieldId::Email));
    }
}
