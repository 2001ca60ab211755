//! Phase-gated turn routing
//!
//! One entry point, `route_turn`, owns the order of checks for every
//! user message: terminal short-circuit, escalation gatekeeping, frame
//! detection, then the completion-assisted diagnostic path. Phase
//! transitions all go through one guard that rejects and logs anything
//! non-monotonic instead of corrupting the session.

use std::sync::Arc;

use intake_agent_config::AgentConfig;
use intake_agent_core::{
    Consent, Error, FieldId, FieldStatus, IntakeMode, LeadRecord, LeadSink, Lexicon, Mode, Phase,
    SessionData, UserIntent,
};
use intake_agent_llm::AssistLayer;

use crate::confidence::{nudge_copy, score_confidence, should_append_nudge, ConfidenceTier};
use crate::frames::{detect_frame, execute_frame, FrameId};
use crate::gatekeeper::{evaluate_escalation, should_auto_escalate, EscalationType};
use crate::intents::{extract_business_type, extract_location};
use crate::scheduling::{
    confirm_slot, format_slot_list, generate_slots_from_today, out_of_range_message,
    parse_slot_selection, SlotSelection,
};
use crate::scoring::score_lead;
use crate::AgentError;

/// Collaborators the router needs for a turn
pub struct RouterDeps {
    pub assist: AssistLayer,
    pub sink: Arc<dyn LeadSink>,
    pub config: AgentConfig,
}

/// Per-turn diagnostics surfaced alongside the response
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnMetadata {
    pub phase: Phase,
    pub mode: Mode,
    pub frame: Option<FrameId>,
    pub intent: Option<UserIntent>,
    pub confidence: Option<ConfidenceTier>,
    pub current_field: Option<FieldId>,
    pub field_status: Option<FieldStatus>,
    pub consent: Option<Consent>,
    pub escalation: Option<String>,
}

/// What one routed turn produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub message: String,
    /// False only in the terminal phase
    pub requires_input: bool,
    /// Numbered options (slot displays) when a list was offered
    pub options: Vec<String>,
    pub show_cta: bool,
    pub cta_text: Option<String>,
    pub metadata: TurnMetadata,
}

const CTA_TEXT: &str = "Book a free consultation";

const TERMINAL_MESSAGE: &str = "You're all booked — we'll see you at your consultation. If anything changes, our team will reach out.";

/// Route one user message through the engine.
pub async fn route_turn(
    input: &str,
    session: &mut SessionData,
    deps: &RouterDeps,
) -> Result<TurnOutcome, AgentError> {
    // Terminal phase: fixed copy, and the session stays exactly as it
    // was confirmed. Nothing is appended to history.
    if session.phase.is_terminal() {
        return Ok(terminal_outcome(session));
    }

    // First contact: the bootstrap frame runs even on empty input.
    if session.phase == Phase::Orient {
        return orient_turn(input, session, deps);
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AgentError::Core(Error::InvalidRequest(
            "empty message".to_string(),
        )));
    }
    session.push_user(trimmed);

    // Escalation gatekeeping runs before routing, but never interrupts
    // structured field collection mid-field.
    if session.intake.mode != IntakeMode::IntakeActive && session.escalation_reason.is_none() {
        let decision = evaluate_escalation(trimmed, session);
        if decision.should_escalate {
            return escalate_turn(session, deps, decision.kind, decision.reason);
        }
        if should_auto_escalate(session) {
            return escalate_turn(
                session,
                deps,
                None,
                Some("enough qualification detail collected for hand-off".to_string()),
            );
        }
    }

    if session.phase == Phase::Scheduling {
        return scheduling_turn(trimmed, session, deps).await;
    }

    // Frame detection covers consent and field collection.
    if let Some(frame) = detect_frame(trimmed, session) {
        return frame_turn(frame, trimmed, session, deps).await;
    }

    // No frame applies: completion-assisted diagnostic path.
    diagnostic_turn(trimmed, session, deps).await
}

/// Central phase guard. Non-monotonic requests are rejected and logged,
/// never applied.
fn advance_phase(session: &mut SessionData, next: Phase) {
    if !session.phase.can_advance_to(next) {
        tracing::warn!(
            from = %session.phase,
            to = %next,
            "rejected non-monotonic phase transition"
        );
        return;
    }
    if session.phase != next {
        tracing::info!(from = %session.phase, to = %next, "phase transition");
        session.phase = next;
    }
}

fn orient_turn(
    input: &str,
    session: &mut SessionData,
    deps: &RouterDeps,
) -> Result<TurnOutcome, AgentError> {
    if !input.trim().is_empty() {
        session.push_user(input.trim());
    }
    let outcome = execute_frame(FrameId::Bootstrap, input, session, &deps.config.name)?;
    session.orient_completed = true;
    advance_phase(session, Phase::Discovery);
    Ok(finish(
        session,
        &outcome.response,
        Some(FrameId::Bootstrap),
        true,
        false,
        None,
        None,
    ))
}

fn escalate_turn(
    session: &mut SessionData,
    deps: &RouterDeps,
    kind: Option<EscalationType>,
    reason: Option<String>,
) -> Result<TurnOutcome, AgentError> {
    session.escalation_reason = reason;
    match kind {
        Some(EscalationType::Partnership) => session.has_partners = Some(true),
        Some(EscalationType::MultiState) => session.multi_state = Some(true),
        _ => {}
    }
    tracing::info!(
        reason = session.escalation_reason.as_deref().unwrap_or(""),
        "conversation escalated to human consultation"
    );
    advance_phase(session, Phase::Intake);
    session.mode = Mode::Intake;

    // The consultation is the hand-off: open the consent dialogue.
    let consent = execute_frame(FrameId::ConsentTransition, "", session, &deps.config.name)?;
    let message = format!(
        "That's exactly the kind of situation our specialists handle every day, and it deserves \
more than a chat window. {}",
        consent.response
    );
    Ok(finish(
        session,
        &message,
        Some(FrameId::ConsentTransition),
        true,
        true,
        Some(CTA_TEXT),
        None,
    ))
}

async fn frame_turn(
    frame: FrameId,
    input: &str,
    session: &mut SessionData,
    deps: &RouterDeps,
) -> Result<TurnOutcome, AgentError> {
    // Any frame past bootstrap means the intake machinery is engaged.
    advance_phase(session, Phase::Intake);

    let outcome = execute_frame(frame, input, session, &deps.config.name)?;
    if session.intake.mode == IntakeMode::IntakeActive {
        session.mode = Mode::Intake;
    }

    if outcome.intake_complete {
        return offer_slots(session, deps, &outcome.response);
    }

    Ok(finish(session, &outcome.response, Some(frame), true, false, None, None))
}

/// Field plan finished: move to scheduling and present the list.
fn offer_slots(
    session: &mut SessionData,
    deps: &RouterDeps,
    lead_in: &str,
) -> Result<TurnOutcome, AgentError> {
    advance_phase(session, Phase::Scheduling);
    let slots = generate_slots_from_today(&deps.config.scheduling);
    let list = format_slot_list(&slots);
    let options = slots.iter().map(|s| s.display.clone()).collect();
    session.offered_slots = slots;

    let message = format!("{lead_in}\n\n{list}\n\nJust reply with the number that works for you.");
    Ok(finish(session, &message, None, true, false, None, Some(options)))
}

async fn scheduling_turn(
    input: &str,
    session: &mut SessionData,
    deps: &RouterDeps,
) -> Result<TurnOutcome, AgentError> {
    if session.offered_slots.is_empty() {
        // Re-presentation after e.g. a restored session.
        return offer_slots(session, deps, "Here are the next available times:");
    }

    match parse_slot_selection(input, &session.offered_slots) {
        SlotSelection::Chosen(slot) => {
            session.consultation.preferred_date = Some(slot.date.clone());
            session.consultation.preferred_time = Some(slot.time.clone());
            session.consultation.scheduled_slot = Some(slot.clone());
            session.consultation.confirmed_at = Some(chrono::Utc::now());

            persist_outcome(session, deps).await;

            advance_phase(session, Phase::Confirmed);
            let message = confirm_slot(&slot);
            Ok(finish(session, &message, None, false, false, None, None))
        }
        SlotSelection::OutOfRange { given, max } => {
            let message = out_of_range_message(given, max);
            Ok(finish(session, &message, None, true, false, None, None))
        }
        SlotSelection::NoSelection => {
            let list = format_slot_list(&session.offered_slots);
            let message = format!(
                "Sorry, I didn't catch which time you meant.\n\n{list}\n\nJust reply with a number."
            );
            Ok(finish(session, &message, None, true, false, None, None))
        }
    }
}

/// Persist the consultation and the scored lead. Failures are logged
/// and swallowed: the user still gets their confirmation.
async fn persist_outcome(session: &SessionData, deps: &RouterDeps) {
    let source = session.source_page.clone().unwrap_or_default();
    let score = {
        let messages = session.user_messages();
        score_lead(
            &messages,
            &source,
            session.email.as_deref(),
            session.phone.as_deref(),
        )
    };
    let intent = session
        .intent
        .as_deref()
        .map(parse_stored_intent)
        .unwrap_or_default();

    let lead = LeadRecord {
        name: session.name.clone(),
        email: session.email.clone(),
        phone: session.phone.clone(),
        business_type: session.business_type.clone(),
        location: session.location.clone(),
        hotness: score.hotness,
        hotness_factors: score.factors.clone(),
        intent,
        suggested_action: score.suggested_action(),
        escalation_reason: session.escalation_reason.clone(),
        transcript: session.history.clone(),
    };

    if let Err(e) = deps.sink.save_consultation(&session.consultation).await {
        tracing::error!(error = %e, "failed to persist consultation");
    }
    if let Err(e) = deps.sink.save_lead(&lead).await {
        tracing::error!(error = %e, "failed to persist lead");
    }
}

/// Opportunistic capture from free diagnostic text. Only curated-list
/// hits are kept (never the raw-input fallback), so the gatekeeper's
/// auto-escalation sees real facts, not echoes.
fn capture_qualification_facts(input: &str, session: &mut SessionData) {
    let lex = Lexicon::current();
    if session.business_type.is_none() {
        if let Some(kind) = extract_business_type(input) {
            if lex.business_categories.contains(&kind.as_str()) {
                session.business_type = Some(kind);
            }
        }
    }
    if session.location.is_none() {
        if let Some(state) = extract_location(input) {
            if lex.us_states.contains(&state.as_str()) {
                session.location = Some(state);
            }
        }
    }
}

fn parse_stored_intent(s: &str) -> UserIntent {
    match s {
        "sales" => UserIntent::Sales,
        "booking" => UserIntent::Booking,
        "question" => UserIntent::Question,
        "support" => UserIntent::Support,
        _ => UserIntent::Unknown,
    }
}

async fn diagnostic_turn(
    input: &str,
    session: &mut SessionData,
    deps: &RouterDeps,
) -> Result<TurnOutcome, AgentError> {
    session.mode = Mode::Diagnostic;
    capture_qualification_facts(input, session);
    let assist = deps.assist.assist(input, session).await;
    session.intent = Some(assist.intent.as_str().to_string());
    session.qa_exchanges += 1;

    let (_, tier) = score_confidence(input, assist.intent, 0);

    // Completion failure fails open: stop burning discovery turns and
    // move the conversation toward structured intake.
    let cap_reached = if assist.attempt_failed {
        true
    } else {
        if session.phase == Phase::Discovery {
            session.discovery_turns += 1;
        }
        session.discovery_turns >= deps.config.discovery_turn_cap
    };

    let mut message = assist.message.clone();
    let mut frame = None;
    let mut show_cta = false;

    if cap_reached
        && session.intake.user_consent.is_none()
        && session.intake.mode == IntakeMode::Qualification
    {
        advance_phase(session, Phase::Intake);
        let consent =
            execute_frame(FrameId::ConsentTransition, input, session, &deps.config.name)?;
        message = format!("{message}\n\n{}", consent.response);
        frame = Some(FrameId::ConsentTransition);
        show_cta = true;
    } else if should_append_nudge(session, tier) {
        message = format!("{message} {}", nudge_copy(tier));
        show_cta = true;
    }

    Ok(finish_with(
        session,
        &message,
        frame,
        true,
        show_cta,
        show_cta.then_some(CTA_TEXT),
        None,
        Some(assist.intent),
        Some(tier),
    ))
}

/// Outcome for a post-confirmation call. Reads the session, never
/// mutates it: the confirmed record is frozen.
fn terminal_outcome(session: &SessionData) -> TurnOutcome {
    TurnOutcome {
        message: TERMINAL_MESSAGE.to_string(),
        requires_input: false,
        options: Vec::new(),
        show_cta: false,
        cta_text: None,
        metadata: TurnMetadata {
            phase: session.phase,
            mode: session.mode,
            frame: None,
            intent: None,
            confidence: None,
            current_field: session.intake.current_field,
            field_status: session
                .intake
                .current_field
                .map(|f| session.intake.status(f)),
            consent: session.intake.user_consent,
            escalation: session.escalation_reason.clone(),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn finish(
    session: &mut SessionData,
    message: &str,
    frame: Option<FrameId>,
    requires_input: bool,
    show_cta: bool,
    cta_text: Option<&str>,
    options: Option<Vec<String>>,
) -> TurnOutcome {
    finish_with(
        session,
        message,
        frame,
        requires_input,
        show_cta,
        cta_text,
        options,
        None,
        None,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish_with(
    session: &mut SessionData,
    message: &str,
    frame: Option<FrameId>,
    requires_input: bool,
    show_cta: bool,
    cta_text: Option<&str>,
    options: Option<Vec<String>>,
    intent: Option<UserIntent>,
    confidence: Option<ConfidenceTier>,
) -> TurnOutcome {
    session.push_bot(message);
    TurnOutcome {
        message: message.to_string(),
        requires_input,
        options: options.unwrap_or_default(),
        show_cta,
        cta_text: cta_text.map(str::to_string),
        metadata: TurnMetadata {
            phase: session.phase,
            mode: session.mode,
            frame,
            intent,
            confidence,
            current_field: session.intake.current_field,
            field_status: session
                .intake
                .current_field
                .map(|f| session.intake.status(f)),
            consent: session.intake.user_consent,
            escalation: session.escalation_reason.clone(),
        },
    }
}
