//! Zero-cost confidence scoring for diagnostic turns
//!
//! Deterministic: intent weight (0-4) + domain-vocabulary hits (capped
//! at 3) + engagement bonus (+2) + input-length bonus (+1) +
//! question-mark bonus (+1) - validation violations, clamped to 0..=10.
//! Tiers pick the response posture and the nudge copy; after two or
//! more Q&A exchanges a nudge is always appended regardless of tier.

use intake_agent_core::{Lexicon, SessionData, UserIntent};

/// Q&A exchanges after which the nudge always appends
const NUDGE_AFTER_EXCHANGES: u32 = 2;

/// Input length range that earns the length bonus
const LENGTH_BONUS_RANGE: std::ops::RangeInclusive<usize> = 10..=200;

/// Response posture derived from the confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// 0-3: educate, no pressure
    Low,
    /// 4-6: soft nudge toward consultation
    Medium,
    /// 7-10: offer to proceed
    High,
}

impl ConfidenceTier {
    fn from_score(score: u32) -> Self {
        match score {
            0..=3 => ConfidenceTier::Low,
            4..=6 => ConfidenceTier::Medium,
            _ => ConfidenceTier::High,
        }
    }
}

fn intent_weight(intent: UserIntent) -> u32 {
    match intent {
        UserIntent::Booking => 4,
        UserIntent::Sales => 3,
        UserIntent::Support => 2,
        UserIntent::Question => 1,
        UserIntent::Unknown => 0,
    }
}

/// Score one diagnostic input. `violations` is the count of validator
/// rejections accumulated for this input.
pub fn score_confidence(input: &str, intent: UserIntent, violations: u32) -> (u32, ConfidenceTier) {
    let lex = Lexicon::current();
    let lower = input.to_lowercase();

    let mut score: i64 = intent_weight(intent) as i64;

    let vocab_hits = lex
        .domain_vocabulary
        .iter()
        .filter(|term| lower.contains(*term))
        .count()
        .min(3);
    score += vocab_hits as i64;

    // Generic engagement: any business-ish word, or just a non-trivial message
    if lower.contains("business") || input.trim().len() > 5 {
        score += 2;
    }
    if LENGTH_BONUS_RANGE.contains(&input.trim().len()) {
        score += 1;
    }
    if input.contains('?') {
        score += 1;
    }
    score -= violations as i64;

    let clamped = score.clamp(0, 10) as u32;
    (clamped, ConfidenceTier::from_score(clamped))
}

/// Soft nudge appended to low/medium-confidence diagnostic answers
pub const CONSULTATION_NUDGE: &str =
    "By the way, a free consultation is the quickest way to get answers specific to your situation — just say \"I'm ready\" whenever you'd like to set one up.";

/// Direct offer appended to high-confidence diagnostic answers
pub const PROCEED_OFFER: &str =
    "It sounds like you have a clear picture — want me to set up a free consultation so you can move forward? Just say \"I'm ready\".";

/// Whether this turn must carry the nudge regardless of tier
pub fn should_append_nudge(session: &SessionData, tier: ConfidenceTier) -> bool {
    session.qa_exchanges >= NUDGE_AFTER_EXCHANGES || tier != ConfidenceTier::Low
}

/// Copy appended when a nudge is due: high confidence offers to
/// proceed, anything lower gets the soft nudge.
pub fn nudge_copy(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => PROCEED_OFFER,
        ConfidenceTier::Low | ConfidenceTier::Medium => CONSULTATION_NUDGE,
    }
}
