//! Rule-based intent detection and input validation
//!
//! Pure, stateless functions over a single input string. All trigger
//! lists come from the shared lexicon.
//!
//! Intent scoring: +1 per keyword hit, +2 per phrase hit
//! (case-insensitive substring). The winner is the highest total; ties
//! are broken by the fixed priority order `Booking > Sales > Support >
//! Question`, so detection is deterministic regardless of map or
//! iteration order.

use intake_agent_core::{Lexicon, UserIntent};
use intake_agent_llm::FallbackClassifier;

/// Fixed evaluation order; earlier entries win ties.
const INTENT_PRIORITY: [UserIntent; 4] = [
    UserIntent::Booking,
    UserIntent::Sales,
    UserIntent::Support,
    UserIntent::Question,
];

fn intent_lists(intent: UserIntent) -> (&'static [&'static str], &'static [&'static str]) {
    let lex = Lexicon::current();
    match intent {
        UserIntent::Sales => (lex.sales_keywords, lex.sales_phrases),
        UserIntent::Booking => (lex.booking_keywords, lex.booking_phrases),
        UserIntent::Question => (lex.question_keywords, lex.question_phrases),
        UserIntent::Support => (lex.support_keywords, lex.support_phrases),
        UserIntent::Unknown => (&[], &[]),
    }
}

/// Classify a message into an intent category.
///
/// Returns `Unknown` when no keyword or phrase matches at all.
pub fn detect_intent(text: &str) -> UserIntent {
    let lower = text.to_lowercase();
    let mut best = UserIntent::Unknown;
    let mut best_score = 0u32;

    for intent in INTENT_PRIORITY {
        let (keywords, phrases) = intent_lists(intent);
        let mut score = 0u32;
        for kw in keywords {
            if word_hit(&lower, kw) {
                score += 1;
            }
        }
        for phrase in phrases {
            if lower.contains(phrase) {
                score += 2;
            }
        }
        // Strictly greater: earlier priority entries keep ties.
        if score > best_score {
            best_score = score;
            best = intent;
        }
    }

    best
}

fn word_hit(lower_text: &str, word: &str) -> bool {
    lower_text
        .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
        .any(|w| w == word)
}

/// Rule-based classifier handed to the assist layer as its fallback
pub struct RuleBasedClassifier;

impl FallbackClassifier for RuleBasedClassifier {
    fn classify(&self, text: &str) -> UserIntent {
        detect_intent(text)
    }
}

/// Affirmative check: exact or leading-word match against the lexicon
pub fn is_positive_response(text: &str) -> bool {
    Lexicon::leading_word_match(text, Lexicon::current().affirmative)
}

/// Negative check: exact or leading-word match against the lexicon
pub fn is_negative_response(text: &str) -> bool {
    Lexicon::leading_word_match(text, Lexicon::current().negative)
}

/// Pull a business type out of free text.
///
/// Matches the curated category list first; otherwise returns the
/// trimmed raw input when it is a plausible length (3–99 chars).
pub fn extract_business_type(text: &str) -> Option<String> {
    let lex = Lexicon::current();
    if let Some(category) = Lexicon::first_match(text, lex.business_categories) {
        return Some(category.to_string());
    }
    plausible_raw(text)
}

/// Pull a US state out of free text, or fall back to the raw input.
///
/// Full names match as substrings. Two-letter abbreviations match only
/// when written in uppercase as a standalone word ("TX"), since many of
/// them collide with common English words ("in", "or", "me").
pub fn extract_location(text: &str) -> Option<String> {
    let lex = Lexicon::current();
    let lower = text.to_lowercase();
    for chunk in lex.us_states.chunks(2) {
        let (name, abbr) = (chunk[0], chunk[1]);
        if lower.contains(name) {
            return Some(name.to_string());
        }
        let upper_abbr = abbr.to_uppercase();
        if text
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == upper_abbr)
        {
            return Some(name.to_string());
        }
    }
    plausible_raw(text)
}

fn plausible_raw(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if (3..100).contains(&trimmed.len()) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Why a validator rejected the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Greeting,
    ProfanityOrNonsense,
    IllegalTopic,
    IsAQuestion,
    TooVague,
    Unclear,
    Empty,
}

/// Validator verdict with a fixed re-prompt for each rejection reason
#[derive(Debug, Clone)]
pub struct Validation {
    pub is_valid: bool,
    pub reason: Option<ValidationReason>,
    pub suggested_response: Option<&'static str>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            is_valid: true,
            reason: None,
            suggested_response: None,
        }
    }

    fn rejected(reason: ValidationReason, suggested: &'static str) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
            suggested_response: Some(suggested),
        }
    }
}

/// Validate a business-type answer.
///
/// Precedence when several problems could apply:
/// greeting > profanity/nonsense > illegal topic > is-a-question > too-vague.
pub fn validate_business_type(text: &str) -> Validation {
    let lex = Lexicon::current();
    let trimmed = text.trim();

    if Lexicon::matches_exact(trimmed, lex.greetings) {
        return Validation::rejected(
            ValidationReason::Greeting,
            "Hi there! What kind of business are you looking to start?",
        );
    }
    if Lexicon::matches_any(trimmed, lex.profanity) || is_nonsense(trimmed) {
        return Validation::rejected(
            ValidationReason::ProfanityOrNonsense,
            "Let's keep it simple — what kind of business do you have in mind?",
        );
    }
    if Lexicon::matches_any(trimmed, lex.illegal_topics) {
        return Validation::rejected(
            ValidationReason::IllegalTopic,
            "That's not something we can help with. Is there a legitimate business you'd like to set up?",
        );
    }
    if trimmed.ends_with('?') {
        return Validation::rejected(
            ValidationReason::IsAQuestion,
            "Good question — we'll get to that. First, what kind of business are you starting?",
        );
    }
    if trimmed.len() < 3 {
        return Validation::rejected(
            ValidationReason::TooVague,
            "Could you tell me a little more? For example: consulting, e-commerce, a restaurant...",
        );
    }
    Validation::ok()
}

/// Validate a yes/no answer
pub fn validate_yes_no(text: &str) -> Validation {
    if is_positive_response(text) || is_negative_response(text) {
        Validation::ok()
    } else {
        Validation::rejected(
            ValidationReason::Unclear,
            "Just to make sure I record this right — is that a yes or a no?",
        )
    }
}

/// Validate a location answer
pub fn validate_location(text: &str) -> Validation {
    if text.trim().is_empty() {
        return Validation::rejected(
            ValidationReason::Empty,
            "Which state will the business be based in?",
        );
    }
    Validation::ok()
}

fn is_nonsense(text: &str) -> bool {
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    if text.len() >= 4 && alpha * 2 < text.len() {
        return true;
    }
    // Keyboard mash: a long single "word" with no vowels
    text.split_whitespace().any(|w| {
        w.len() >= 7 && !w.to_lowercase().chars().any(|c| "aeiou".contains(c))
    })
}
