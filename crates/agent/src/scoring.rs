//! Deterministic lead scoring
//!
//! Additive point weights, each counted once regardless of repetition:
//! pricing inquiry +30, availability check +25, contact provided +25
//! (email or phone, not both), high-intent source page +20, urgency
//! language +15. Tiers: >= 55 hot, 25..55 warm, < 25 cold.
//!
//! The numeric score is an implementation detail. Everything public
//! outside this module speaks in tiers and named factors; the
//! explanation string never contains the score or the word "score".

use intake_agent_core::{Hotness, HotnessFactor, Lexicon, SuggestedAction};

const PRICING_POINTS: u32 = 30;
const AVAILABILITY_POINTS: u32 = 25;
const CONTACT_POINTS: u32 = 25;
const HIGH_INTENT_PAGE_POINTS: u32 = 20;
const URGENCY_POINTS: u32 = 15;

const HOT_THRESHOLD: u32 = 55;
const WARM_THRESHOLD: u32 = 25;

/// Scoring result: tier plus the named factors that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadScore {
    pub hotness: Hotness,
    pub factors: Vec<HotnessFactor>,
}

impl LeadScore {
    /// Recommended follow-up for this tier
    pub fn suggested_action(&self) -> SuggestedAction {
        match self.hotness {
            Hotness::Hot => SuggestedAction::CallImmediately,
            Hotness::Warm => SuggestedAction::FollowUpToday,
            Hotness::Cold => SuggestedAction::AddToNurture,
        }
    }
}

/// Score a finished conversation. Pure: identical inputs always yield
/// identical output.
pub fn score_lead(
    conversation: &[&str],
    source: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> LeadScore {
    let lex = Lexicon::current();
    let mut score = 0u32;
    let mut factors = Vec::new();

    let all_text = conversation.join(" ").to_lowercase();

    if Lexicon::matches_any(&all_text, lex.pricing) {
        score += PRICING_POINTS;
        factors.push(HotnessFactor::AskedAboutPricing);
    }
    if Lexicon::matches_any(&all_text, lex.availability) {
        score += AVAILABILITY_POINTS;
        factors.push(HotnessFactor::CheckedAvailability);
    }
    let has_email = email.map(|e| !e.trim().is_empty()).unwrap_or(false);
    let has_phone = phone.map(|p| !p.trim().is_empty()).unwrap_or(false);
    if has_email || has_phone {
        score += CONTACT_POINTS;
        factors.push(HotnessFactor::ProvidedContactInfo);
    }
    if lex
        .high_intent_pages
        .iter()
        .any(|page| source.starts_with(page))
    {
        score += HIGH_INTENT_PAGE_POINTS;
        factors.push(HotnessFactor::HighIntentPage);
    }
    if Lexicon::matches_any(&all_text, lex.urgency) {
        score += URGENCY_POINTS;
        factors.push(HotnessFactor::UrgencyLanguage);
    }

    let hotness = if score >= HOT_THRESHOLD {
        Hotness::Hot
    } else if score >= WARM_THRESHOLD {
        Hotness::Warm
    } else {
        Hotness::Cold
    };

    LeadScore { hotness, factors }
}

/// Human-facing explanation built only from factor descriptions.
pub fn hotness_explanation(score: &LeadScore) -> String {
    let tier_phrase = match score.hotness {
        Hotness::Hot => "This lead looks ready to move",
        Hotness::Warm => "This lead is showing real interest",
        Hotness::Cold => "This lead is still early in their research",
    };

    if score.factors.is_empty() {
        return format!("{tier_phrase}. They haven't shown any strong buying signals yet.");
    }

    let descriptions: Vec<&str> = score.factors.iter().map(|f| f.description()).collect();
    let joined = match descriptions.len() {
        1 => descriptions[0].to_string(),
        2 => format!("{} and {}", descriptions[0], descriptions[1]),
        _ => {
            let (last, rest) = descriptions.split_last().unwrap_or((&"", &[]));
            format!("{} and {}", rest.join(", "), last)
        }
    };

    format!("{tier_phrase}: they {joined}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_example_from_pricing_page() {
        let conversation = vec![
            "How much does this cost?",
            "Do you have availability tomorrow?",
        ];
        let score = score_lead(
            &conversation,
            "/pricing",
            Some("a@b.com"),
            Some("555-0100"),
        );
        // pricing 30 + availability 25 + contact 25 + page 20 = 100
        assert_eq!(score.hotness, Hotness::Hot);
        assert!(score.factors.contains(&HotnessFactor::AskedAboutPricing));
        assert!(score.factors.contains(&HotnessFactor::CheckedAvailability));
        assert_eq!(score.suggested_action(), SuggestedAction::CallImmediately);
    }

    #[test]
    fn test_cold_browser() {
        let score = score_lead(&["just browsing"], "/about", None, None);
        assert_eq!(score.hotness, Hotness::Cold);
        assert!(score.factors.is_empty());
        assert_eq!(score.suggested_action(), SuggestedAction::AddToNurture);
    }

    #[test]
    fn test_contact_counted_once() {
        // Contact alone is 25 -> warm, whether one or both channels given
        let one = score_lead(&["hello there friend"], "/about", Some("a@b.com"), None);
        let both = score_lead(
            &["hello there friend"],
            "/about",
            Some("a@b.com"),
            Some("555"),
        );
        assert_eq!(one.hotness, Hotness::Warm);
        assert_eq!(one.hotness, both.hotness);
        assert_eq!(one.factors, both.factors);
    }

    #[test]
    fn test_repetition_does_not_stack() {
        let once = score_lead(&["what's the price"], "/x", None, None);
        let many = score_lead(
            &["what's the price", "no really, the price", "price price price"],
            "/x",
            None,
            None,
        );
        assert_eq!(once.hotness, many.hotness);
        assert_eq!(once.factors, many.factors);
    }

    #[test]
    fn test_determinism() {
        let conv = vec!["need this done asap, what are your fees"];
        let a = score_lead(&conv, "/pricing", None, Some("555"));
        let b = score_lead(&conv, "/pricing", None, Some("555"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_explanation_never_leaks_numbers() {
        let cases = [
            score_lead(
                &["how much does it cost, need it asap"],
                "/pricing",
                Some("a@b.com"),
                None,
            ),
            score_lead(&["just browsing"], "/about", None, None),
            score_lead(&["do you have availability"], "/blog", None, None),
        ];
        let points_re = regex::Regex::new(r"(?i)\d+\s*points?").unwrap();
        let score_re = regex::Regex::new(r"(?i)score").unwrap();
        for case in &cases {
            let explanation = hotness_explanation(case);
            assert!(!points_re.is_match(&explanation), "{explanation}");
            assert!(!score_re.is_match(&explanation), "{explanation}");
        }
    }
}
