//! Consolidated trigger-phrase lexicon
//!
//! Every keyword and phrase list the engine matches against lives here,
//! in one versioned structure, so the matching policy is auditable in a
//! single place instead of being duplicated across modules with
//! slightly different wording.
//!
//! Matching helpers are deliberately simple: lowercase substring for
//! phrases, exact-or-prefix for single words.

use once_cell::sync::Lazy;

/// Version string recorded alongside any decision derived from these
/// lists. Bump when a list changes.
pub const LEXICON_VERSION: &str = "2026.08";

/// The full lexicon. Obtain via [`Lexicon::current`].
#[derive(Debug)]
pub struct Lexicon {
    /// Explicit readiness to begin intake ("I'm ready")
    pub readiness_signals: &'static [&'static str],
    /// Curiosity about the process — must never trigger intake
    pub curiosity_signals: &'static [&'static str],
    /// Ambiguous consent replies that re-prompt instead of deciding
    pub ambiguous_consent: &'static [&'static str],
    /// Affirmative single words/phrases
    pub affirmative: &'static [&'static str],
    /// Negative single words/phrases
    pub negative: &'static [&'static str],
    /// Exact-match greetings that skip the completion service
    pub greetings: &'static [&'static str],
    /// Exact-match thanks/goodbyes that skip the completion service
    pub pleasantries: &'static [&'static str],
    /// Profanity markers (kept short; matched as substrings)
    pub profanity: &'static [&'static str],
    /// Topics the service will not assist with
    pub illegal_topics: &'static [&'static str],
    /// Urgency language (lead scoring)
    pub urgency: &'static [&'static str],
    /// Pricing inquiry language (lead scoring)
    pub pricing: &'static [&'static str],
    /// Availability-check language (lead scoring)
    pub availability: &'static [&'static str],
    /// Source pages treated as high intent (lead scoring)
    pub high_intent_pages: &'static [&'static str],
    /// Escalation triggers, one list per gatekeeper check
    pub licensed_professions: &'static [&'static str],
    pub multi_state_triggers: &'static [&'static str],
    pub tax_triggers: &'static [&'static str],
    pub partnership_triggers: &'static [&'static str],
    pub uncertainty_triggers: &'static [&'static str],
    pub existing_business_triggers: &'static [&'static str],
    pub funding_triggers: &'static [&'static str],
    pub nonprofit_triggers: &'static [&'static str],
    /// Curated business categories for extraction
    pub business_categories: &'static [&'static str],
    /// US state names followed by their postal abbreviations
    pub us_states: &'static [&'static str],
    /// Domain vocabulary used by confidence scoring
    pub domain_vocabulary: &'static [&'static str],
    /// Intent keyword lists (+1 each on match)
    pub sales_keywords: &'static [&'static str],
    pub booking_keywords: &'static [&'static str],
    pub question_keywords: &'static [&'static str],
    pub support_keywords: &'static [&'static str],
    /// Intent phrase lists (+2 each on substring match)
    pub sales_phrases: &'static [&'static str],
    pub booking_phrases: &'static [&'static str],
    pub question_phrases: &'static [&'static str],
    pub support_phrases: &'static [&'static str],
}

static CURRENT: Lazy<Lexicon> = Lazy::new(Lexicon::builtin);

impl Lexicon {
    /// The process-wide lexicon
    pub fn current() -> &'static Lexicon {
        &CURRENT
    }

    pub fn version(&self) -> &'static str {
        LEXICON_VERSION
    }

    fn builtin() -> Self {
        Self {
            readiness_signals: &[
                "i'm ready",
                "im ready",
                "i am ready",
                "ready to start",
                "ready to go",
                "let's get started",
                "lets get started",
                "let's do this",
                "lets do this",
                "let's start",
                "lets start",
                "sign me up",
                "let's begin",
                "lets begin",
            ],
            curiosity_signals: &[
                "how does this work",
                "how does it work",
                "what do you need from me",
                "what do you need",
                "what happens next",
                "what's the process",
                "whats the process",
                "what is the process",
                "tell me more",
                "what information",
            ],
            ambiguous_consent: &[
                "i guess",
                "maybe",
                "i suppose",
                "perhaps",
                "i think so",
                "kind of",
                "sort of",
                "possibly",
                "we'll see",
            ],
            affirmative: &[
                "yes", "yeah", "yep", "yup", "sure", "ok", "okay", "absolutely",
                "definitely", "correct", "right", "of course", "sounds good",
            ],
            negative: &[
                "no", "nope", "nah", "not", "never", "negative", "don't", "dont",
                "not yet", "not really",
            ],
            greetings: &["hi", "hello", "hey", "good morning", "good afternoon", "good evening"],
            pleasantries: &["thanks", "thank you", "bye", "goodbye", "see you", "ok thanks"],
            profanity: &["damn", "hell no", "wtf", "stfu", "bullshit"],
            illegal_topics: &[
                "launder", "laundering", "evade taxes", "tax evasion", "shell company to hide",
                "counterfeit", "smuggle",
            ],
            urgency: &[
                "asap", "urgent", "urgently", "right away", "immediately",
                "as soon as possible", "today if possible", "this week",
            ],
            pricing: &[
                "how much", "cost", "price", "pricing", "fee", "fees", "charge",
                "expensive", "cheap", "rates",
            ],
            availability: &[
                "availability", "available", "appointment", "schedule", "book",
                "slot", "openings", "tomorrow", "calendar",
            ],
            high_intent_pages: &["/pricing", "/get-started", "/book", "/services", "/contact"],
            licensed_professions: &[
                "doctor", "physician", "lawyer", "attorney", "nurse", "dentist",
                "accountant", "cpa", "therapist", "counselor", "architect",
                "pharmacist", "chiropractor", "real estate agent", "contractor license",
                "medical practice", "law firm",
            ],
            multi_state_triggers: &[
                "multiple states", "multi-state", "multi state", "several states",
                "across states", "two states", "other states", "out of state",
            ],
            tax_triggers: &[
                "tax", "taxes", "irs", "deduction", "deductions", "write off",
                "write-off", "s-corp election", "1099",
            ],
            partnership_triggers: &[
                "partner", "partners", "partnership", "co-founder", "cofounder",
                "business with my", "50/50", "equity split",
            ],
            uncertainty_triggers: &[
                "not sure", "no idea", "confused", "don't know", "dont know",
                "overwhelmed", "lost", "don't understand", "dont understand",
            ],
            existing_business_triggers: &[
                "already have a business", "existing business", "already operating",
                "currently operate", "my current business", "already registered",
            ],
            funding_triggers: &[
                "funding", "investor", "investors", "raise money", "venture capital",
                "vc", "angel", "business loan", "grant",
            ],
            nonprofit_triggers: &[
                "nonprofit", "non-profit", "non profit", "501c3", "501(c)(3)",
                "charity", "charitable", "foundation",
            ],
            business_categories: &[
                "consulting", "coaching", "e-commerce", "ecommerce", "online store",
                "retail", "restaurant", "food truck", "catering", "bakery",
                "construction", "landscaping", "cleaning", "plumbing", "electrical",
                "real estate", "property management", "trucking", "delivery",
                "photography", "videography", "design", "marketing", "agency",
                "software", "app", "saas", "it services", "salon", "barbershop",
                "fitness", "personal training", "daycare", "tutoring", "handyman",
            ],
            us_states: &[
                "alabama", "al", "alaska", "ak", "arizona", "az", "arkansas", "ar",
                "california", "ca", "colorado", "co", "connecticut", "ct",
                "delaware", "de", "florida", "fl", "georgia", "ga", "hawaii", "hi",
                "idaho", "id", "illinois", "il", "indiana", "in", "iowa", "ia",
                "kansas", "ks", "kentucky", "ky", "louisiana", "la", "maine", "me",
                "maryland", "md", "massachusetts", "ma", "michigan", "mi",
                "minnesota", "mn", "mississippi", "ms", "missouri", "mo",
                "montana", "mt", "nebraska", "ne", "nevada", "nv",
                "new hampshire", "nh", "new jersey", "nj", "new mexico", "nm",
                "new york", "ny", "north carolina", "nc", "north dakota", "nd",
                "ohio", "oh", "oklahoma", "ok", "oregon", "or",
                "pennsylvania", "pa", "rhode island", "ri", "south carolina", "sc",
                "south dakota", "sd", "tennessee", "tn", "texas", "tx", "utah", "ut",
                "vermont", "vt", "virginia", "va", "washington", "wa",
                "west virginia", "wv", "wisconsin", "wi", "wyoming", "wy",
            ],
            domain_vocabulary: &[
                "llc", "corporation", "corp", "s-corp", "c-corp", "ein", "dba",
                "registered agent", "operating agreement", "articles", "bylaws",
                "incorporate", "formation", "license", "permit", "trademark",
                "sole proprietor", "business",
            ],
            sales_keywords: &["cost", "price", "pricing", "fee", "buy", "purchase", "plan", "package"],
            booking_keywords: &["book", "schedule", "appointment", "consultation", "call", "meet", "slot"],
            question_keywords: &["how", "what", "when", "where", "why", "which", "can", "does"],
            support_keywords: &["help", "issue", "problem", "stuck", "error", "broken", "refund"],
            sales_phrases: &["how much does", "what does it cost", "what are your prices", "i want to buy"],
            booking_phrases: &["book a call", "schedule a consultation", "set up a meeting", "talk to someone"],
            question_phrases: &["how does", "what is the", "i was wondering", "quick question"],
            support_phrases: &["i need help", "something went wrong", "not working", "have a problem"],
        }
    }

    /// Case-insensitive match against a trigger list. Multi-word phrases
    /// match as substrings; single words match on word boundaries, so
    /// "fee" never fires on "coffee" nor "angel" on "Angeles".
    pub fn matches_any(text: &str, phrases: &[&str]) -> bool {
        let lower = text.to_lowercase();
        phrases.iter().any(|p| Self::phrase_hit(&lower, p))
    }

    /// The first phrase in the list matching the text, if any
    pub fn first_match<'a>(text: &str, phrases: &[&'a str]) -> Option<&'a str> {
        let lower = text.to_lowercase();
        phrases.iter().find(|p| Self::phrase_hit(&lower, p)).copied()
    }

    fn phrase_hit(lower_text: &str, phrase: &str) -> bool {
        let word_like = phrase
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '\'');
        if word_like {
            lower_text
                .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
                .any(|w| w == phrase)
        } else {
            lower_text.contains(phrase)
        }
    }

    /// Exact match after trimming and lowercasing
    pub fn matches_exact(text: &str, phrases: &[&str]) -> bool {
        let lower = text.trim().to_lowercase();
        let trimmed = lower.trim_end_matches(['!', '.', '?']);
        phrases.iter().any(|p| trimmed == *p)
    }

    /// Exact-or-prefix match on the first word, used by yes/no detection
    pub fn leading_word_match(text: &str, words: &[&str]) -> bool {
        let lower = text.trim().to_lowercase();
        words
            .iter()
            .any(|w| lower == *w || lower.starts_with(&format!("{} ", w)) || lower.starts_with(&format!("{},", w)))
    }
}
