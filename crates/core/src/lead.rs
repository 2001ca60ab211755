//! Lead record types handed to the downstream capture collaborator
//!
//! The engine never constructs a dashboard `Lead` itself; it emits a
//! `LeadRecord` with enough structure (contact info, extracted fields,
//! transcript, tier and factors) for the capture service to build one.
//! Raw point scores never appear on this surface.

use serde::{Deserialize, Serialize};

use crate::conversation::Turn;

/// Tiered lead-quality classification.
///
/// Derived from a hidden point score; only the tier and named factors
/// are exposed outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hotness {
    Hot,
    Warm,
    Cold,
}

impl Hotness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hotness::Hot => "hot",
            Hotness::Warm => "warm",
            Hotness::Cold => "cold",
        }
    }
}

impl std::fmt::Display for Hotness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named boolean scoring signals. These are the only scoring outputs
/// that leave the scoring module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotnessFactor {
    AskedAboutPricing,
    CheckedAvailability,
    ProvidedContactInfo,
    HighIntentPage,
    UrgencyLanguage,
}

impl HotnessFactor {
    /// Human-readable description used in explanations. Must never
    /// include numbers or point values.
    pub fn description(&self) -> &'static str {
        match self {
            HotnessFactor::AskedAboutPricing => "asked about pricing",
            HotnessFactor::CheckedAvailability => "checked availability",
            HotnessFactor::ProvidedContactInfo => "shared contact information",
            HotnessFactor::HighIntentPage => "arrived from a high-intent page",
            HotnessFactor::UrgencyLanguage => "used urgent language",
        }
    }
}

/// Classified conversation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserIntent {
    Sales,
    Booking,
    Question,
    Support,
    #[default]
    Unknown,
}

impl UserIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntent::Sales => "sales",
            UserIntent::Booking => "booking",
            UserIntent::Question => "question",
            UserIntent::Support => "support",
            UserIntent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UserIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recommended next step for the team reviewing the lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    CallImmediately,
    FollowUpToday,
    AddToNurture,
}

/// Structured output for the external lead-capture collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
    pub hotness: Hotness,
    pub hotness_factors: Vec<HotnessFactor>,
    pub intent: UserIntent,
    pub suggested_action: SuggestedAction,
    pub escalation_reason: Option<String>,
    /// Full conversation transcript
    pub transcript: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_descriptions_have_no_digits() {
        let factors = [
            HotnessFactor::AskedAboutPricing,
            HotnessFactor::CheckedAvailability,
            HotnessFactor::ProvidedContactInfo,
            HotnessFactor::HighIntentPage,
            HotnessFactor::UrgencyLanguage,
        ];
        for f in factors {
            assert!(!f.description().chars().any(|c| c.is_ascii_digit()));
            assert!(!f.description().to_lowercase().contains("score"));
        }
    }
}
