//! The assist layer: bounded, gated completion calls with fallback
//!
//! At most two completion calls happen per user message: one cheap
//! intent classification (10 output tokens) and one response generation
//! (150 output tokens). Input is truncated before prompting. Skip
//! conditions and the monthly budget cap route straight to the
//! deterministic fallback; so does any call failure or timeout. The
//! user never sees a provider error.

use std::sync::Arc;

use intake_agent_config::AssistConfig;
use intake_agent_core::{CompletionModel, IntakeMode, Lexicon, SessionData, UserIntent};

use crate::budget::CostTracker;

/// Deterministic intent classifier used whenever the completion service
/// is skipped or fails. Implemented by the rule-based intent engine.
pub trait FallbackClassifier: Send + Sync {
    fn classify(&self, text: &str) -> UserIntent;
}

/// Result of one assisted turn
#[derive(Debug, Clone)]
pub struct AssistOutcome {
    /// Response text (generated or fallback)
    pub message: String,
    /// Classified intent for this message
    pub intent: UserIntent,
    /// True when the response came from the completion service
    pub used_completion: bool,
    /// True when a completion call was attempted and failed. Skipped
    /// calls (gating, budget) do not set this.
    pub attempt_failed: bool,
}

/// Bounded wrapper around the completion service
pub struct AssistLayer {
    model: Option<Arc<dyn CompletionModel>>,
    tracker: Arc<dyn CostTracker>,
    classifier: Arc<dyn FallbackClassifier>,
    config: AssistConfig,
    temperature: f32,
    agent_name: String,
}

impl AssistLayer {
    pub fn new(
        model: Option<Arc<dyn CompletionModel>>,
        tracker: Arc<dyn CostTracker>,
        classifier: Arc<dyn FallbackClassifier>,
        config: AssistConfig,
        temperature: f32,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            model,
            tracker,
            classifier,
            config,
            temperature,
            agent_name: agent_name.into(),
        }
    }

    /// Whether this input should never reach the completion service
    fn should_skip(&self, input: &str, session: &SessionData) -> bool {
        let lex = Lexicon::current();
        if input.trim().len() < self.config.min_input_chars {
            return true;
        }
        if Lexicon::matches_exact(input, lex.greetings)
            || Lexicon::matches_exact(input, lex.pleasantries)
        {
            return true;
        }
        // Structured field collection is fully deterministic
        session.intake.mode == IntakeMode::IntakeActive
    }

    /// Process one diagnostic message
    pub async fn assist(&self, input: &str, session: &SessionData) -> AssistOutcome {
        if self.should_skip(input, session) {
            let intent = self.classifier.classify(input);
            return AssistOutcome {
                message: fallback_sentence(intent).to_string(),
                intent,
                used_completion: false,
                attempt_failed: false,
            };
        }

        if self.tracker.is_exhausted() {
            // Policy stop, not an error: same path as a failure but
            // logged distinctly.
            tracing::info!("monthly completion budget reached, using deterministic fallback");
            let intent = self.classifier.classify(input);
            return AssistOutcome {
                message: fallback_sentence(intent).to_string(),
                intent,
                used_completion: false,
                attempt_failed: false,
            };
        }

        let Some(ref model) = self.model else {
            let intent = self.classifier.classify(input);
            return AssistOutcome {
                message: fallback_sentence(intent).to_string(),
                intent,
                used_completion: false,
                attempt_failed: false,
            };
        };

        let truncated: String = input.chars().take(self.config.max_input_chars).collect();
        let mut calls_made = 0u32;

        // Call 1: intent classification, tightly capped.
        let intent = if calls_made < self.config.max_calls_per_message {
            calls_made += 1;
            match model
                .complete(
                    INTENT_SYSTEM_PROMPT,
                    &truncated,
                    self.config.intent_max_tokens,
                    0.0,
                )
                .await
            {
                Ok(output) => {
                    self.tracker.record_usage(output.tokens_used);
                    parse_intent(&output.text)
                        .unwrap_or_else(|| self.classifier.classify(&truncated))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "intent classification call failed");
                    self.classifier.classify(&truncated)
                }
            }
        } else {
            self.classifier.classify(&truncated)
        };

        // Call 2: response generation. The second call depends on the
        // first's intent output, so they are sequential by design.
        if calls_made < self.config.max_calls_per_message {
            let system = response_system_prompt(&self.agent_name, intent);
            match model
                .complete(
                    &system,
                    &truncated,
                    self.config.response_max_tokens,
                    self.temperature,
                )
                .await
            {
                Ok(output) => {
                    self.tracker.record_usage(output.tokens_used);
                    return AssistOutcome {
                        message: output.text.trim().to_string(),
                        intent,
                        used_completion: true,
                        attempt_failed: false,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, "response generation call failed, falling back");
                    return AssistOutcome {
                        message: fallback_sentence(intent).to_string(),
                        intent,
                        used_completion: false,
                        attempt_failed: true,
                    };
                }
            }
        }

        AssistOutcome {
            message: fallback_sentence(intent).to_string(),
            intent,
            used_completion: false,
            attempt_failed: false,
        }
    }
}

const INTENT_SYSTEM_PROMPT: &str = "Classify the visitor's message about starting a business. \
Reply with exactly one word: sales, booking, question, support, or unknown.";

fn response_system_prompt(agent_name: &str, intent: UserIntent) -> String {
    format!(
        "You are {agent_name}, a friendly business-formation intake assistant. \
Answer the visitor's message helpfully in two to three short sentences, \
then gently point them toward a free consultation. \
The visitor's classified intent is: {intent}. \
Never discuss pricing specifics or give legal advice."
    )
}

fn parse_intent(text: &str) -> Option<UserIntent> {
    let first = text.trim().to_lowercase();
    let word = first.split_whitespace().next()?.trim_matches(['.', ',', '!']);
    match word {
        "sales" => Some(UserIntent::Sales),
        "booking" => Some(UserIntent::Booking),
        "question" => Some(UserIntent::Question),
        "support" => Some(UserIntent::Support),
        "unknown" => Some(UserIntent::Unknown),
        _ => None,
    }
}

/// Fixed per-intent fallback copy. Calm and on-brand; no internals leak.
pub fn fallback_sentence(intent: UserIntent) -> &'static str {
    match intent {
        UserIntent::Sales => {
            "Happy to walk you through our packages on a quick call — a free consultation is the fastest way to get exact details for your situation."
        }
        UserIntent::Booking => {
            "I can get a consultation on the calendar for you. Just say the word and we'll pick a time."
        }
        UserIntent::Question => {
            "Great question. The short answer depends on your business specifics, and a free consultation is the best way to get it answered properly."
        }
        UserIntent::Support => {
            "Sorry you're running into trouble. Let me connect you with our team — a quick consultation will get this sorted."
        }
        UserIntent::Unknown => {
            "I help people get their business set up the right way. Tell me a bit about what you're working on, or we can jump straight to a free consultation."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockCompletionModel;
    use crate::budget::InMemoryCostTracker;

    struct KeywordClassifier;

    impl FallbackClassifier for KeywordClassifier {
        fn classify(&self, text: &str) -> UserIntent {
            if text.to_lowercase().contains("cost") {
                UserIntent::Sales
            } else {
                UserIntent::Unknown
            }
        }
    }

    fn layer(model: Option<Arc<dyn CompletionModel>>, cap_usd: f64) -> AssistLayer {
        AssistLayer::new(
            model,
            Arc::new(InMemoryCostTracker::new(cap_usd, 1.0)),
            Arc::new(KeywordClassifier),
            AssistConfig::default(),
            0.7,
            "Avery",
        )
    }

    #[tokio::test]
    async fn test_short_input_skips_completion() {
        let model = Arc::new(MockCompletionModel::new(vec!["question", "generated"]));
        let layer = layer(Some(model), 50.0);
        let out = layer.assist("ok", &SessionData::new()).await;
        assert!(!out.used_completion);
        assert!(!out.attempt_failed);
    }

    #[tokio::test]
    async fn test_exact_greeting_skips_completion() {
        let model = Arc::new(MockCompletionModel::new(vec!["question", "generated"]));
        let layer = layer(Some(model), 50.0);
        let out = layer.assist("hello", &SessionData::new()).await;
        assert!(!out.used_completion);
    }

    #[tokio::test]
    async fn test_two_call_happy_path() {
        let model = Arc::new(MockCompletionModel::new(vec![
            "booking",
            "Sure, let's find you a time.",
        ]));
        let layer = layer(Some(model), 50.0);
        let out = layer
            .assist("can I schedule a consultation for next week", &SessionData::new())
            .await;
        assert!(out.used_completion);
        assert_eq!(out.intent, UserIntent::Booking);
        assert_eq!(out.message, "Sure, let's find you a time.");
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_flags_attempt() {
        let model = Arc::new(MockCompletionModel::failing());
        let layer = layer(Some(model), 50.0);
        let out = layer
            .assist("how much does an LLC cost to set up", &SessionData::new())
            .await;
        assert!(!out.used_completion);
        assert!(out.attempt_failed);
        assert_eq!(out.intent, UserIntent::Sales);
        assert_eq!(out.message, fallback_sentence(UserIntent::Sales));
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_policy_skip_not_failure() {
        let model = Arc::new(MockCompletionModel::new(vec!["sales", "generated"]));
        let layer = layer(Some(model), 0.0);
        let out = layer
            .assist("how much does it cost to incorporate", &SessionData::new())
            .await;
        assert!(!out.used_completion);
        assert!(!out.attempt_failed);
        assert_eq!(out.intent, UserIntent::Sales);
    }

    #[tokio::test]
    async fn test_field_collection_state_skips() {
        let model = Arc::new(MockCompletionModel::new(vec!["question", "generated"]));
        let layer = layer(Some(model), 50.0);
        let mut session = SessionData::new();
        session.intake.mode = IntakeMode::IntakeActive;
        session.intake.current_field = Some(intake_agent_core::FieldId::Email);
        let out = layer.assist("my email is a@b.com and more text", &session).await;
        assert!(!out.used_completion);
    }

    #[test]
    fn test_parse_intent_tolerates_punctuation() {
        assert_eq!(parse_intent("Booking."), Some(UserIntent::Booking));
        assert_eq!(parse_intent("  sales\n"), Some(UserIntent::Sales));
        assert_eq!(parse_intent("I think it's sales"), None);
    }
}
