//! Agent configuration

use serde::{Deserialize, Serialize};

/// Top-level agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name used in the one-shot introduction
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Completion-assisted discovery turns before forcing intake
    #[serde(default = "default_discovery_cap")]
    pub discovery_turn_cap: u32,

    /// Completion service configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Assist-layer gating configuration
    #[serde(default)]
    pub assist: AssistConfig,

    /// Scheduling slot generation
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

fn default_agent_name() -> String {
    "Avery".to_string()
}
fn default_discovery_cap() -> u32 {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            discovery_turn_cap: default_discovery_cap(),
            completion: CompletionConfig::default(),
            assist: AssistConfig::default(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Model name/ID
    #[serde(default = "default_model")]
    pub model: String,

    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (optional for local endpoints)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds; a timeout is treated like a failed
    /// call and falls back to the deterministic path
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    8
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

/// Assist-layer gating: hard caps on calls, tokens, and spend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Maximum completion calls per user message
    #[serde(default = "default_max_calls")]
    pub max_calls_per_message: u32,

    /// Output-token cap for the intent-classification call
    #[serde(default = "default_intent_tokens")]
    pub intent_max_tokens: u32,

    /// Output-token cap for the response-generation call
    #[serde(default = "default_response_tokens")]
    pub response_max_tokens: u32,

    /// Input truncated to this many characters before prompting
    #[serde(default = "default_input_chars")]
    pub max_input_chars: usize,

    /// Minimum input length worth a completion call
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,

    /// Monthly spend cap in dollars; once exceeded every call is
    /// skipped in favor of the deterministic fallback
    #[serde(default = "default_monthly_budget")]
    pub monthly_budget_usd: f64,

    /// Price per 1k tokens used by the cost tracker
    #[serde(default = "default_price_per_1k")]
    pub price_per_1k_tokens_usd: f64,
}

fn default_max_calls() -> u32 {
    2
}
fn default_intent_tokens() -> u32 {
    10
}
fn default_response_tokens() -> u32 {
    150
}
fn default_input_chars() -> usize {
    200
}
fn default_min_input_chars() -> usize {
    3
}
fn default_monthly_budget() -> f64 {
    50.0
}
fn default_price_per_1k() -> f64 {
    0.002
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            max_calls_per_message: default_max_calls(),
            intent_max_tokens: default_intent_tokens(),
            response_max_tokens: default_response_tokens(),
            max_input_chars: default_input_chars(),
            min_input_chars: default_min_input_chars(),
            monthly_budget_usd: default_monthly_budget(),
            price_per_1k_tokens_usd: default_price_per_1k(),
        }
    }
}

/// Scheduling slot generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Daily slot times, 24h "HH:MM" local
    #[serde(default = "default_slot_times")]
    pub slot_times: Vec<String>,

    /// Maximum slots offered per request
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
}

fn default_slot_times() -> Vec<String> {
    vec!["10:00".to_string(), "13:00".to_string(), "15:00".to_string()]
}
fn default_max_slots() -> usize {
    15
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_times: default_slot_times(),
            max_slots: default_max_slots(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.discovery_turn_cap, 3);
        assert_eq!(config.assist.max_calls_per_message, 2);
        assert_eq!(config.assist.intent_max_tokens, 10);
        assert_eq!(config.assist.response_max_tokens, 150);
        assert_eq!(config.assist.max_input_chars, 200);
        assert_eq!(config.scheduling.slot_times.len(), 3);
        assert_eq!(config.scheduling.max_slots, 15);
    }

    #[test]
    fn test_partial_toml_overlay() {
        let config: AgentConfig = toml::from_str(
            r#"
            name = "Jordan"

            [assist]
            monthly_budget_usd = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "Jordan");
        assert_eq!(config.assist.monthly_budget_usd, 10.0);
        // Untouched sections keep their defaults
        assert_eq!(config.assist.response_max_tokens, 150);
        assert_eq!(config.discovery_turn_cap, 3);
    }
}
