//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use intake_agent_agent::intents::RuleBasedClassifier;
use intake_agent_agent::router::RouterDeps;
use intake_agent_config::Settings;
use intake_agent_core::{CompletionModel, LeadSink};
use intake_agent_llm::{AssistLayer, HttpCompletionModel, InMemoryCostTracker};

use crate::session::SessionRegistry;
use crate::ServerError;

/// Everything the handlers need, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub deps: Arc<RouterDeps>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings, sink: Arc<dyn LeadSink>) -> Result<Self, ServerError> {
        let agent = settings.agent.clone();

        // Without an API key against the public default endpoint every
        // call would fail anyway; run deterministic-only instead.
        let model: Option<Arc<dyn CompletionModel>> = if agent.completion.api_key.is_some()
            || agent.completion.endpoint != intake_agent_config::CompletionConfig::default().endpoint
        {
            let backend = HttpCompletionModel::new(agent.completion.clone())?;
            tracing::info!(model = backend.model_name(), "completion backend enabled");
            Some(Arc::new(backend))
        } else {
            tracing::warn!("no completion API key configured, running deterministic-only");
            None
        };

        let tracker = Arc::new(InMemoryCostTracker::new(
            agent.assist.monthly_budget_usd,
            agent.assist.price_per_1k_tokens_usd,
        ));

        let assist = AssistLayer::new(
            model,
            tracker,
            Arc::new(RuleBasedClassifier),
            agent.assist.clone(),
            agent.completion.temperature,
            agent.name.clone(),
        );

        let registry = Arc::new(SessionRegistry::new(Duration::from_secs(
            settings.server.session_idle_secs,
        )));

        Ok(Self {
            registry,
            deps: Arc::new(RouterDeps {
                assist,
                sink,
                config: agent,
            }),
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemoryLeadSink;

    #[test]
    fn test_default_settings_build_deterministic_state() {
        let state = AppState::new(Settings::default(), Arc::new(InMemoryLeadSink::new())).unwrap();
        assert!(state.registry.is_empty());
        assert_eq!(state.deps.config.name, "Avery");
    }
}
