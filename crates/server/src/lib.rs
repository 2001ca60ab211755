//! HTTP server for the intake conversation engine
//!
//! Features:
//! - Session registry with idle sweeping
//! - REST chat endpoints (create session, send message, inspect, delete)
//! - In-memory lead sink (swap for a real store behind the trait)

pub mod http;
pub mod session;
pub mod sink;
pub mod state;

pub use session::{spawn_idle_sweeper, SessionRegistry};
pub use sink::InMemoryLeadSink;
pub use state::AppState;

use thiserror::Error;

/// Server startup and wiring errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] intake_agent_config::ConfigError),

    #[error("completion backend error: {0}")]
    Llm(#[from] intake_agent_llm::LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
