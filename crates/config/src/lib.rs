//! Configuration management for the intake conversation engine
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (INTAKE_AGENT_ prefix)
//! - Runtime overrides

pub mod agent;
pub mod settings;

pub use agent::{AgentConfig, AssistConfig, CompletionConfig, SchedulingConfig};
pub use settings::{load_settings, ServerConfig, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
