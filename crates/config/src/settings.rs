//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{AgentConfig, ConfigError};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means localhost-only
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Idle seconds before a session is swept
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// Load settings from an optional TOML file plus INTAKE_AGENT_ env vars.
///
/// Environment variables override file values, e.g.
/// `INTAKE_AGENT_SERVER__PORT=9090`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(Environment::with_prefix("INTAKE_AGENT").separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    if settings.agent.assist.monthly_budget_usd < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "agent.assist.monthly_budget_usd".to_string(),
            message: "must be non-negative".to_string(),
        });
    }
    if settings.agent.scheduling.slot_times.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "agent.scheduling.slot_times".to_string(),
            message: "must list at least one daily time".to_string(),
        });
    }

    tracing::info!(
        host = %settings.server.host,
        port = settings.server.port,
        "settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.agent.discovery_turn_cap, 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 9999

            [agent]
            name = "Sam"
            "#
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.agent.name, "Sam");
    }

    #[test]
    fn test_empty_slot_times_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [agent.scheduling]
            slot_times = []
            "#
        )
        .unwrap();

        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file_errors() {
        let err = load_settings(Some(Path::new("/nonexistent/agent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
