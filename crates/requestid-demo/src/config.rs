//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use requestid::TracerConfig;
use requestid_tracing::TracingConfig;
use serde::Deserialize;

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracer: TracerConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:3090".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (REQUESTID_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("REQUESTID_").split("__"))
            .extract()?;

        config.tracer.validate()?;

        Ok(config)
    }
}
