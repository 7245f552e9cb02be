//! Tracing configuration types.

use serde::Deserialize;

/// Configuration for the log subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Log level filter (e.g. "info", "debug", "requestid=debug,info").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format of the fmt layer.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path) in each line.
    #[serde(default = "default_true")]
    pub with_target: bool,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            format: LogFormat::default(),
            with_target: default_true(),
        }
    }
}
