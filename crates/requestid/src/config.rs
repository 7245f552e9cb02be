//! Declarative tracer configuration.

use serde::Deserialize;
use uuid::Uuid;

use crate::key::Key;
use crate::options::{with_id_generator, with_tracer_key, TracerOption};
use crate::tracer::Tracer;

/// Errors raised when validating a [`TracerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tracer key must not be empty")]
    EmptyKey,
}

/// Tracer settings loadable from a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TracerConfig {
    /// Context key request ids are stored under.
    #[serde(default = "default_key")]
    pub key: String,

    /// Textual form of generated ids.
    #[serde(default)]
    pub id_format: IdFormat,
}

/// Textual form of a generated UUID v4.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdFormat {
    /// `67e55044-10b1-426f-9247-bb680e5fe0c8`
    #[default]
    Hyphenated,
    /// `67e5504410b1426f9247bb680e5fe0c8`
    Simple,
    /// `urn:uuid:67e55044-10b1-426f-9247-bb680e5fe0c8`
    Urn,
}

impl IdFormat {
    pub fn generate(self) -> String {
        let id = Uuid::new_v4();
        match self {
            IdFormat::Hyphenated => id.hyphenated().to_string(),
            IdFormat::Simple => id.simple().to_string(),
            IdFormat::Urn => id.urn().to_string(),
        }
    }
}

fn default_key() -> String {
    "request-id".to_string()
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            id_format: IdFormat::default(),
        }
    }
}

impl TracerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(())
    }

    /// The options equivalent to this configuration.
    pub fn options(&self) -> Vec<TracerOption> {
        let format = self.id_format;
        vec![
            with_tracer_key(Key::new(self.key.clone())),
            with_id_generator(move || format.generate()),
        ]
    }

    /// Validates the configuration and builds a tracer from it.
    pub fn build(&self) -> Result<Tracer, ConfigError> {
        self.validate()?;
        Ok(Tracer::new(self.options()))
    }
}
