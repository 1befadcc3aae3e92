mod action;
mod observability;

pub use action::*;
pub use observability::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub action: ActionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load the config from a TOML file, then apply `AI_ACTION_*`
    /// environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            Self::from_toml(&raw)
                .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.action.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a config from a TOML string (no environment overrides).
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let required = [
            ("action.provider", &self.action.provider),
            ("action.model", &self.action.model),
            ("action.queue", &self.action.queue),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }

        if self.action.max_tokens == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "action.max_tokens".into(),
                message: "max_tokens must be greater than 0".into(),
            });
        } else if self.action.max_tokens > MAX_TOKENS_WARN_ABOVE {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "action.max_tokens".into(),
                message: format!(
                    "max_tokens {} exceeds the output limit of most models",
                    self.action.max_tokens
                ),
            });
        }

        errors
    }
}

const MAX_TOKENS_WARN_ABOVE: u32 = 200_000;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}
