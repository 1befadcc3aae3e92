use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Action execution defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Defaults applied to every action execution.
///
/// An action's own `provider()` / `model()` take precedence over
/// `provider` / `model` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Provider key used when the action does not name one.
    #[serde(default = "d_provider")]
    pub provider: String,
    /// Model id used when the action does not name one.
    #[serde(default = "d_model")]
    pub model: String,
    /// Queue that background jobs are submitted to.
    #[serde(default = "d_queue")]
    pub queue: String,
    /// Generation cap passed through on every provider request.
    #[serde(default = "d_2048")]
    pub max_tokens: u32,
    /// Emit an `ai-action.executed` trace event after each successful run.
    #[serde(default)]
    pub logging: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            provider: d_provider(),
            model: d_model(),
            queue: d_queue(),
            max_tokens: 2048,
            logging: false,
        }
    }
}

impl ActionConfig {
    /// Apply `AI_ACTION_*` overrides.  `lookup` abstracts the environment so
    /// tests don't have to mutate process state.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = non_empty(lookup("AI_ACTION_PROVIDER")) {
            self.provider = v;
        }
        if let Some(v) = non_empty(lookup("AI_ACTION_MODEL")) {
            self.model = v;
        }
        if let Some(v) = non_empty(lookup("AI_ACTION_QUEUE")) {
            self.queue = v;
        }
        if let Some(v) = non_empty(lookup("AI_ACTION_MAX_TOKENS")) {
            self.max_tokens = v.trim().parse().map_err(|_| {
                Error::Config(format!("AI_ACTION_MAX_TOKENS is not a number: {v:?}"))
            })?;
        }
        if let Some(v) = non_empty(lookup("AI_ACTION_LOGGING")) {
            self.logging = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(())
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn d_provider() -> String {
    "anthropic".into()
}

fn d_model() -> String {
    "claude-sonnet-4-20250514".into()
}

fn d_queue() -> String {
    "default".into()
}

fn d_2048() -> u32 {
    2048
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_every_field() {
        let mut cfg = ActionConfig::default();
        cfg.apply_env(env(&[
            ("AI_ACTION_PROVIDER", "openai"),
            ("AI_ACTION_MODEL", "gpt-4o"),
            ("AI_ACTION_QUEUE", "ai"),
            ("AI_ACTION_MAX_TOKENS", "512"),
            ("AI_ACTION_LOGGING", "yes"),
        ]))
        .unwrap();

        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.queue, "ai");
        assert_eq!(cfg.max_tokens, 512);
        assert!(cfg.logging);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = ActionConfig::default();
        cfg.apply_env(env(&[("AI_ACTION_PROVIDER", "  ")])).unwrap();
        assert_eq!(cfg.provider, "anthropic");
    }

    #[test]
    fn bad_max_tokens_is_rejected() {
        let mut cfg = ActionConfig::default();
        let err = cfg
            .apply_env(env(&[("AI_ACTION_MAX_TOKENS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("AI_ACTION_MAX_TOKENS"));
    }

    #[test]
    fn logging_off_values() {
        let mut cfg = ActionConfig {
            logging: true,
            ..ActionConfig::default()
        };
        cfg.apply_env(env(&[("AI_ACTION_LOGGING", "false")])).unwrap();
        assert!(!cfg.logging);
    }
}
