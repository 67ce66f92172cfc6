use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful coding assistant embedded in a VS Code-like environment. Keep responses concise and technical.";

/// Process-wide agent settings, read once at startup.
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    /// Gemini API key. Sends fail (and show the placeholder reply) without it.
    pub api_key: Option<String>,

    /// Model name, e.g. `gemini-2.5-flash`
    #[validate(length(min = 1))]
    pub model: String,

    /// System instruction attached to every chat session
    #[validate(length(min = 1))]
    pub system_instruction: String,

    /// Base URL of the generative language API
    #[validate(url)]
    pub api_base: String,

    /// Per-request timeout
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,

    /// Upper bound on live chat sessions; unset keeps every session
    #[validate(range(min = 1))]
    pub max_sessions: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Environment overrides: WORKBENCH__MODEL, WORKBENCH__API_KEY, etc.
        let environment = config::Environment::with_prefix("WORKBENCH")
            .prefix_separator("__")
            .separator("__");
        let fallback_key = std::env::var("API_KEY")
            .ok()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        Self::load_from(environment, fallback_key)
    }

    fn load_from(
        environment: config::Environment,
        fallback_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("model", "gemini-2.5-flash")?
            .set_default("system_instruction", DEFAULT_SYSTEM_INSTRUCTION)?
            .set_default("api_base", "https://generativelanguage.googleapis.com")?
            .set_default("request_timeout_secs", 60u64)?
            .set_default("log_filter", "workbench=info")?
            .add_source(environment)
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;
        cfg.api_key = cfg
            .api_key
            .or(fallback_key)
            .filter(|key| !key.trim().is_empty());
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Environment::with_prefix("WORKBENCH")
            .prefix_separator("__")
            .separator("__")
            .source(Some(map))
    }

    #[test]
    fn defaults_apply_without_environment() {
        let cfg = Config::load_from(environment(&[]), None).expect("defaults should load");
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.api_base, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.request_timeout_secs, 60);
        assert_eq!(cfg.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let cfg = Config::load_from(
            environment(&[
                ("WORKBENCH__MODEL", "gemini-2.0-pro"),
                ("WORKBENCH__API_KEY", "prefixed-key"),
                ("WORKBENCH__REQUEST_TIMEOUT_SECS", "15"),
            ]),
            Some("fallback-key".to_string()),
        )
        .expect("overrides should load");
        assert_eq!(cfg.model, "gemini-2.0-pro");
        assert_eq!(cfg.api_key.as_deref(), Some("prefixed-key"));
        assert_eq!(cfg.request_timeout_secs, 15);
    }

    #[test]
    fn fallback_key_used_when_prefixed_key_missing() {
        let cfg = Config::load_from(environment(&[]), Some("plain-key".to_string()))
            .expect("fallback key should load");
        assert_eq!(cfg.api_key.as_deref(), Some("plain-key"));

        let blank = Config::load_from(environment(&[]), Some("   ".to_string()))
            .expect("blank key should load");
        assert!(blank.api_key.is_none());
    }

    #[test]
    fn session_limit_is_optional_and_positive() {
        let unbounded = Config::load_from(environment(&[]), None).expect("defaults should load");
        assert_eq!(unbounded.max_sessions, None);

        let capped = Config::load_from(environment(&[("WORKBENCH__MAX_SESSIONS", "8")]), None)
            .expect("limit should load");
        assert_eq!(capped.max_sessions, Some(8));

        let zero = Config::load_from(environment(&[("WORKBENCH__MAX_SESSIONS", "0")]), None);
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn out_of_range_timeout_is_rejected() {
        let result = Config::load_from(
            environment(&[("WORKBENCH__REQUEST_TIMEOUT_SECS", "0")]),
            None,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
