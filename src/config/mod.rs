//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COMPLIANCE_MAPPER_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use compliance_mapper::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod error;
mod knowledge_base;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use knowledge_base::KnowledgeBaseConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the analysis engine. Load using
/// [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Knowledge base configuration (SCF backend)
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `COMPLIANCE_MAPPER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COMPLIANCE_MAPPER__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key = ...`
    /// - `COMPLIANCE_MAPPER__KNOWLEDGE_BASE__BASE_URL=...` -> `knowledge_base.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COMPLIANCE_MAPPER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.knowledge_base.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("COMPLIANCE_MAPPER__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
    }

    fn clear_env() {
        env::remove_var("COMPLIANCE_MAPPER__AI__ANTHROPIC_API_KEY");
        env::remove_var("COMPLIANCE_MAPPER__KNOWLEDGE_BASE__BASE_URL");
        env::remove_var("COMPLIANCE_MAPPER__KNOWLEDGE_BASE__TOP_K");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.anthropic_api_key.as_deref(), Some("sk-ant-xxx"));
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_knowledge_base_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.knowledge_base.base_url, "http://localhost:8001");
        assert_eq!(config.knowledge_base.timeout_secs, 10);
        assert_eq!(config.knowledge_base.top_k, 5);
    }

    #[test]
    fn test_custom_knowledge_base_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var(
            "COMPLIANCE_MAPPER__KNOWLEDGE_BASE__BASE_URL",
            "http://scf.internal:9000",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.knowledge_base.base_url, "http://scf.internal:9000");
    }
}
