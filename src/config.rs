//! Engine configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults. Bad values are logged and replaced rather than failing startup.

use thiserror::Error;

/// Environment variable controlling the commit retry budget.
const MAX_COMMIT_RETRIES_VAR: &str = "AGORA_MAX_COMMIT_RETRIES";

/// Default number of optimistic-commit attempts per mutation.
const DEFAULT_MAX_COMMIT_RETRIES: u32 = 8;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many times a mutation re-reads and re-commits before giving up
    /// with `Unavailable`
    pub max_commit_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: DEFAULT_MAX_COMMIT_RETRIES,
        }
    }
}

impl EngineConfig {
    /// Create a new EngineConfigBuilder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load the configuration from the environment.
    ///
    /// Unset variables fall back to defaults; unparsable values are logged
    /// and replaced with the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(MAX_COMMIT_RETRIES_VAR) {
            match raw.parse::<u32>() {
                Ok(retries) if retries >= 1 => config.max_commit_retries = retries,
                _ => {
                    tracing::warn!(
                        "[Config] invalid {MAX_COMMIT_RETRIES_VAR}={raw}, using default {DEFAULT_MAX_COMMIT_RETRIES}"
                    );
                }
            }
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commit_retries == 0 {
            return Err(ConfigError::OutOfRange("max_commit_retries"));
        }
        Ok(())
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    max_commit_retries: Option<u32>,
}

impl EngineConfigBuilder {
    /// Set the commit retry budget
    pub fn max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = Some(retries);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig {
            max_commit_retries: self
                .max_commit_retries
                .unwrap_or(DEFAULT_MAX_COMMIT_RETRIES),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
}
