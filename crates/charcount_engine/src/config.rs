use charcount_core::{CountPolicy, PolicyError, PolicyOptions, ReconcileTiming};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid count policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("invalid timing: {0}")]
    InvalidTiming(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timing: ReconcileTiming,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parses bind-time options such as `{"maxlength": 10, "threshold": 75}`.
pub fn parse_policy(raw: &str) -> Result<CountPolicy, ConfigError> {
    let options: PolicyOptions = serde_json::from_str(raw)?;
    Ok(CountPolicy::from_options(&options)?)
}
