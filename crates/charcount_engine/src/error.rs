use thiserror::Error;

use crate::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no tokio runtime available to drive reconciliation timers")]
    NoRuntime,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
