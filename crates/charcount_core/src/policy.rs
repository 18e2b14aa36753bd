use serde::Deserialize;
use thiserror::Error;

use crate::CountMode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    /// Configured limits above `u32::MAX` are clamped to `u32::MAX`.
    Max(u32),
}

impl Limit {
    /// Non-positive configured limits resolve to `Unlimited`; limits beyond
    /// `u32::MAX` saturate.
    fn from_configured(value: i64) -> Self {
        if value <= 0 {
            Limit::Unlimited
        } else {
            Limit::Max(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

/// Options recognized at bind time, as supplied by the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyOptions {
    pub maxlength: Option<i64>,
    pub maxwords: Option<i64>,
    pub threshold: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPolicy {
    pub mode: CountMode,
    pub limit: Limit,
    pub threshold_percent: u8,
}

impl CountPolicy {
    pub fn characters(limit: u32) -> Self {
        Self {
            mode: CountMode::Characters,
            limit: Limit::Max(limit),
            threshold_percent: 0,
        }
    }

    pub fn words(limit: u32) -> Self {
        Self {
            mode: CountMode::Words,
            limit: Limit::Max(limit),
            threshold_percent: 0,
        }
    }

    pub fn with_threshold(mut self, threshold_percent: u8) -> Self {
        self.threshold_percent = threshold_percent.min(100);
        self
    }

    /// Resolves bind-time options. A present `maxwords` selects word mode and
    /// the character limit is ignored entirely.
    pub fn from_options(options: &PolicyOptions) -> Result<Self, PolicyError> {
        let threshold = options.threshold.unwrap_or(0);
        let threshold_percent = u8::try_from(threshold)
            .ok()
            .filter(|percent| *percent <= 100)
            .ok_or(PolicyError::ThresholdOutOfRange(threshold))?;

        let (mode, limit) = match (options.maxwords, options.maxlength) {
            (Some(words), _) => (CountMode::Words, Limit::from_configured(words)),
            (None, Some(chars)) => (CountMode::Characters, Limit::from_configured(chars)),
            (None, None) => (CountMode::Characters, Limit::Unlimited),
        };

        Ok(Self {
            mode,
            limit,
            threshold_percent,
        })
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == Limit::Unlimited
    }
}
