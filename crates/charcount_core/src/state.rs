use serde::{Deserialize, Serialize};

use crate::{CountPolicy, Feedback};

/// Milliseconds on the engine's clock.
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileTiming {
    pub poll_interval_ms: Millis,
    pub debounce_window_ms: Millis,
}

impl Default for ReconcileTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            debounce_window_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not bound to any input.
    #[default]
    Idle,
    /// Bound, not polling.
    Blurred,
    /// Bound and focused; the reconciliation timer is running.
    Focused,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountState {
    /// Most recent value observed from the source.
    pub live_text: String,
    /// Value the last published feedback was computed from.
    pub last_known_text: String,
    pub last_edit_at: Option<Millis>,
}

/// Per-input state. Never shared between bound inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingState {
    policy: CountPolicy,
    timing: ReconcileTiming,
    phase: Phase,
    text: CountState,
    feedback: Option<Feedback>,
}

impl BindingState {
    pub fn new(policy: CountPolicy, timing: ReconcileTiming) -> Self {
        Self {
            policy,
            timing,
            phase: Phase::Idle,
            text: CountState::default(),
            feedback: None,
        }
    }

    pub fn policy(&self) -> &CountPolicy {
        &self.policy
    }

    pub fn timing(&self) -> ReconcileTiming {
        self.timing
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn count_state(&self) -> &CountState {
        &self.text
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn count_state_mut(&mut self) -> &mut CountState {
        &mut self.text
    }

    pub(crate) fn set_feedback(&mut self, feedback: Option<Feedback>) {
        self.feedback = feedback;
    }

    /// Drops everything observed from the source.
    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.text = CountState::default();
        self.feedback = None;
    }
}
