use crate::{Feedback, Millis};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTimer { interval_ms: Millis },
    /// Cancel the reconciliation timer; a no-op if none is running.
    CancelTimer,
    Publish(Feedback),
}
