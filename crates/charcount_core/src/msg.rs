use crate::Millis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Input attached to the engine with its current value.
    Bound { text: String },
    /// Normal edit notification carrying the new value.
    Edited { text: String, at: Millis },
    /// Input gained focus.
    Focused,
    /// Input lost focus.
    Blurred,
    /// Reconciliation timer fired; `live` is the source value read at `now`.
    Tick { live: String, now: Millis },
    /// Input detached from the engine.
    Unbound,
}
