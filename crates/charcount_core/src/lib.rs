//! Charcount core: pure counting, feedback formatting and the reconciler state machine.
mod counter;
mod effect;
mod feedback;
mod message;
mod msg;
mod policy;
mod state;
mod threshold;
mod update;

pub use counter::{count, CharacterCounter, CountMode, TextCounter, WordCounter};
pub use effect::Effect;
pub use feedback::{evaluate, CountResult, Feedback};
pub use message::{format, limit_hint, Message, Unit};
pub use msg::Msg;
pub use policy::{CountPolicy, Limit, PolicyError, PolicyOptions};
pub use state::{BindingState, CountState, Millis, Phase, ReconcileTiming};
pub use threshold::is_visible;
pub use update::update;
