//! Charcount engine: binds text sources to the counting pipeline, runs the
//! reconciliation timer and publishes feedback.
mod clock;
mod config;
mod engine;
mod error;
mod publisher;
mod sink;
mod source;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{parse_policy, ConfigError, EngineConfig};
pub use engine::{BindingHandle, Engine};
pub use error::EngineError;
pub use publisher::{FeedbackPublisher, Subscriber, SubscriptionId};
pub use sink::{Announcement, AnnouncementSink, FeedbackSinks, StatusUpdate, VisualStatusSink};
pub use source::{ListenerId, MemoryTextSource, SourceEvent, SourceListener, TextSource};
pub use timer::{ManualScheduler, Scheduler, TickFn, TimerHandle, TokioScheduler};
