use std::sync::Arc;

/// What the visible status element should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub text: String,
    pub visible: bool,
    pub is_over_limit: bool,
}

/// What the live region should hold. The text is always current so it can be
/// announced without delay once `suppressed` clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub suppressed: bool,
}

pub trait VisualStatusSink: Send + Sync {
    fn update(&self, status: StatusUpdate);
}

pub trait AnnouncementSink: Send + Sync {
    fn announce(&self, announcement: Announcement);
}

/// Output sinks owned by one binding. Either may be absent.
#[derive(Clone, Default)]
pub struct FeedbackSinks {
    pub visual: Option<Arc<dyn VisualStatusSink>>,
    pub announcer: Option<Arc<dyn AnnouncementSink>>,
}

impl FeedbackSinks {
    pub fn new(visual: Arc<dyn VisualStatusSink>, announcer: Arc<dyn AnnouncementSink>) -> Self {
        Self {
            visual: Some(visual),
            announcer: Some(announcer),
        }
    }
}
