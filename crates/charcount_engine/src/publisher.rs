use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use charcount_core::{CountResult, Feedback, Message};

use crate::{Announcement, BindingHandle, FeedbackSinks, StatusUpdate};

pub type Subscriber = Arc<dyn Fn(BindingHandle, &CountResult, &Message, bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fans feedback out to a binding's sinks and to every subscriber.
#[derive(Default)]
pub struct FeedbackPublisher {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
}

impl FeedbackPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push((id, subscriber));
        }
        id
    }

    /// Returns whether a subscriber was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.subscribers.lock() {
            Ok(mut subscribers) => {
                let before = subscribers.len();
                subscribers.retain(|(existing, _)| *existing != id);
                subscribers.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn publish(&self, handle: BindingHandle, sinks: &FeedbackSinks, feedback: &Feedback) {
        let Feedback {
            result,
            message,
            visible,
        } = feedback;

        if let Some(visual) = &sinks.visual {
            visual.update(StatusUpdate {
                text: message.text.clone(),
                visible: *visible,
                is_over_limit: message.is_over_limit,
            });
        }
        if let Some(announcer) = &sinks.announcer {
            announcer.announce(Announcement {
                text: message.text.clone(),
                suppressed: !visible,
            });
        }

        // Subscribers may call back into the engine, so never hold the lock.
        let subscribers: Vec<Subscriber> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers.iter().map(|(_, s)| s.clone()).collect(),
            Err(_) => return,
        };
        for subscriber in subscribers {
            subscriber(handle, result, message, *visible);
        }
    }
}
