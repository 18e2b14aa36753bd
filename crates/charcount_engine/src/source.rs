use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Notifications a text source delivers to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    Edit,
    Focus,
    Blur,
}

pub type SourceListener = Arc<dyn Fn(SourceEvent) + Send + Sync>;

/// Registration returned by `TextSource::listen`, used to detach the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// The bounded input as seen by the engine.
///
/// Implementations must not invoke listeners while holding a lock that
/// `value` also needs.
pub trait TextSource: Send + Sync {
    fn value(&self) -> String;
    fn listen(&self, listener: SourceListener) -> ListenerId;
    /// Detaches a listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);
}

/// In-memory source for hosts without a native input and for tests.
#[derive(Default)]
pub struct MemoryTextSource {
    value: Mutex<String>,
    next_listener: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, SourceListener)>>,
}

impl MemoryTextSource {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(initial.into()),
            next_listener: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the value and fires an edit notification.
    pub fn edit(&self, text: impl Into<String>) {
        self.set_silently(text);
        self.emit(SourceEvent::Edit);
    }

    /// Replaces the value without notifying anyone, like autofill or dictation.
    pub fn set_silently(&self, text: impl Into<String>) {
        if let Ok(mut value) = self.value.lock() {
            *value = text.into();
        }
    }

    pub fn focus(&self) {
        self.emit(SourceEvent::Focus);
    }

    pub fn blur(&self) {
        self.emit(SourceEvent::Blur);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    fn emit(&self, event: SourceEvent) {
        let listeners: Vec<SourceListener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| l.clone()).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(event);
        }
    }
}

impl TextSource for MemoryTextSource {
    fn value(&self) -> String {
        self.value
            .lock()
            .map(|value| value.clone())
            .unwrap_or_default()
    }

    fn listen(&self, listener: SourceListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, listener));
        }
        id
    }

    fn unlisten(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(existing, _)| *existing != id);
        }
    }
}
