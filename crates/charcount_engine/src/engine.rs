use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use charcount_core::{
    update, BindingState, CountPolicy, CountResult, Effect, Feedback, Message, Msg, Phase,
};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::{
    Clock, EngineConfig, EngineError, FeedbackPublisher, FeedbackSinks, ListenerId, Scheduler,
    SourceEvent, SubscriptionId, SystemClock, TextSource, TimerHandle, TokioScheduler,
};

/// Identifies one bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingHandle(u64);

impl fmt::Display for BindingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Binding {
    state: BindingState,
    source: Arc<dyn TextSource>,
    sinks: FeedbackSinks,
    timer: Option<TimerHandle>,
    listener: Option<ListenerId>,
}

#[derive(Default)]
struct Bindings {
    next_handle: u64,
    by_handle: HashMap<BindingHandle, Binding>,
}

impl Bindings {
    fn allocate(&mut self) -> BindingHandle {
        self.next_handle += 1;
        BindingHandle(self.next_handle)
    }
}

type Pending = Vec<(FeedbackSinks, Feedback)>;

struct Shared {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    publisher: FeedbackPublisher,
    bindings: Mutex<Bindings>,
}

impl Shared {
    fn lock_bindings(&self) -> MutexGuard<'_, Bindings> {
        self.bindings.lock().unwrap_or_else(|poisoned| {
            engine_error!("binding table lock poisoned; continuing with recovered state");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Returns `false` if `handle` is not bound.
    fn handle_event(self: &Arc<Self>, handle: BindingHandle, event: SourceEvent) -> bool {
        let pending = {
            let mut bindings = self.lock_bindings();
            let Some(binding) = bindings.by_handle.get_mut(&handle) else {
                return false;
            };
            let msg = match event {
                SourceEvent::Edit => Msg::Edited {
                    text: binding.source.value(),
                    at: self.clock.now_millis(),
                },
                SourceEvent::Focus => Msg::Focused,
                SourceEvent::Blur => Msg::Blurred,
            };
            self.step(handle, binding, msg)
        };
        self.publish_all(handle, pending);
        true
    }

    fn tick(self: &Arc<Self>, handle: BindingHandle) {
        let pending = {
            let mut bindings = self.lock_bindings();
            let Some(binding) = bindings.by_handle.get_mut(&handle) else {
                return;
            };
            let msg = Msg::Tick {
                live: binding.source.value(),
                now: self.clock.now_millis(),
            };
            self.step(handle, binding, msg)
        };
        if !pending.is_empty() {
            engine_info!("reconciled external change on input {}", handle);
        }
        self.publish_all(handle, pending);
    }

    fn step(self: &Arc<Self>, handle: BindingHandle, binding: &mut Binding, msg: Msg) -> Pending {
        let before = binding.state.phase();
        let (state, effects) = update(binding.state.clone(), msg);
        binding.state = state;
        let after = binding.state.phase();
        if before != after {
            engine_debug!("input {} {:?} -> {:?}", handle, before, after);
        }
        self.apply_effects(handle, binding, effects)
    }

    fn apply_effects(
        self: &Arc<Self>,
        handle: BindingHandle,
        binding: &mut Binding,
        effects: Vec<Effect>,
    ) -> Pending {
        let mut pending = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartTimer { interval_ms } => {
                    if let Some(previous) = binding.timer.take() {
                        previous.cancel();
                    }
                    let weak = Arc::downgrade(self);
                    let tick = Arc::new(move || {
                        if let Some(shared) = weak.upgrade() {
                            shared.tick(handle);
                        }
                    });
                    binding.timer = Some(
                        self.scheduler
                            .schedule_repeating(Duration::from_millis(interval_ms), tick),
                    );
                }
                Effect::CancelTimer => {
                    if let Some(timer) = binding.timer.take() {
                        timer.cancel();
                    }
                }
                Effect::Publish(feedback) => pending.push((binding.sinks.clone(), feedback)),
            }
        }
        pending
    }

    fn publish_all(&self, handle: BindingHandle, pending: Pending) {
        for (sinks, feedback) in pending {
            self.publisher.publish(handle, &sinks, &feedback);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let bindings = self.bindings.get_mut().unwrap_or_else(PoisonError::into_inner);
        for binding in bindings.by_handle.values_mut() {
            if let Some(listener) = binding.listener.take() {
                binding.source.unlisten(listener);
            }
        }
    }
}

/// Owns every bound input, its reconciliation timer and the shared publisher.
///
/// Cloning yields another handle to the same engine. Dropping the last clone
/// cancels all timers.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                clock,
                scheduler,
                publisher: FeedbackPublisher::new(),
                bindings: Mutex::new(Bindings::default()),
            }),
        })
    }

    /// Engine on the current tokio runtime with the system clock.
    pub fn with_tokio(config: EngineConfig) -> Result<Self, EngineError> {
        let scheduler = TokioScheduler::current()?;
        Self::new(config, Arc::new(SystemClock::new()), Arc::new(scheduler))
    }

    pub fn bind(&self, source: Arc<dyn TextSource>, policy: CountPolicy) -> BindingHandle {
        self.bind_with_sinks(source, policy, FeedbackSinks::default())
    }

    /// Binds `source`, counts its current value and publishes the result
    /// before returning.
    pub fn bind_with_sinks(
        &self,
        source: Arc<dyn TextSource>,
        policy: CountPolicy,
        sinks: FeedbackSinks,
    ) -> BindingHandle {
        let shared = &self.shared;
        let text = source.value();
        let (handle, pending) = {
            let mut bindings = shared.lock_bindings();
            let handle = bindings.allocate();
            let mut binding = Binding {
                state: BindingState::new(policy, shared.config.timing),
                source: source.clone(),
                sinks,
                timer: None,
                listener: None,
            };
            let pending = shared.step(handle, &mut binding, Msg::Bound { text });
            bindings.by_handle.insert(handle, binding);
            (handle, pending)
        };
        engine_debug!("bound input {} mode={:?} limit={:?}", handle, policy.mode, policy.limit);
        shared.publish_all(handle, pending);

        let weak = Arc::downgrade(shared);
        let listener = source.listen(Arc::new(move |event: SourceEvent| {
            if let Some(shared) = weak.upgrade() {
                if !shared.handle_event(handle, event) {
                    engine_debug!("ignoring {:?} for unbound input {}", event, handle);
                }
            }
        }));
        match shared.lock_bindings().by_handle.get_mut(&handle) {
            Some(binding) => binding.listener = Some(listener),
            None => source.unlisten(listener),
        }
        handle
    }

    /// Detaches an input from its source and cancels its timer. Returns
    /// `false` if the handle was not bound.
    pub fn unbind(&self, handle: BindingHandle) -> bool {
        let removed = self.shared.lock_bindings().by_handle.remove(&handle);
        let Some(mut binding) = removed else {
            engine_debug!("unbind of unknown input {} ignored", handle);
            return false;
        };
        let pending = self.shared.step(handle, &mut binding, Msg::Unbound);
        debug_assert!(pending.is_empty());
        if let Some(listener) = binding.listener.take() {
            binding.source.unlisten(listener);
        }
        engine_debug!("unbound input {}", handle);
        true
    }

    /// Forwards a source event for hosts that do not use `TextSource::listen`.
    pub fn notify(&self, handle: BindingHandle, event: SourceEvent) {
        if !self.shared.handle_event(handle, event) {
            engine_warn!("{:?} notified for unknown input {}", event, handle);
        }
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(BindingHandle, &CountResult, &Message, bool) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.shared.publisher.subscribe(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.publisher.unsubscribe(id)
    }

    /// Last feedback published for `handle`.
    pub fn feedback(&self, handle: BindingHandle) -> Option<Feedback> {
        self.shared
            .lock_bindings()
            .by_handle
            .get(&handle)
            .and_then(|binding| binding.state.feedback().cloned())
    }

    pub fn phase(&self, handle: BindingHandle) -> Phase {
        self.shared
            .lock_bindings()
            .by_handle
            .get(&handle)
            .map_or(Phase::Idle, |binding| binding.state.phase())
    }

    pub fn bound_inputs(&self) -> usize {
        self.shared.lock_bindings().by_handle.len()
    }
}
