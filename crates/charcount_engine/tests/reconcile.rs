use std::sync::{Arc, Mutex, Once};

use charcount_core::{CountPolicy, Phase};
use charcount_engine::{
    BindingHandle, Clock, Engine, EngineConfig, ManualClock, ManualScheduler, MemoryTextSource,
    SourceEvent,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

struct Harness {
    engine: Engine,
    scheduler: Arc<ManualScheduler>,
    clock: Arc<ManualClock>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new() -> Self {
        init_logging();
        let clock = Arc::new(ManualClock::new(0));
        let scheduler = Arc::new(ManualScheduler::new(clock.clone()));
        let engine = Engine::new(EngineConfig::default(), clock.clone(), scheduler.clone())
            .expect("engine");
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        engine.subscribe(move |_handle, _result, message, _visible| {
            sink.lock().unwrap().push(message.text.clone());
        });
        Self {
            engine,
            scheduler,
            clock,
            messages,
        }
    }

    fn bind(&self, initial: &str, limit: u32) -> (Arc<MemoryTextSource>, BindingHandle) {
        let source = Arc::new(MemoryTextSource::new(initial));
        let handle = self
            .engine
            .bind(source.clone(), CountPolicy::characters(limit));
        (source, handle)
    }

    fn take(&self) -> Vec<String> {
        self.messages.lock().unwrap().drain(..).collect()
    }

    fn count(&self, handle: BindingHandle) -> usize {
        self.engine.feedback(handle).expect("feedback").result.count
    }

    fn clock_now(&self) -> u64 {
        self.clock.now_millis()
    }
}

#[test]
fn bind_publishes_initial_value() {
    let h = Harness::new();
    let (_source, handle) = h.bind("Hello", 10);
    assert_eq!(h.take(), vec!["You have 5 characters remaining"]);
    assert_eq!(h.engine.phase(handle), Phase::Blurred);
    assert_eq!(h.engine.bound_inputs(), 1);
}

#[test]
fn edits_publish_immediately() {
    let h = Harness::new();
    let (source, handle) = h.bind("", 10);
    h.take();

    source.edit("Hello Wor");
    assert_eq!(h.take(), vec!["You have 1 character remaining"]);
    assert_eq!(h.count(handle), 9);
}

#[test]
fn silent_change_is_reconciled_on_next_tick() {
    let h = Harness::new();
    let (source, handle) = h.bind("", 10);
    source.focus();
    assert_eq!(h.engine.phase(handle), Phase::Focused);
    assert_eq!(h.scheduler.active_timers(), 1);
    h.take();

    source.set_silently("This is too long");
    h.scheduler.advance(999);
    assert_eq!(h.count(handle), 0);
    assert!(h.take().is_empty());

    h.scheduler.advance(1);
    assert_eq!(h.count(handle), 16);
    assert_eq!(h.take(), vec!["You have 6 characters too many"]);
}

#[test]
fn reconciliation_waits_for_debounce_after_edit() {
    let h = Harness::new();
    let (source, handle) = h.bind("", 10);
    source.focus();
    h.take();

    h.scheduler.advance(900);
    source.edit("Hi");
    source.set_silently("Hi there");
    assert_eq!(h.take(), vec!["You have 8 characters remaining"]);

    // Tick at 1000 is only 100ms after the edit.
    h.scheduler.advance(100);
    assert_eq!(h.count(handle), 2);

    // Tick at 2000 is past the debounce window.
    h.scheduler.advance(1000);
    assert_eq!(h.count(handle), 8);
    assert_eq!(h.take(), vec!["You have 2 characters remaining"]);
    assert_eq!(h.clock_now(), 2000);
}

#[test]
fn blur_stops_reconciliation() {
    let h = Harness::new();
    let (source, handle) = h.bind("", 10);
    source.focus();
    source.blur();
    source.blur();
    assert_eq!(h.engine.phase(handle), Phase::Blurred);
    assert_eq!(h.scheduler.active_timers(), 0);

    source.set_silently("changed");
    h.scheduler.advance(5000);
    assert_eq!(h.count(handle), 0);

    // Refocusing picks the drift up again.
    source.focus();
    h.scheduler.advance(1000);
    assert_eq!(h.count(handle), 7);
}

#[test]
fn unbind_while_focused_cancels_timer() {
    let h = Harness::new();
    let (source, handle) = h.bind("", 10);
    source.focus();
    assert_eq!(h.scheduler.active_timers(), 1);

    assert!(h.engine.unbind(handle));
    assert_eq!(h.scheduler.active_timers(), 0);
    assert_eq!(h.engine.phase(handle), Phase::Idle);
    assert_eq!(h.engine.feedback(handle), None);
    assert!(!h.engine.unbind(handle));

    // Events from a detached source are dropped.
    h.take();
    source.edit("late");
    h.scheduler.advance(2000);
    assert!(h.take().is_empty());

    h.engine.notify(handle, SourceEvent::Edit);
    assert!(h.take().is_empty());
    assert_eq!(h.engine.bound_inputs(), 0);
}

#[test]
fn bindings_are_independent() {
    let h = Harness::new();
    let (first, first_handle) = h.bind("", 10);
    let (_second, second_handle) = h.bind("abc", 5);
    assert_ne!(first_handle, second_handle);

    first.focus();
    first.set_silently("12345");
    h.scheduler.advance(1000);

    assert_eq!(h.count(first_handle), 5);
    assert_eq!(h.count(second_handle), 3);
    assert_eq!(h.engine.phase(second_handle), Phase::Blurred);
}

#[test]
fn dropping_engine_cancels_timers() {
    let h = Harness::new();
    let (source, _handle) = h.bind("", 10);
    source.focus();
    assert_eq!(h.scheduler.active_timers(), 1);

    let Harness {
        engine, scheduler, ..
    } = h;
    drop(engine);
    assert_eq!(scheduler.active_timers(), 0);
}

#[test]
fn rebinding_a_source_does_not_accumulate_listeners() {
    let h = Harness::new();
    let source = Arc::new(MemoryTextSource::new("abc"));
    for _ in 0..100 {
        let handle = h
            .engine
            .bind(source.clone(), CountPolicy::characters(10));
        assert_eq!(source.listener_count(), 1);
        assert!(h.engine.unbind(handle));
    }
    assert_eq!(h.engine.bound_inputs(), 0);
    assert_eq!(source.listener_count(), 0);

    h.take();
    source.edit("abcd");
    assert!(h.take().is_empty());
}

#[test]
fn dropping_engine_detaches_sources() {
    let h = Harness::new();
    let (source, _handle) = h.bind("", 10);
    assert_eq!(source.listener_count(), 1);
    drop(h);
    assert_eq!(source.listener_count(), 0);
}
