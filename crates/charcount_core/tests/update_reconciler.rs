use std::sync::Once;

use charcount_core::{
    evaluate, update, BindingState, CountPolicy, Effect, Msg, Phase, PolicyOptions,
    ReconcileTiming,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn bound(policy: CountPolicy, text: &str) -> BindingState {
    let state = BindingState::new(policy, ReconcileTiming::default());
    let (state, _) = update(state, Msg::Bound { text: text.to_string() });
    state
}

fn focused(policy: CountPolicy, text: &str) -> BindingState {
    let (state, _) = update(bound(policy, text), Msg::Focused);
    state
}

fn published(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Publish(feedback) => Some(feedback.message.text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn bind_counts_initial_value() {
    init_logging();
    let state = BindingState::new(CountPolicy::characters(10), ReconcileTiming::default());
    assert_eq!(state.phase(), Phase::Idle);

    let (state, effects) = update(state, Msg::Bound { text: "Hello".to_string() });
    assert_eq!(state.phase(), Phase::Blurred);
    assert_eq!(published(&effects), vec!["You have 5 characters remaining"]);
    assert_eq!(state.count_state().last_known_text, "Hello");
    assert_eq!(state.count_state().last_edit_at, None);
}

#[test]
fn focus_starts_and_blur_cancels_timer() {
    init_logging();
    let state = bound(CountPolicy::characters(10), "");

    let (state, effects) = update(state, Msg::Focused);
    assert_eq!(state.phase(), Phase::Focused);
    assert_eq!(effects, vec![Effect::StartTimer { interval_ms: 1000 }]);

    // Focus while focused does not start a second timer.
    let (state, effects) = update(state, Msg::Focused);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::Blurred);
    assert_eq!(state.phase(), Phase::Blurred);
    assert_eq!(effects, vec![Effect::CancelTimer]);

    let (state, effects) = update(state, Msg::Blurred);
    assert_eq!(state.phase(), Phase::Blurred);
    assert!(effects.is_empty());
}

#[test]
fn edit_recounts_synchronously() {
    init_logging();
    let state = focused(CountPolicy::characters(10), "");
    let (state, effects) = update(
        state,
        Msg::Edited {
            text: "This is too long".to_string(),
            at: 100,
        },
    );
    assert_eq!(published(&effects), vec!["You have 6 characters too many"]);
    assert_eq!(state.count_state().last_edit_at, Some(100));
    assert_eq!(
        state.feedback(),
        evaluate(&CountPolicy::characters(10), "This is too long").as_ref()
    );
}

#[test]
fn tick_waits_for_debounce_window() {
    init_logging();
    let state = focused(CountPolicy::characters(10), "");
    let (state, _) = update(
        state,
        Msg::Edited {
            text: "Hi".to_string(),
            at: 1000,
        },
    );

    // External mutation observed 300ms after the last edit: too soon.
    let (state, effects) = update(
        state,
        Msg::Tick {
            live: "Hi there".to_string(),
            now: 1300,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.count_state().live_text, "Hi there");
    assert_eq!(state.count_state().last_known_text, "Hi");

    // Exactly at the debounce window the drift is reconciled.
    let (state, effects) = update(
        state,
        Msg::Tick {
            live: "Hi there".to_string(),
            now: 1500,
        },
    );
    assert_eq!(published(&effects), vec!["You have 2 characters remaining"]);
    assert_eq!(state.count_state().last_known_text, "Hi there");

    // No further drift, nothing to publish.
    let (_state, effects) = update(
        state,
        Msg::Tick {
            live: "Hi there".to_string(),
            now: 2500,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn tick_without_prior_edit_reconciles_immediately() {
    init_logging();
    let state = focused(CountPolicy::words(5), "");
    let (state, effects) = update(
        state,
        Msg::Tick {
            live: "dictated by voice".to_string(),
            now: 1000,
        },
    );
    assert_eq!(published(&effects), vec!["You have 2 words remaining"]);
    assert_eq!(state.feedback().unwrap().result.count, 3);
}

#[test]
fn tick_is_ignored_unless_focused() {
    init_logging();
    let state = bound(CountPolicy::characters(10), "a");
    let (state, effects) = update(
        state,
        Msg::Tick {
            live: "abc".to_string(),
            now: 10_000,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.count_state().last_known_text, "a");
}

#[test]
fn unbind_cancels_timer_and_discards_state() {
    init_logging();
    let state = focused(CountPolicy::characters(10), "Hello");
    let (state, effects) = update(state, Msg::Unbound);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(effects, vec![Effect::CancelTimer]);
    assert_eq!(state.feedback(), None);
    assert_eq!(state.count_state().last_known_text, "");

    // Second unbind is a no-op.
    let (state, effects) = update(state, Msg::Unbound);
    assert_eq!(state.phase(), Phase::Idle);
    assert!(effects.is_empty());
}

#[test]
fn events_before_bind_are_ignored() {
    init_logging();
    let state = BindingState::new(CountPolicy::characters(10), ReconcileTiming::default());
    for msg in [
        Msg::Edited {
            text: "x".to_string(),
            at: 0,
        },
        Msg::Focused,
        Msg::Blurred,
    ] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(next, state);
        assert!(effects.is_empty());
    }
}

#[test]
fn unlimited_binding_is_inert() {
    init_logging();
    let policy = CountPolicy::from_options(&PolicyOptions {
        maxlength: Some(0),
        ..PolicyOptions::default()
    })
    .unwrap();
    let state = BindingState::new(policy, ReconcileTiming::default());
    let (state, effects) = update(state, Msg::Bound { text: "abc".to_string() });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::Focused);
    assert_eq!(state.phase(), Phase::Focused);
    assert!(effects.is_empty());
    let (_state, effects) = update(
        state,
        Msg::Edited {
            text: "abcd".to_string(),
            at: 5,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn custom_timing_is_respected() {
    init_logging();
    let timing = ReconcileTiming {
        poll_interval_ms: 250,
        debounce_window_ms: 100,
    };
    let state = BindingState::new(CountPolicy::characters(4), timing);
    let (state, _) = update(state, Msg::Bound { text: String::new() });
    let (state, effects) = update(state, Msg::Focused);
    assert_eq!(effects, vec![Effect::StartTimer { interval_ms: 250 }]);

    let (state, _) = update(
        state,
        Msg::Edited {
            text: "ab".to_string(),
            at: 0,
        },
    );
    let (_state, effects) = update(
        state,
        Msg::Tick {
            live: "abcdef".to_string(),
            now: 100,
        },
    );
    assert_eq!(published(&effects), vec!["You have 2 characters too many"]);
}
