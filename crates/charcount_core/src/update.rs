use crate::{evaluate, BindingState, Effect, Msg, Phase};

/// Pure update function: applies a message to a binding and returns any effects.
pub fn update(mut state: BindingState, msg: Msg) -> (BindingState, Vec<Effect>) {
    let effects = match msg {
        Msg::Bound { text } => {
            if state.phase() != Phase::Idle {
                return (state, Vec::new());
            }
            state.set_phase(Phase::Blurred);
            let count_state = state.count_state_mut();
            count_state.live_text = text.clone();
            count_state.last_known_text = text;
            count_state.last_edit_at = None;
            recount(&mut state)
        }
        Msg::Edited { text, at } => {
            if state.phase() == Phase::Idle {
                return (state, Vec::new());
            }
            let count_state = state.count_state_mut();
            count_state.live_text = text.clone();
            count_state.last_known_text = text;
            count_state.last_edit_at = Some(at);
            recount(&mut state)
        }
        Msg::Focused => match state.phase() {
            Phase::Blurred => {
                state.set_phase(Phase::Focused);
                if state.policy().is_unlimited() {
                    Vec::new()
                } else {
                    vec![Effect::StartTimer {
                        interval_ms: state.timing().poll_interval_ms,
                    }]
                }
            }
            Phase::Idle | Phase::Focused => Vec::new(),
        },
        Msg::Blurred => match state.phase() {
            Phase::Focused => {
                state.set_phase(Phase::Blurred);
                vec![Effect::CancelTimer]
            }
            Phase::Idle | Phase::Blurred => Vec::new(),
        },
        Msg::Tick { live, now } => {
            if state.phase() != Phase::Focused {
                return (state, Vec::new());
            }
            let window = state.timing().debounce_window_ms;
            let count_state = state.count_state_mut();
            count_state.live_text = live;
            let settled = count_state
                .last_edit_at
                .is_none_or(|at| now.saturating_sub(at) >= window);
            if settled && count_state.live_text != count_state.last_known_text {
                count_state.last_known_text = count_state.live_text.clone();
                recount(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::Unbound => {
            if state.phase() == Phase::Idle {
                return (state, Vec::new());
            }
            state.reset();
            vec![Effect::CancelTimer]
        }
    };

    (state, effects)
}

fn recount(state: &mut BindingState) -> Vec<Effect> {
    let feedback = evaluate(state.policy(), &state.count_state().last_known_text);
    state.set_feedback(feedback.clone());
    feedback.map(Effect::Publish).into_iter().collect()
}
