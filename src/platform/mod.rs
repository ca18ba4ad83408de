//! Platform abstraction layer
//!
//! Turns what the host delivers (animation-frame timestamps, key codes,
//! touch buttons) into fixed simulation ticks and logical intents.

pub mod input;
pub mod time;

pub use input::{Button, InputState, button_for_key, button_for_touch};
pub use time::FrameClock;

use crate::sim::{GameEvent, GameState, tick};

/// Run one host frame: handle a pending confirm, then every tick that is due
///
/// A jump press outside of a run is the confirm action and is consumed
/// there. Inside a run it reaches the first tick only.
pub fn run_frame(
    state: &mut GameState,
    clock: &mut FrameClock,
    input: &mut InputState,
    now_ms: f64,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if !state.is_running() && input.jump_pressed() {
        input.consume_press();
        events.extend(state.confirm());
    }

    let ticks = clock.advance(now_ms);
    for _ in 0..ticks {
        events.extend(tick(state, &input.tick_input()));
        input.consume_press();
    }

    events
}
