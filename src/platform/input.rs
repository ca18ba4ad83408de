//! Logical input mapping
//!
//! Keyboard and touch sources both collapse into three buttons. Holding a
//! button from two sources at once (key plus touch) counts once.

use crate::sim::TickInput;

/// Logical game buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    /// Jump, doubling as the confirm action outside a run
    Jump,
}

impl Button {
    fn index(self) -> usize {
        match self {
            Button::Left => 0,
            Button::Right => 1,
            Button::Jump => 2,
        }
    }
}

/// Map a `KeyboardEvent.code` to a button
pub fn button_for_key(code: &str) -> Option<Button> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Button::Left),
        "ArrowRight" | "KeyD" => Some(Button::Right),
        "Space" | "ArrowUp" | "KeyW" => Some(Button::Jump),
        _ => None,
    }
}

/// Map a touch on the play field to a button: left third, right third,
/// middle jumps
pub fn button_for_touch(x: f32, field_width: f32) -> Button {
    if x < field_width / 3.0 {
        Button::Left
    } else if x > field_width * 2.0 / 3.0 {
        Button::Right
    } else {
        Button::Jump
    }
}

/// Held state per button plus the jump edge
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Number of sources holding each button
    held: [u8; 3],
    jump_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source went down. Repeats while already held do not retrigger
    /// the jump edge.
    pub fn press(&mut self, button: Button) {
        let count = &mut self.held[button.index()];
        if button == Button::Jump && *count == 0 {
            self.jump_pressed = true;
        }
        *count = count.saturating_add(1);
    }

    /// A source went up
    pub fn release(&mut self, button: Button) {
        let count = &mut self.held[button.index()];
        *count = count.saturating_sub(1);
    }

    /// Keyboard repeats arrive as extra keydowns; only the first counts
    pub fn key_down(&mut self, code: &str, repeat: bool) -> bool {
        let Some(button) = button_for_key(code) else {
            return false;
        };
        if !repeat {
            self.press(button);
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let Some(button) = button_for_key(code) else {
            return false;
        };
        self.release(button);
        true
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held[button.index()] > 0
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    /// Clear the jump edge once a tick (or the confirm action) used it
    pub fn consume_press(&mut self) {
        self.jump_pressed = false;
    }

    /// Drop everything, e.g. when the page loses focus
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn tick_input(&self) -> TickInput {
        TickInput {
            move_left: self.is_held(Button::Left),
            move_right: self.is_held(Button::Right),
            jump_pressed: self.jump_pressed,
            jump_held: self.is_held(Button::Jump),
        }
    }
}
