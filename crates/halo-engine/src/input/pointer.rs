use std::collections::HashSet;

use super::types::{Modifiers, MouseButton};

/// Level-triggered pointer and modifier state.
///
/// Unlike key transitions this is not queued: the bridge samples it fresh at
/// flush time. Only the wheel accumulates, and is reset when sampled.
#[derive(Debug, Default)]
pub struct PointerState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels; `None` while outside the window.
    pub pos: Option<[f32; 2]>,

    /// Currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,

    wheel: [f32; 2],
}

impl PointerState {
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            // Release events may never arrive once focus is gone.
            self.buttons_down.clear();
        }
    }

    pub fn add_wheel(&mut self, dx: f32, dy: f32) {
        self.wheel[0] += dx;
        self.wheel[1] += dy;
    }

    /// Returns the wheel delta accumulated since the last call.
    pub fn take_wheel(&mut self) -> [f32; 2] {
        std::mem::take(&mut self.wheel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_accumulates_until_taken() {
        let mut p = PointerState::default();
        p.add_wheel(0.0, 1.0);
        p.add_wheel(0.5, 2.0);
        assert_eq!(p.take_wheel(), [0.5, 3.0]);
        assert_eq!(p.take_wheel(), [0.0, 0.0]);
    }

    #[test]
    fn focus_loss_releases_buttons() {
        let mut p = PointerState::default();
        p.set_focused(true);
        p.set_button(MouseButton::Left, true);
        p.set_focused(false);
        assert!(!p.button_down(MouseButton::Left));
    }
}
