use crate::ui::UiInput;

use super::pending::PendingInput;
use super::pointer::PointerState;
use super::types::{Key, Modifiers, MouseButton};

/// Collects window-system input between frames and hands it to the UI library.
///
/// Threading: event callbacks and the frame loop are expected to run on the
/// same thread (the winit event loop thread). `on_*` calls never interleave
/// with [`InputBridge::flush`], so there is no locking here.
#[derive(Debug, Default)]
pub struct InputBridge {
    pending: PendingInput,
    pointer: PointerState,
}

impl InputBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: Key, pressed: bool) {
        self.pending.push_key(key, pressed);
    }

    /// Queues a typed character. Control characters are not text and are dropped.
    pub fn on_char(&mut self, c: char) {
        if !c.is_control() {
            self.pending.push_char(c);
        }
    }

    pub fn on_text(&mut self, text: &str) {
        for c in text.chars() {
            self.on_char(c);
        }
    }

    pub fn on_modifiers(&mut self, modifiers: Modifiers) {
        self.pointer.modifiers = modifiers;
    }

    pub fn on_pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.pos = Some([x, y]);
    }

    pub fn on_pointer_left(&mut self) {
        self.pointer.pos = None;
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        self.pointer.set_button(button, pressed);
    }

    pub fn on_wheel(&mut self, dx: f32, dy: f32) {
        self.pointer.add_wheel(dx, dy);
    }

    pub fn on_focus(&mut self, focused: bool) {
        self.pointer.set_focused(focused);
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Replays everything gathered since the previous flush into `ui`.
    ///
    /// Must run once per frame, before the UI library begins its new frame.
    pub fn flush(&mut self, ui: &mut impl UiInput) {
        let (chars, keys) = self.pending.drain();

        for c in chars {
            ui.add_char(c);
        }
        for (key, pressed) in keys {
            ui.add_key(key, pressed);
        }

        ui.add_modifiers(self.pointer.modifiers);
        ui.add_mouse_pos(self.pointer.pos);
        for button in MouseButton::TRACKED {
            ui.add_mouse_button(button, self.pointer.button_down(button));
        }

        let wheel = self.pointer.take_wheel();
        if wheel != [0.0, 0.0] {
            ui.add_mouse_wheel(wheel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Char(char),
        Key(Key, bool),
        Pos(Option<[f32; 2]>),
        Button(MouseButton, bool),
        Wheel([f32; 2]),
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Seen>,
    }

    impl UiInput for Recorder {
        fn add_char(&mut self, c: char) {
            self.seen.push(Seen::Char(c));
        }
        fn add_key(&mut self, key: Key, pressed: bool) {
            self.seen.push(Seen::Key(key, pressed));
        }
        fn add_mouse_pos(&mut self, pos: Option<[f32; 2]>) {
            self.seen.push(Seen::Pos(pos));
        }
        fn add_mouse_button(&mut self, button: MouseButton, pressed: bool) {
            self.seen.push(Seen::Button(button, pressed));
        }
        fn add_mouse_wheel(&mut self, delta: [f32; 2]) {
            self.seen.push(Seen::Wheel(delta));
        }
    }

    #[test]
    fn flush_replays_chars_then_keys_then_pointer() {
        let mut bridge = InputBridge::new();
        bridge.on_text("hi");
        bridge.on_key(Key::Enter, true);
        bridge.on_pointer_moved(10.0, 20.0);
        bridge.on_button(MouseButton::Left, true);
        bridge.on_wheel(0.0, -1.0);

        let mut rec = Recorder::default();
        bridge.flush(&mut rec);

        assert_eq!(rec.seen[0], Seen::Char('h'));
        assert_eq!(rec.seen[1], Seen::Char('i'));
        assert_eq!(rec.seen[2], Seen::Key(Key::Enter, true));
        assert_eq!(rec.seen[3], Seen::Pos(Some([10.0, 20.0])));
        assert_eq!(rec.seen[4], Seen::Button(MouseButton::Left, true));
        assert_eq!(rec.seen[5], Seen::Button(MouseButton::Right, false));
        assert_eq!(rec.seen.last(), Some(&Seen::Wheel([0.0, -1.0])));
    }

    #[test]
    fn queues_are_cleared_after_flush() {
        let mut bridge = InputBridge::new();
        bridge.on_char('a');
        bridge.on_key(Key::A, true);
        bridge.on_wheel(1.0, 0.0);
        bridge.flush(&mut Recorder::default());

        let mut rec = Recorder::default();
        bridge.flush(&mut rec);

        assert!(!rec.seen.iter().any(|s| matches!(s, Seen::Char(_) | Seen::Key(..) | Seen::Wheel(_))));
        // Held state is sampled again even though nothing was queued.
        assert!(rec.seen.iter().any(|s| matches!(s, Seen::Pos(None))));
    }

    #[test]
    fn multiple_transitions_report_latest_state() {
        let mut bridge = InputBridge::new();
        bridge.on_key(Key::Tab, true);
        bridge.on_key(Key::Tab, false);
        bridge.on_key(Key::Tab, true);

        let mut rec = Recorder::default();
        bridge.flush(&mut rec);

        let keys: Vec<_> = rec.seen.iter().filter(|s| matches!(s, Seen::Key(..))).collect();
        assert_eq!(keys, vec![&Seen::Key(Key::Tab, true)]);
    }

    #[test]
    fn control_characters_are_not_text() {
        let mut bridge = InputBridge::new();
        bridge.on_text("a\u{8}\r\n");
        assert_eq!(bridge.pending().chars(), &['a']);
    }
}
