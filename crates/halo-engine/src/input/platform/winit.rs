use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::input::{InputBridge, Key, Modifiers, MouseButton};

/// Logical pixels per wheel "line" when the platform reports pixel deltas.
const PIXELS_PER_LINE: f32 = 20.0;

/// Feeds a winit `WindowEvent` into the bridge.
///
/// `scale_factor` converts physical cursor coordinates to the logical space the
/// UI works in. Returns `true` when the event was input-related.
pub fn feed_window_event(bridge: &mut InputBridge, scale_factor: f64, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::ModifiersChanged(m) => {
            bridge.on_modifiers(map_modifiers(m.state()));
        }

        WindowEvent::Focused(focused) => bridge.on_focus(*focused),

        WindowEvent::CursorLeft { .. } => bridge.on_pointer_left(),

        WindowEvent::CursorMoved { position, .. } => {
            let [x, y] = to_logical(*position, scale_factor);
            bridge.on_pointer_moved(x, y);
        }

        WindowEvent::MouseInput { state, button, .. } => {
            bridge.on_button(map_mouse_button(*button), *state == ElementState::Pressed);
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let [dx, dy] = match delta {
                MouseScrollDelta::LineDelta(x, y) => [*x, *y],
                MouseScrollDelta::PixelDelta(p) => {
                    let [x, y] = to_logical(*p, scale_factor);
                    [x / PIXELS_PER_LINE, y / PIXELS_PER_LINE]
                }
            };
            bridge.on_wheel(dx, dy);
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let pressed = event.state == ElementState::Pressed;
            // Repeats only matter for text; the key is already down.
            if !event.repeat {
                bridge.on_key(map_key(event.physical_key), pressed);
            }
            if pressed {
                if let Some(text) = event.text.as_ref() {
                    bridge.on_text(text);
                }
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => bridge.on_text(text),

        _ => return false,
    }

    true
}

fn to_logical(pos: PhysicalPosition<f64>, scale_factor: f64) -> [f32; 2] {
    let logical = pos.to_logical::<f64>(scale_factor);
    [logical.x as f32, logical.y as f32]
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Tab => Key::Tab,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::Enter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::NumpadEnter => Key::KeypadEnter,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftCtrl,
        KeyCode::ControlRight => Key::RightCtrl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::SuperRight => Key::RightSuper,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Num0,
        KeyCode::Digit1 => Key::Num1,
        KeyCode::Digit2 => Key::Num2,
        KeyCode::Digit3 => Key::Num3,
        KeyCode::Digit4 => Key::Num4,
        KeyCode::Digit5 => Key::Num5,
        KeyCode::Digit6 => Key::Num6,
        KeyCode::Digit7 => Key::Num7,
        KeyCode::Digit8 => Key::Num8,
        KeyCode::Digit9 => Key::Num9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_navigation_and_letters() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowUp)), Key::Up);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyV)), Key::V);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadEnter)), Key::KeypadEnter);
    }

    #[test]
    fn cursor_positions_are_converted_to_logical_pixels() {
        assert_eq!(to_logical(PhysicalPosition::new(200.0, 100.0), 2.0), [100.0, 50.0]);
        assert_eq!(to_logical(PhysicalPosition::new(30.0, 45.0), 1.0), [30.0, 45.0]);
    }

    #[test]
    fn modifier_state_maps_to_flags() {
        let m = map_modifiers(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert!(m.shift && m.ctrl);
        assert!(!m.alt && !m.meta);
    }
}
