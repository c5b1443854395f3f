use std::collections::HashSet;

use halo_engine::input::{Key, Modifiers, MouseButton};
use halo_engine::ui::{DisplayMetrics, DrawData, FontAtlas, TextureId, UiContext, UiInput};

use crate::painter::Painter;

/// 4x4 opaque white atlas; every solid fill samples its center.
const ATLAS_SIZE: u32 = 4;

/// Minimal immediate-mode UI used by the studio.
///
/// It has no text rendering; it exists to exercise the overlay with panels,
/// clipping, images and live input.
pub struct DemoUi {
    atlas: Vec<u8>,
    painter: Painter,
    draw_data: DrawData,

    display: DisplayMetrics,
    delta: f32,
    time: f32,

    mouse_pos: Option<[f32; 2]>,
    buttons: HashSet<MouseButton>,
    clicked: HashSet<MouseButton>,
    wheel: [f32; 2],
    modifiers: Modifiers,
    typed: Vec<char>,
    last_key: Option<Key>,
}

impl DemoUi {
    pub fn new() -> Self {
        Self {
            atlas: vec![255; (ATLAS_SIZE * ATLAS_SIZE * 4) as usize],
            painter: Painter::new(),
            draw_data: DrawData::default(),
            display: DisplayMetrics::default(),
            delta: 0.0,
            time: 0.0,
            mouse_pos: None,
            buttons: HashSet::new(),
            clicked: HashSet::new(),
            wheel: [0.0, 0.0],
            modifiers: Modifiers::default(),
            typed: Vec::new(),
            last_key: None,
        }
    }

    pub fn display_size(&self) -> [f32; 2] {
        self.display.size
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn mouse_pos(&self) -> Option<[f32; 2]> {
        self.mouse_pos
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// True once per press.
    pub fn was_clicked(&self, button: MouseButton) -> bool {
        self.clicked.contains(&button)
    }

    pub fn wheel(&self) -> [f32; 2] {
        self.wheel
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn clear_typed(&mut self) {
        self.typed.clear();
    }

    pub fn last_key(&self) -> Option<Key> {
        self.last_key
    }

    pub fn hovered(&self, min: [f32; 2], max: [f32; 2]) -> bool {
        self.mouse_pos.is_some_and(|[x, y]| x >= min[0] && x < max[0] && y >= min[1] && y < max[1])
    }

    pub fn painter(&mut self) -> &mut Painter {
        &mut self.painter
    }
}

impl UiInput for DemoUi {
    fn add_char(&mut self, c: char) {
        self.typed.push(c);
    }

    fn add_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            if key == Key::Backspace {
                self.typed.pop();
            }
            self.last_key = Some(key);
        }
    }

    fn add_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    fn add_mouse_pos(&mut self, pos: Option<[f32; 2]>) {
        self.mouse_pos = pos;
    }

    fn add_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.buttons.insert(button) {
                self.clicked.insert(button);
            }
        } else {
            self.buttons.remove(&button);
        }
    }

    fn add_mouse_wheel(&mut self, delta: [f32; 2]) {
        self.wheel[0] += delta[0];
        self.wheel[1] += delta[1];
    }
}

impl UiContext for DemoUi {
    fn set_display(&mut self, metrics: DisplayMetrics) {
        self.display = metrics;
    }

    fn set_delta_time(&mut self, seconds: f32) {
        self.delta = seconds;
    }

    fn new_frame(&mut self) {
        self.time += self.delta;
        self.painter.begin(self.display.size);
    }

    fn render(&mut self) -> &DrawData {
        self.draw_data = DrawData {
            lists: self.painter.finish(),
            display_pos: [0.0, 0.0],
            display_size: self.display.size,
            framebuffer_scale: self.display.framebuffer_scale,
        };

        // Per-frame input edges are consumed by the frame that saw them.
        self.clicked.clear();
        self.wheel = [0.0, 0.0];

        &self.draw_data
    }

    fn font_atlas(&mut self) -> FontAtlas<'_> {
        FontAtlas {
            width: ATLAS_SIZE,
            height: ATLAS_SIZE,
            pixels: &self.atlas,
        }
    }

    fn set_font_texture(&mut self, id: TextureId) {
        self.painter.set_font_texture(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_matches_its_dimensions() {
        let mut ui = DemoUi::new();
        let atlas = ui.font_atlas();
        assert_eq!(atlas.pixels.len(), atlas.expected_len());
    }

    #[test]
    fn click_is_reported_for_one_frame() {
        let mut ui = DemoUi::new();
        ui.set_display(DisplayMetrics::new([100.0, 100.0], [1.0, 1.0]));
        ui.new_frame();
        ui.add_mouse_button(MouseButton::Left, true);
        assert!(ui.was_clicked(MouseButton::Left));
        ui.render();

        ui.new_frame();
        assert!(!ui.was_clicked(MouseButton::Left));
        assert!(ui.is_down(MouseButton::Left));
    }

    #[test]
    fn backspace_erases_typed_text() {
        let mut ui = DemoUi::new();
        ui.add_char('h');
        ui.add_char('i');
        ui.add_key(Key::Backspace, true);
        assert_eq!(ui.typed(), &['h']);
    }
}
