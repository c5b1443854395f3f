use crate::input::{Key, Modifiers, MouseButton};

use super::draw::{DrawData, TextureId};

/// Display geometry pushed into the UI library every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayMetrics {
    /// Display size in UI (logical) units.
    pub size: [f32; 2],

    /// UI-to-framebuffer pixel ratio.
    pub framebuffer_scale: [f32; 2],
}

impl DisplayMetrics {
    #[inline]
    pub const fn new(size: [f32; 2], framebuffer_scale: [f32; 2]) -> Self {
        Self { size, framebuffer_scale }
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self { size: [0.0, 0.0], framebuffer_scale: [1.0, 1.0] }
    }
}

/// RGBA8 font atlas pixels borrowed from the UI library.
#[derive(Debug, Copy, Clone)]
pub struct FontAtlas<'a> {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major.
    pub pixels: &'a [u8],
}

impl FontAtlas<'_> {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Input model of the UI library.
///
/// The input bridge calls these once per frame while flushing.
pub trait UiInput {
    fn add_char(&mut self, c: char);
    fn add_key(&mut self, key: Key, pressed: bool);
    fn add_modifiers(&mut self, modifiers: Modifiers) {
        let _ = modifiers;
    }
    fn add_mouse_pos(&mut self, pos: Option<[f32; 2]>);
    fn add_mouse_button(&mut self, button: MouseButton, pressed: bool);
    fn add_mouse_wheel(&mut self, delta: [f32; 2]);
}

/// Frame lifecycle of the UI library.
pub trait UiContext: UiInput {
    fn set_display(&mut self, metrics: DisplayMetrics);
    fn set_delta_time(&mut self, seconds: f32);

    /// Begins a new UI frame. Widgets may be submitted after this returns.
    fn new_frame(&mut self);

    /// Finalizes the frame and returns its draw data.
    fn render(&mut self) -> &DrawData;

    /// Font atlas pixels, read once at overlay initialization.
    fn font_atlas(&mut self) -> FontAtlas<'_>;

    /// Receives the handle the overlay assigned to the font atlas.
    fn set_font_texture(&mut self, id: TextureId);
}
