use winit::window::{CursorIcon, Window, WindowId};

use crate::render::Overlay;
use crate::time::FrameTime;
use crate::ui::UiContext;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `[width, height]`.
    pub fn logical_size(&self) -> [f32; 2] {
        let logical = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        [logical.width as f32, logical.height as f32]
    }

    /// Sets the mouse cursor shape for this window.
    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }
}

/// Passed to `App::on_overlay_ready` once per window.
pub struct SetupCtx<'a, U: UiContext> {
    pub window: WindowCtx<'a>,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub overlay: &'a mut Overlay<U>,
}

/// Per-frame context passed to `App::build`.
///
/// Only the UI is reachable here; the overlay renders it once `build` returns.
pub struct FrameCtx<'a, U: UiContext> {
    pub window: WindowCtx<'a>,
    pub ui: &'a mut U,
    pub time: FrameTime,
}
