use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::ui::UiContext;

use super::ctx::{FrameCtx, SetupCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by hosts of the overlay.
pub trait App {
    /// UI library driven by the overlay.
    type Ui: UiContext;

    /// Creates the UI context. Called once per window, before the overlay exists.
    fn create_ui(&mut self) -> Self::Ui;

    /// Called once after the overlay is initialized, e.g. to bind host textures.
    fn on_overlay_ready(&mut self, ctx: &mut SetupCtx<'_, Self::Ui>) {
        let _ = ctx;
    }

    /// Called for window events, after the overlay's input bridge saw them.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Builds this frame's UI. The UI frame is already open.
    fn build(&mut self, ctx: &mut FrameCtx<'_, Self::Ui>) -> AppControl;
}
