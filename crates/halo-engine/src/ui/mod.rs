//! Boundary with the immediate-mode UI library.
//!
//! The engine never owns widget logic. It consumes draw data through the plain
//! draw types below and talks to the library through the [`UiContext`] / [`UiInput`]
//! traits, which host applications implement for their UI library of choice.

mod context;
mod draw;

pub use context::{DisplayMetrics, FontAtlas, UiContext, UiInput};
pub use draw::{ClipRect, DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, TextureId, UserCallback};
