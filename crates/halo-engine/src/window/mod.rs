//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and windows, and wires each window to its GPU
//! surface, overlay and frame orchestrator.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
pub use winit::window::CursorIcon;
