//! Halo engine crate.
//!
//! Renders an immediate-mode UI library's draw data as an overlay on top of a
//! wgpu render pass, and bridges platform input back into the UI library.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod ui;
pub mod window;
