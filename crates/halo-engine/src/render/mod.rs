//! Overlay renderer.
//!
//! Turns UI draw data into draw calls inside a caller-owned render pass.
//! Resources are retained across frames:
//! - [`pool`]: per-frame vertex/index buffers that only grow
//! - [`textures`]: texture-view → bind-group cache
//! - [`pipeline`]: shader, layouts, render pipeline
//! - [`uniforms`]: projection + gamma block rewritten every frame
//!
//! Convention: UI geometry is in logical pixels (top-left origin, +Y down);
//! scissor rects are in framebuffer pixels.

mod error;
mod overlay;

pub mod pipeline;
pub mod pool;
pub mod textures;
pub mod translate;
pub mod uniforms;

pub use error::OverlayError;
pub use overlay::{
    plan_frame, FramePlan, FrameStats, GeometryPlan, Overlay, OverlayConfig,
    DEFAULT_FRAMES_IN_FLIGHT,
};
