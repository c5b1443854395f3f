//! Input event bridge.
//!
//! Window-system events are appended to [`PendingInput`] / [`PointerState`] as
//! they arrive and flushed into the UI library exactly once per frame by
//! [`InputBridge::flush`]. Public types do not expose winit; translation lives
//! in [`platform`].

mod bridge;
mod pending;
mod pointer;
mod types;

pub mod platform;

pub use bridge::InputBridge;
pub use pending::PendingInput;
pub use pointer::PointerState;
pub use types::{Key, Modifiers, MouseButton};
