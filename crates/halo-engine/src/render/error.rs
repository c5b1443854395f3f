/// Errors raised by the overlay renderer.
///
/// Surface-level conditions (outdated/lost swapchain, minimized window) never
/// show up here; the frame orchestrator absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid overlay configuration: {0}")]
    InvalidConfig(String),

    #[error("font atlas is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    FontAtlasSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("font atlas {width}x{height} exceeds the device limit of {limit}")]
    FontAtlasTooLarge { width: u32, height: u32, limit: u32 },

    #[error("render called without a preceding update for this frame")]
    FrameNotStarted,

    #[error("update called twice without rendering the frame in between")]
    FrameAlreadyStarted,
}
