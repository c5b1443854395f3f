use bytemuck::{Pod, Zeroable};

/// Gamma applied to vertex colors when the target re-encodes to sRGB.
pub const SRGB_GAMMA: f32 = 2.2;

/// Per-frame uniform block (80 bytes).
///
///  offset  0  mvp    [[f32; 4]; 4]  column-major
///  offset 64  gamma  f32
///  offset 68  _pad   [f32; 3]       16-byte alignment
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub mvp: [[f32; 4]; 4],
    pub gamma: f32,
    pub _pad: [f32; 3],
}

impl Uniforms {
    pub fn new(display_pos: [f32; 2], display_size: [f32; 2], gamma: f32) -> Self {
        Self {
            mvp: ortho_projection(display_pos, display_size),
            gamma,
            _pad: [0.0; 3],
        }
    }

    pub(crate) fn min_binding_size() -> Option<std::num::NonZeroU64> {
        std::num::NonZeroU64::new(std::mem::size_of::<Uniforms>() as u64)
    }
}

/// Gamma for a surface format: sRGB targets need linear input.
pub fn gamma_for_format(format: wgpu::TextureFormat) -> f32 {
    if format.is_srgb() { SRGB_GAMMA } else { 1.0 }
}

/// Orthographic projection from UI space (top-left origin, +Y down) to clip space.
///
/// `display_pos` maps to `(-1, 1)` and `display_pos + display_size` to `(1, -1)`.
pub fn ortho_projection(display_pos: [f32; 2], display_size: [f32; 2]) -> [[f32; 4]; 4] {
    let l = display_pos[0];
    let r = display_pos[0] + display_size[0];
    let t = display_pos[1];
    let b = display_pos[1] + display_size[1];

    [
        [2.0 / (r - l), 0.0, 0.0, 0.0],
        [0.0, 2.0 / (t - b), 0.0, 0.0],
        [0.0, 0.0, 0.5, 0.0],
        [(r + l) / (l - r), (t + b) / (b - t), 0.5, 1.0],
    ]
}
