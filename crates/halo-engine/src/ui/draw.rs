use bytemuck::{Pod, Zeroable};

/// Opaque texture handle carried by draw commands.
///
/// Handles are minted by the overlay's bind-group cache; the UI library only
/// stores and echoes them back.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Index type used by draw lists.
pub type DrawIdx = u16;

/// Interleaved UI vertex.
///
/// Layout (20 bytes):
///
///  offset  0  pos  [f32; 2]   loc 0
///  offset  8  uv   [f32; 2]   loc 1
///  offset 16  col  [u8; 4]    loc 2  (RGBA, unorm)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: [u8; 4],
}

impl DrawVert {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Unorm8x4   // col
    ];

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: [u8; 4]) -> Self {
        Self { pos, uv, col }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DrawVert>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Clip rectangle in display coordinates (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl ClipRect {
    #[inline]
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    /// True when the rect has zero or negative extent on either axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.max[0] <= self.min[0] || self.max[1] <= self.min[1]
    }
}

/// Marker for commands that the UI library wants to handle itself.
///
/// The overlay never runs callbacks; it only skips the command.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UserCallback(pub u64);

/// One clipped, textured run of indices inside a [`DrawList`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub elem_count: u32,
    pub idx_offset: u32,
    pub vtx_offset: u32,
    pub clip_rect: ClipRect,
    pub texture_id: TextureId,
    pub callback: Option<UserCallback>,
}

/// A batch of geometry produced by the UI library, usually one per window/layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub vertices: Vec<DrawVert>,
    pub indices: Vec<DrawIdx>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
    }
}

/// Everything the UI library produced for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawData {
    /// Lists in back-to-front display order.
    pub lists: Vec<DrawList>,

    /// Top-left of the displayed area in UI coordinates.
    pub display_pos: [f32; 2],

    /// Size of the displayed area in UI coordinates.
    pub display_size: [f32; 2],

    /// UI-to-framebuffer pixel ratio (e.g. 2.0 on a high-DPI display).
    pub framebuffer_scale: [f32; 2],
}

impl Default for DrawData {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            display_pos: [0.0, 0.0],
            display_size: [0.0, 0.0],
            framebuffer_scale: [1.0, 1.0],
        }
    }
}

impl DrawData {
    pub fn total_vtx_count(&self) -> usize {
        self.lists.iter().map(|l| l.vertices.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.lists.iter().map(|l| l.indices.len()).sum()
    }

    /// Framebuffer size in physical pixels implied by display size and scale.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let w = (self.display_size[0] * self.framebuffer_scale[0]).max(0.0) as u32;
        let h = (self.display_size[1] * self.framebuffer_scale[1]).max(0.0) as u32;
        (w, h)
    }
}
