//! Per-frame vertex/index buffers.
//!
//! Each frames-in-flight slot owns its own GPU buffers plus CPU staging memory,
//! so the CPU can fill slot `k` while the GPU may still read slot `k - 1`.
//! Buffers only ever grow.

/// Rounds `size` up to the copy alignment required by `Queue::write_buffer`.
#[inline]
pub fn align_to_copy(size: u64) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    size.div_ceil(align) * align
}

/// Returns the new allocation size if `required` bytes do not fit in `current`.
///
/// The returned size is exactly `required` rounded up to the copy alignment
/// (never zero). `None` means the existing allocation is reused.
pub fn plan_capacity(current: Option<u64>, required: u64) -> Option<u64> {
    let required = align_to_copy(required).max(wgpu::COPY_BUFFER_ALIGNMENT);
    match current {
        Some(cap) if cap >= required => None,
        _ => Some(required),
    }
}

/// Reallocations one slot needs for a frame. `None` keeps that buffer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SlotGrowth {
    pub vertex: Option<u64>,
    pub index: Option<u64>,
}

/// Plans both buffers of a slot. Each kind is decided on its own capacity.
pub fn plan_slot_growth(
    vertex_capacity: Option<u64>,
    index_capacity: Option<u64>,
    vertex_bytes: u64,
    index_bytes: u64,
) -> SlotGrowth {
    SlotGrowth {
        vertex: plan_capacity(vertex_capacity, vertex_bytes),
        index: plan_capacity(index_capacity, index_bytes),
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl BufferKind {
    fn usage(self) -> wgpu::BufferUsages {
        match self {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferKind::Index => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BufferKind::Vertex => "halo overlay vbo",
            BufferKind::Index => "halo overlay ibo",
        }
    }
}

/// A GPU buffer paired with same-sized CPU staging memory.
pub struct GrowableBuffer {
    kind: BufferKind,
    buffer: Option<wgpu::Buffer>,
    staging: Vec<u8>,
}

impl GrowableBuffer {
    pub fn new(kind: BufferKind) -> Self {
        Self { kind, buffer: None, staging: Vec::new() }
    }

    /// Current GPU capacity in bytes, `None` before the first allocation.
    pub fn capacity(&self) -> Option<u64> {
        self.buffer.as_ref().map(|b| b.size())
    }

    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Replaces the buffer with a `size`-byte one. Contents are not preserved.
    fn grow_to(&mut self, device: &wgpu::Device, size: u64) {
        log::debug!(
            "growing {:?} buffer: {} -> {} bytes",
            self.kind,
            self.capacity().unwrap_or(0),
            size
        );

        // The old buffer may still be referenced by in-flight submissions;
        // dropping the handle lets wgpu free it once the GPU is done.
        self.buffer = None;
        self.staging = vec![0; size as usize];
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.kind.label()),
            size,
            usage: self.kind.usage(),
            mapped_at_creation: false,
        }));
    }

    /// Copies `bytes` into staging memory at `offset`.
    ///
    /// The caller must have reserved enough capacity.
    pub fn stage(&mut self, offset: usize, bytes: &[u8]) {
        self.staging[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Uploads the first `used` staged bytes (rounded up to the copy alignment).
    pub fn upload(&mut self, queue: &wgpu::Queue, used: u64) {
        let Some(buffer) = self.buffer.as_ref() else { return };
        let len = align_to_copy(used) as usize;
        if len == 0 {
            return;
        }
        // Alignment padding must not carry stale bytes from a previous frame.
        self.staging[used as usize..len].fill(0);
        queue.write_buffer(buffer, 0, &self.staging[..len]);
    }
}

/// One ring entry: a vertex buffer and an index buffer.
pub struct FrameSlot {
    pub vertices: GrowableBuffer,
    pub indices: GrowableBuffer,
}

impl FrameSlot {
    fn new() -> Self {
        Self {
            vertices: GrowableBuffer::new(BufferKind::Vertex),
            indices: GrowableBuffer::new(BufferKind::Index),
        }
    }

    /// Grows each buffer kind independently to fit the frame's payload.
    pub fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        vertex_bytes: u64,
        index_bytes: u64,
    ) -> SlotGrowth {
        let growth = plan_slot_growth(
            self.vertices.capacity(),
            self.indices.capacity(),
            vertex_bytes,
            index_bytes,
        );
        if let Some(size) = growth.vertex {
            self.vertices.grow_to(device, size);
        }
        if let Some(size) = growth.index {
            self.indices.grow_to(device, size);
        }
        growth
    }
}

/// Ring of lazily created frame slots.
pub struct FramePool {
    slots: Vec<Option<FrameSlot>>,
    index: usize,
}

impl FramePool {
    pub fn new(frames_in_flight: usize) -> Self {
        debug_assert!(frames_in_flight >= 1);
        Self {
            slots: (0..frames_in_flight).map(|_| None).collect(),
            // Wraps to slot 0 on the first advance.
            index: usize::MAX,
        }
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Moves to the next slot and returns its index.
    pub fn advance(&mut self) -> usize {
        self.index = next_slot(self.index, self.slots.len());
        self.index
    }

    /// Returns the slot at `index`, creating it on first use.
    pub fn slot_mut(&mut self, index: usize) -> &mut FrameSlot {
        self.slots[index].get_or_insert_with(|| {
            log::debug!("creating overlay frame slot {index}");
            FrameSlot::new()
        })
    }

    pub fn slot(&self, index: usize) -> Option<&FrameSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn allocated_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[inline]
fn next_slot(previous: usize, frames_in_flight: usize) -> usize {
    previous.wrapping_add(1) % frames_in_flight
}
