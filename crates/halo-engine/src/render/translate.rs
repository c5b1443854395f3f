//! Draw data → GPU command translation.
//!
//! Translation is split in two: [`plan_draws`] walks the draw lists and emits a
//! flat list of [`DrawOp`]s without touching the GPU, and [`replay`] applies
//! them to an open render pass. Geometry staging lives in [`stage_geometry`].

use std::hash::Hash;
use std::ops::Range;

use crate::ui::{ClipRect, DrawData, DrawIdx, DrawVert, TextureId};

use super::pipeline::IMAGE_GROUP;
use super::pool::FrameSlot;
use super::textures::BindGroupCache;

/// Scissor rectangle in framebuffer pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DrawOp {
    BindTexture(TextureId),
    Scissor(ScissorRect),
    Draw { indices: Range<u32>, base_vertex: i32 },
}

/// Result of planning one frame.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DrawPlan {
    pub ops: Vec<DrawOp>,
    pub draws: usize,
    /// Commands skipped for a callback or an empty clip.
    pub skipped: usize,
}

/// Scales a display-space clip rect to framebuffer pixels.
///
/// The rect is clamped to the framebuffer and rounded outward to whole pixels.
/// Returns `None` when nothing of it remains visible.
pub fn scissor_for(
    clip: ClipRect,
    display_pos: [f32; 2],
    scale: [f32; 2],
    framebuffer: (u32, u32),
) -> Option<ScissorRect> {
    let (fb_w, fb_h) = (framebuffer.0 as f32, framebuffer.1 as f32);

    let min_x = ((clip.min[0] - display_pos[0]) * scale[0]).max(0.0).floor();
    let min_y = ((clip.min[1] - display_pos[1]) * scale[1]).max(0.0).floor();
    let max_x = ((clip.max[0] - display_pos[0]) * scale[0]).min(fb_w).ceil();
    let max_y = ((clip.max[1] - display_pos[1]) * scale[1]).min(fb_h).ceil();

    // NaN compares false here, so malformed rects are skipped too.
    if !(max_x > min_x && max_y > min_y) {
        return None;
    }

    Some(ScissorRect {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x) as u32,
        height: (max_y - min_y) as u32,
    })
}

/// Plans the draw calls for a frame whose lists were staged back to back.
///
/// Base offsets advance by each list's full vertex/index counts after its
/// commands, regardless of which commands were skipped, so they stay in step
/// with the concatenated buffers.
pub fn plan_draws(data: &DrawData, framebuffer: (u32, u32)) -> DrawPlan {
    let mut plan = DrawPlan::default();
    let mut vtx_base: u32 = 0;
    let mut idx_base: u32 = 0;

    for list in &data.lists {
        for cmd in &list.commands {
            if cmd.callback.is_some() {
                plan.skipped += 1;
                continue;
            }

            plan.ops.push(DrawOp::BindTexture(cmd.texture_id));

            let Some(scissor) =
                scissor_for(cmd.clip_rect, data.display_pos, data.framebuffer_scale, framebuffer)
            else {
                plan.skipped += 1;
                continue;
            };

            let start = idx_base + cmd.idx_offset;
            plan.ops.push(DrawOp::Scissor(scissor));
            plan.ops.push(DrawOp::Draw {
                indices: start..start + cmd.elem_count,
                base_vertex: (vtx_base + cmd.vtx_offset) as i32,
            });
            plan.draws += 1;
        }

        vtx_base += list.vertices.len() as u32;
        idx_base += list.indices.len() as u32;
    }

    plan
}

/// Byte sizes of a frame's concatenated geometry.
pub fn geometry_bytes(data: &DrawData) -> (u64, u64) {
    let vtx = (data.total_vtx_count() * std::mem::size_of::<DrawVert>()) as u64;
    let idx = (data.total_idx_count() * std::mem::size_of::<DrawIdx>()) as u64;
    (vtx, idx)
}

/// Copies every list into the slot's staging memory and uploads it.
///
/// One `write_buffer` per buffer kind covers all lists. The slot must already
/// have capacity for [`geometry_bytes`].
pub fn stage_geometry(slot: &mut FrameSlot, queue: &wgpu::Queue, data: &DrawData) {
    let mut vtx_offset = 0usize;
    let mut idx_offset = 0usize;

    for list in &data.lists {
        let vtx: &[u8] = bytemuck::cast_slice(&list.vertices);
        let idx: &[u8] = bytemuck::cast_slice(&list.indices);
        slot.vertices.stage(vtx_offset, vtx);
        slot.indices.stage(idx_offset, idx);
        vtx_offset += vtx.len();
        idx_offset += idx.len();
    }

    slot.vertices.upload(queue, vtx_offset as u64);
    slot.indices.upload(queue, idx_offset as u64);
}

/// The subset of a render pass that [`replay`] drives.
pub trait OverlayPass<G> {
    fn bind_image_group(&mut self, group: &G);
    fn set_scissor(&mut self, rect: ScissorRect);
    fn draw_range(&mut self, indices: Range<u32>, base_vertex: i32);
}

impl OverlayPass<wgpu::BindGroup> for wgpu::RenderPass<'_> {
    fn bind_image_group(&mut self, group: &wgpu::BindGroup) {
        self.set_bind_group(IMAGE_GROUP, group, &[]);
    }

    fn set_scissor(&mut self, r: ScissorRect) {
        self.set_scissor_rect(r.x, r.y, r.width, r.height);
    }

    fn draw_range(&mut self, indices: Range<u32>, base_vertex: i32) {
        self.draw_indexed(indices, base_vertex, 0..1);
    }
}

/// What [`replay`] actually submitted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ReplayStats {
    pub draws: usize,
    /// Draws dropped because their texture id has no bind group.
    pub unbound: usize,
}

/// Applies planned ops to `pass`.
///
/// A command whose texture id is not in `textures` is not drawn at all, so it
/// can neither run with group 1 unset nor sample the previous command's texture.
pub fn replay<K, G, P>(ops: &[DrawOp], pass: &mut P, textures: &BindGroupCache<K, G>) -> ReplayStats
where
    K: Eq + Hash + Clone,
    P: OverlayPass<G> + ?Sized,
{
    let mut stats = ReplayStats::default();
    let mut bound = false;

    for op in ops {
        match op {
            DrawOp::BindTexture(id) => match textures.get(*id) {
                Some(group) => {
                    pass.bind_image_group(group);
                    bound = true;
                }
                None => {
                    log::warn!("skipping draw command with unbound texture {id:?}");
                    bound = false;
                }
            },
            DrawOp::Scissor(r) if bound => pass.set_scissor(*r),
            DrawOp::Draw { indices, base_vertex } if bound => {
                pass.draw_range(indices.clone(), *base_vertex);
                stats.draws += 1;
            }
            DrawOp::Draw { .. } => stats.unbound += 1,
            DrawOp::Scissor(_) => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{DrawCmd, DrawList, UserCallback};

    const FONT: TextureId = TextureId(1);

    fn cmd(elem_count: u32, idx_offset: u32, vtx_offset: u32, clip: ClipRect) -> DrawCmd {
        DrawCmd {
            elem_count,
            idx_offset,
            vtx_offset,
            clip_rect: clip,
            texture_id: FONT,
            callback: None,
        }
    }

    fn list(vertices: usize, indices: usize, commands: Vec<DrawCmd>) -> DrawList {
        DrawList {
            vertices: vec![DrawVert::default(); vertices],
            indices: vec![0; indices],
            commands,
        }
    }

    fn data(lists: Vec<DrawList>) -> DrawData {
        DrawData {
            lists,
            display_pos: [0.0, 0.0],
            display_size: [800.0, 600.0],
            framebuffer_scale: [1.0, 1.0],
        }
    }

    fn draws(plan: &DrawPlan) -> Vec<(Range<u32>, i32)> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Draw { indices, base_vertex } => Some((indices.clone(), *base_vertex)),
                _ => None,
            })
            .collect()
    }

    const FULL: ClipRect = ClipRect { min: [0.0, 0.0], max: [800.0, 600.0] };

    #[test]
    fn single_quad_emits_one_draw() {
        let d = data(vec![list(4, 6, vec![cmd(6, 0, 0, FULL)])]);
        let plan = plan_draws(&d, (800, 600));

        assert_eq!(plan.draws, 1);
        assert_eq!(draws(&plan), vec![(0..6, 0)]);
        assert!(plan.ops.contains(&DrawOp::Scissor(ScissorRect { x: 0, y: 0, width: 800, height: 600 })));
    }

    #[test]
    fn degenerate_clip_skips_draw_but_offsets_still_advance() {
        let empty_w = ClipRect::new([100.0, 0.0], [100.0, 50.0]);
        let inverted_h = ClipRect::new([0.0, 80.0], [50.0, 20.0]);
        let d = data(vec![
            list(4, 6, vec![cmd(3, 0, 0, empty_w), cmd(3, 3, 0, inverted_h)]),
            list(8, 12, vec![cmd(12, 0, 0, FULL)]),
        ]);

        let plan = plan_draws(&d, (800, 600));

        assert_eq!(plan.skipped, 2);
        // Second list is based on the first list's totals, not the drawn counts.
        assert_eq!(draws(&plan), vec![(6..18, 4)]);
    }

    #[test]
    fn command_offsets_add_to_list_bases() {
        let d = data(vec![
            list(10, 30, vec![cmd(30, 0, 0, FULL)]),
            list(6, 9, vec![cmd(3, 0, 0, FULL), cmd(6, 3, 2, FULL)]),
        ]);
        let plan = plan_draws(&d, (800, 600));
        assert_eq!(draws(&plan), vec![(0..30, 0), (30..33, 10), (33..39, 12)]);
    }

    #[test]
    fn callback_commands_are_skipped() {
        let mut c = cmd(6, 0, 0, FULL);
        c.callback = Some(UserCallback(42));
        let d = data(vec![list(4, 6, vec![c])]);

        let plan = plan_draws(&d, (800, 600));
        assert!(plan.ops.is_empty());
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn texture_is_bound_before_each_draw() {
        let mut c = cmd(6, 0, 0, FULL);
        c.texture_id = TextureId(9);
        let d = data(vec![list(4, 6, vec![c])]);

        let plan = plan_draws(&d, (800, 600));
        assert_eq!(plan.ops[0], DrawOp::BindTexture(TextureId(9)));
    }

    #[test]
    fn empty_frame_plans_nothing() {
        let plan = plan_draws(&data(Vec::new()), (800, 600));
        assert_eq!(plan, DrawPlan::default());
    }

    #[test]
    fn scissor_scales_and_clamps() {
        let clip = ClipRect::new([-10.0, 10.0], [500.0, 400.0]);
        let r = scissor_for(clip, [0.0, 0.0], [2.0, 2.0], (800, 600)).unwrap();
        assert_eq!(r, ScissorRect { x: 0, y: 20, width: 800, height: 580 });
    }

    #[test]
    fn scissor_rounds_outward() {
        let clip = ClipRect::new([10.4, 10.6], [20.2, 20.5]);
        let r = scissor_for(clip, [0.0, 0.0], [1.0, 1.0], (800, 600)).unwrap();
        assert_eq!(r, ScissorRect { x: 10, y: 10, width: 11, height: 11 });
    }

    #[test]
    fn scissor_respects_display_offset() {
        let clip = ClipRect::new([110.0, 60.0], [210.0, 160.0]);
        let r = scissor_for(clip, [100.0, 50.0], [1.0, 1.0], (800, 600)).unwrap();
        assert_eq!(r, ScissorRect { x: 10, y: 10, width: 100, height: 100 });
    }

    #[test]
    fn scissor_outside_framebuffer_is_none() {
        let clip = ClipRect::new([900.0, 0.0], [1000.0, 100.0]);
        assert!(scissor_for(clip, [0.0, 0.0], [1.0, 1.0], (800, 600)).is_none());
    }

    #[test]
    fn geometry_bytes_cover_all_lists() {
        let d = data(vec![list(4, 6, Vec::new()), list(3, 3, Vec::new())]);
        assert_eq!(geometry_bytes(&d), (7 * 20, 9 * 2));
    }

    #[derive(Debug, PartialEq)]
    enum Call {
        Bind(&'static str),
        Scissor(ScissorRect),
        Draw(Range<u32>, i32),
    }

    #[derive(Default)]
    struct RecordingPass {
        calls: Vec<Call>,
    }

    impl OverlayPass<&'static str> for RecordingPass {
        fn bind_image_group(&mut self, group: &&'static str) {
            self.calls.push(Call::Bind(*group));
        }
        fn set_scissor(&mut self, rect: ScissorRect) {
            self.calls.push(Call::Scissor(rect));
        }
        fn draw_range(&mut self, indices: Range<u32>, base_vertex: i32) {
            self.calls.push(Call::Draw(indices, base_vertex));
        }
    }

    const SCISSOR: ScissorRect = ScissorRect { x: 0, y: 0, width: 800, height: 600 };

    fn draw_ops(texture: TextureId, indices: Range<u32>) -> [DrawOp; 3] {
        [
            DrawOp::BindTexture(texture),
            DrawOp::Scissor(SCISSOR),
            DrawOp::Draw { indices, base_vertex: 0 },
        ]
    }

    #[test]
    fn unbound_texture_on_first_command_draws_nothing() {
        let cache: BindGroupCache<&'static str, &'static str> = BindGroupCache::new();
        let mut pass = RecordingPass::default();

        let stats = replay(&draw_ops(TextureId::default(), 0..6), &mut pass, &cache);

        assert!(pass.calls.is_empty());
        assert_eq!(stats, ReplayStats { draws: 0, unbound: 1 });
    }

    #[test]
    fn unbound_texture_does_not_reuse_previous_binding() {
        let mut cache: BindGroupCache<&'static str, &'static str> = BindGroupCache::new();
        let font = cache.bind_with(&"font", || "font group");

        let mut ops = Vec::new();
        ops.extend(draw_ops(font, 0..6));
        ops.extend(draw_ops(TextureId(99), 6..12));
        ops.extend(draw_ops(font, 12..18));

        let mut pass = RecordingPass::default();
        let stats = replay(&ops, &mut pass, &cache);

        assert_eq!(
            pass.calls,
            vec![
                Call::Bind("font group"),
                Call::Scissor(SCISSOR),
                Call::Draw(0..6, 0),
                Call::Bind("font group"),
                Call::Scissor(SCISSOR),
                Call::Draw(12..18, 0),
            ]
        );
        assert_eq!(stats, ReplayStats { draws: 2, unbound: 1 });
    }
}
