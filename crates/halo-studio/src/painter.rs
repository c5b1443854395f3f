use halo_engine::ui::{ClipRect, DrawCmd, DrawList, DrawVert, TextureId};

/// Accumulates quads into draw lists, merging runs that share clip and texture.
pub struct Painter {
    lists: Vec<DrawList>,
    clip_stack: Vec<ClipRect>,
    white_uv: [f32; 2],
    font_texture: TextureId,
}

impl Painter {
    pub fn new() -> Self {
        Self {
            lists: vec![DrawList::new()],
            clip_stack: Vec::new(),
            white_uv: [0.5, 0.5],
            font_texture: TextureId::default(),
        }
    }

    pub fn set_font_texture(&mut self, id: TextureId) {
        self.font_texture = id;
    }

    /// Starts a frame covering `display`.
    pub fn begin(&mut self, display: [f32; 2]) {
        self.lists.truncate(1);
        self.lists[0].clear();
        self.clip_stack.clear();
        self.clip_stack.push(ClipRect::new([0.0, 0.0], display));
    }

    /// Hands the finished lists over, leaving an empty painter behind.
    pub fn finish(&mut self) -> Vec<DrawList> {
        std::mem::replace(&mut self.lists, vec![DrawList::new()])
    }

    /// Intersects `rect` with the current clip and pushes it.
    pub fn push_clip(&mut self, min: [f32; 2], max: [f32; 2]) {
        let parent = self.current_clip();
        self.clip_stack.push(ClipRect::new(
            [min[0].max(parent.min[0]), min[1].max(parent.min[1])],
            [max[0].min(parent.max[0]), max[1].min(parent.max[1])],
        ));
    }

    pub fn pop_clip(&mut self) {
        if self.clip_stack.len() > 1 {
            self.clip_stack.pop();
        }
    }

    pub fn fill_rect(&mut self, min: [f32; 2], max: [f32; 2], col: [u8; 4]) {
        let uv = self.white_uv;
        self.quad(min, max, [uv, uv], col, self.font_texture);
    }

    pub fn image(&mut self, min: [f32; 2], max: [f32; 2], texture: TextureId) {
        self.quad(min, max, [[0.0, 0.0], [1.0, 1.0]], [255; 4], texture);
    }

    pub fn outline(&mut self, min: [f32; 2], max: [f32; 2], thickness: f32, col: [u8; 4]) {
        let t = thickness;
        self.fill_rect(min, [max[0], min[1] + t], col);
        self.fill_rect([min[0], max[1] - t], max, col);
        self.fill_rect([min[0], min[1] + t], [min[0] + t, max[1] - t], col);
        self.fill_rect([max[0] - t, min[1] + t], [max[0], max[1] - t], col);
    }

    fn current_clip(&self) -> ClipRect {
        self.clip_stack
            .last()
            .copied()
            .unwrap_or(ClipRect::new([0.0, 0.0], [f32::MAX, f32::MAX]))
    }

    fn quad(
        &mut self,
        min: [f32; 2],
        max: [f32; 2],
        uv: [[f32; 2]; 2],
        col: [u8; 4],
        texture: TextureId,
    ) {
        let clip = self.current_clip();
        if clip.is_degenerate() {
            return;
        }

        // 16-bit indices: open a new list before overflowing.
        if self.lists.last().map_or(true, |l| l.vertices.len() + 4 > u16::MAX as usize) {
            self.lists.push(DrawList::new());
        }
        let Some(list) = self.lists.last_mut() else {
            return;
        };

        let base = list.vertices.len() as u16;
        list.vertices.extend_from_slice(&[
            DrawVert::new(min, uv[0], col),
            DrawVert::new([max[0], min[1]], [uv[1][0], uv[0][1]], col),
            DrawVert::new(max, uv[1], col),
            DrawVert::new([min[0], max[1]], [uv[0][0], uv[1][1]], col),
        ]);
        let idx_offset = list.indices.len() as u32;
        list.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        match list.commands.last_mut() {
            Some(cmd)
                if cmd.clip_rect == clip
                    && cmd.texture_id == texture
                    && cmd.callback.is_none()
                    && cmd.idx_offset + cmd.elem_count == idx_offset =>
            {
                cmd.elem_count += 6;
            }
            _ => list.commands.push(DrawCmd {
                elem_count: 6,
                idx_offset,
                vtx_offset: 0,
                clip_rect: clip,
                texture_id: texture,
                callback: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_clip_and_texture_merge_into_one_command() {
        let mut p = Painter::new();
        p.begin([100.0, 100.0]);
        p.fill_rect([0.0, 0.0], [10.0, 10.0], [255; 4]);
        p.fill_rect([20.0, 0.0], [30.0, 10.0], [255; 4]);

        let lists = p.finish();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].vertices.len(), 8);
        assert_eq!(lists[0].commands.len(), 1);
        assert_eq!(lists[0].commands[0].elem_count, 12);
    }

    #[test]
    fn clip_change_splits_commands() {
        let mut p = Painter::new();
        p.begin([100.0, 100.0]);
        p.fill_rect([0.0, 0.0], [10.0, 10.0], [255; 4]);
        p.push_clip([50.0, 50.0], [200.0, 200.0]);
        p.fill_rect([60.0, 60.0], [70.0, 70.0], [255; 4]);
        p.pop_clip();

        let lists = p.finish();
        let cmds = &lists[0].commands;
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[1].idx_offset, 6);
        assert_eq!(cmds[1].clip_rect, ClipRect::new([50.0, 50.0], [100.0, 100.0]));
    }

    #[test]
    fn image_uses_its_texture() {
        let mut p = Painter::new();
        p.set_font_texture(TextureId(1));
        p.begin([100.0, 100.0]);
        p.fill_rect([0.0, 0.0], [10.0, 10.0], [255; 4]);
        p.image([0.0, 0.0], [10.0, 10.0], TextureId(7));

        let lists = p.finish();
        let textures: Vec<_> = lists[0].commands.iter().map(|c| c.texture_id).collect();
        assert_eq!(textures, vec![TextureId(1), TextureId(7)]);
    }

    #[test]
    fn fully_clipped_quads_emit_nothing() {
        let mut p = Painter::new();
        p.begin([100.0, 100.0]);
        p.push_clip([150.0, 150.0], [200.0, 200.0]);
        p.fill_rect([160.0, 160.0], [170.0, 170.0], [255; 4]);
        p.pop_clip();

        let lists = p.finish();
        assert!(lists[0].vertices.is_empty());
        assert!(lists[0].commands.is_empty());
    }
}
