use crate::input::InputBridge;
use crate::ui::{DisplayMetrics, DrawData, FontAtlas, TextureId, UiContext};

use super::error::OverlayError;
use super::pipeline::{PipelineRegistry, COMMON_GROUP};
use super::pool::FramePool;
use super::textures::{image_bind_group, BindGroupCache};
use super::translate::{geometry_bytes, plan_draws, replay, stage_geometry, DrawPlan};
use super::uniforms::{gamma_for_format, Uniforms};

pub const DEFAULT_FRAMES_IN_FLIGHT: usize = 2;

/// Overlay construction parameters.
#[derive(Debug, Copy, Clone)]
pub struct OverlayConfig {
    /// Format of the color target the overlay draws into.
    pub surface_format: wgpu::TextureFormat,

    /// Depth format of the pass, if the pass has a depth attachment.
    pub depth_format: Option<wgpu::TextureFormat>,

    /// Number of vertex/index buffer slots cycled across frames. Must be >= 1.
    pub frames_in_flight: usize,
}

impl OverlayConfig {
    pub fn new(surface_format: wgpu::TextureFormat) -> Self {
        Self {
            surface_format,
            depth_format: None,
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
        }
    }
}

/// What a call to [`Overlay::render`] did.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    /// Frame slot used, `None` when the frame had no geometry.
    pub slot: Option<usize>,
    pub vertices: usize,
    pub indices: usize,
    pub draw_calls: usize,
    pub skipped_commands: usize,
}

/// GPU work derived from one frame of draw data.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub uniforms: Uniforms,
    pub geometry: Option<GeometryPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPlan {
    pub vertex_bytes: u64,
    pub index_bytes: u64,
    pub framebuffer: (u32, u32),
    pub draws: DrawPlan,
}

/// Builds the frame plan. Uniforms are always produced; geometry only when
/// there is something to draw into a non-empty framebuffer.
pub fn plan_frame(data: &DrawData, gamma: f32) -> FramePlan {
    let size = [data.display_size[0].max(1.0), data.display_size[1].max(1.0)];
    let uniforms = Uniforms::new(data.display_pos, size, gamma);

    let framebuffer = data.framebuffer_size();
    if data.total_vtx_count() == 0 || framebuffer.0 == 0 || framebuffer.1 == 0 {
        return FramePlan { uniforms, geometry: None };
    }

    let (vertex_bytes, index_bytes) = geometry_bytes(data);
    FramePlan {
        uniforms,
        geometry: Some(GeometryPlan {
            vertex_bytes,
            index_bytes,
            framebuffer,
            draws: plan_draws(data, framebuffer),
        }),
    }
}

/// Renders an immediate-mode UI library's output on top of a render pass.
///
/// Owns every GPU object it creates. Fields are declared so that dropping the
/// overlay releases bind groups and buffers before the layouts and pipeline
/// they depend on.
pub struct Overlay<U: UiContext> {
    textures: BindGroupCache<wgpu::TextureView, wgpu::BindGroup>,
    pool: FramePool,
    common_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    font_texture: wgpu::Texture,
    pipeline: PipelineRegistry,

    ui: U,
    input: InputBridge,
    device: wgpu::Device,
    queue: wgpu::Queue,

    font_texture_id: TextureId,
    gamma: f32,
    frame_open: bool,
}

impl<U: UiContext> Overlay<U> {
    /// Builds the pipeline, shared bindings, and font texture.
    pub fn initialize(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: OverlayConfig,
        mut ui: U,
    ) -> Result<Self, OverlayError> {
        if config.frames_in_flight == 0 {
            return Err(OverlayError::InvalidConfig(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }

        let (font_texture, font_view) = upload_font_atlas(device, queue, ui.font_atlas())?;

        let pipeline = PipelineRegistry::new(device, config.surface_format, config.depth_format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("halo overlay sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("halo overlay ubo"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let common_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("halo overlay common bind group"),
            layout: pipeline.common_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let mut textures = BindGroupCache::new();
        let font_texture_id = textures.bind_with(&font_view, || {
            image_bind_group(device, pipeline.image_layout(), &font_view)
        });
        ui.set_font_texture(font_texture_id);

        let gamma = gamma_for_format(config.surface_format);
        log::info!(
            "overlay initialized: format {:?}, depth {:?}, {} frame(s) in flight, gamma {}",
            config.surface_format,
            config.depth_format,
            config.frames_in_flight,
            gamma
        );

        Ok(Self {
            textures,
            pool: FramePool::new(config.frames_in_flight),
            common_group,
            uniform_buffer,
            font_texture,
            pipeline,
            ui,
            input: InputBridge::new(),
            device: device.clone(),
            queue: queue.clone(),
            font_texture_id,
            gamma,
            frame_open: false,
        })
    }

    /// The UI library, for building this frame's widgets between
    /// [`update`](Self::update) and [`render`](Self::render).
    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Input sink for window-system event callbacks.
    pub fn input_mut(&mut self) -> &mut InputBridge {
        &mut self.input
    }

    pub fn font_texture_id(&self) -> TextureId {
        self.font_texture_id
    }

    pub fn frames_in_flight(&self) -> usize {
        self.pool.frames_in_flight()
    }

    /// Texture bindings held, the font atlas included.
    pub fn bound_textures(&self) -> usize {
        self.textures.len()
    }

    /// Starts a UI frame: timing, display metrics, queued input, then `new_frame`.
    pub fn update(&mut self, delta_seconds: f32, display: DisplayMetrics) -> Result<(), OverlayError> {
        if self.frame_open {
            log::error!("overlay update called twice in one frame");
            return Err(OverlayError::FrameAlreadyStarted);
        }

        self.ui.set_display(display);
        self.ui.set_delta_time(delta_seconds.max(f32::MIN_POSITIVE));
        self.input.flush(&mut self.ui);
        self.ui.new_frame();
        self.frame_open = true;
        Ok(())
    }

    /// Finalizes the UI frame and records its draw calls into `pass`.
    pub fn render(&mut self, pass: &mut wgpu::RenderPass<'_>) -> Result<FrameStats, OverlayError> {
        if !self.frame_open {
            log::error!("overlay render called before update");
            return Err(OverlayError::FrameNotStarted);
        }
        self.frame_open = false;

        let data = self.ui.render();
        let plan = plan_frame(data, self.gamma);

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&plan.uniforms));

        let Some(geometry) = plan.geometry else {
            return Ok(FrameStats::default());
        };

        let slot_index = self.pool.advance();
        let slot = self.pool.slot_mut(slot_index);
        slot.ensure_capacity(&self.device, geometry.vertex_bytes, geometry.index_bytes);
        stage_geometry(slot, &self.queue, data);

        let (Some(vbo), Some(ibo)) = (slot.vertices.buffer(), slot.indices.buffer()) else {
            return Ok(FrameStats::default());
        };

        let (fb_w, fb_h) = geometry.framebuffer;
        pass.set_viewport(0.0, 0.0, fb_w as f32, fb_h as f32, 0.0, 1.0);
        pass.set_pipeline(self.pipeline.pipeline());
        pass.set_bind_group(COMMON_GROUP, &self.common_group, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..geometry.vertex_bytes));
        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);

        let replayed = replay(&geometry.draws.ops, pass, &self.textures);

        Ok(FrameStats {
            slot: Some(slot_index),
            vertices: data.total_vtx_count(),
            indices: data.total_idx_count(),
            draw_calls: replayed.draws,
            skipped_commands: geometry.draws.skipped + replayed.unbound,
        })
    }

    /// Registers a host texture for use in draw commands.
    ///
    /// Binding the same view again returns the same id.
    pub fn bind_texture(&mut self, view: &wgpu::TextureView) -> TextureId {
        self.textures.bind_with(view, || {
            image_bind_group(&self.device, self.pipeline.image_layout(), view)
        })
    }

    /// Releases every GPU object and the UI context.
    pub fn dispose(mut self) {
        log::debug!(
            "disposing overlay: {} texture binding(s), {} frame slot(s)",
            self.textures.len(),
            self.pool.allocated_slots()
        );
        self.textures.clear();
        self.font_texture.destroy();
    }
}

fn upload_font_atlas(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    atlas: FontAtlas<'_>,
) -> Result<(wgpu::Texture, wgpu::TextureView), OverlayError> {
    if atlas.pixels.len() != atlas.expected_len() || atlas.width == 0 || atlas.height == 0 {
        return Err(OverlayError::FontAtlasSize {
            width: atlas.width,
            height: atlas.height,
            expected: atlas.expected_len(),
            actual: atlas.pixels.len(),
        });
    }

    let limit = device.limits().max_texture_dimension_2d;
    if atlas.width > limit || atlas.height > limit {
        return Err(OverlayError::FontAtlasTooLarge {
            width: atlas.width,
            height: atlas.height,
            limit,
        });
    }

    let size = wgpu::Extent3d {
        width: atlas.width,
        height: atlas.height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("halo overlay font atlas"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        atlas.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(atlas.width * 4),
            rows_per_image: Some(atlas.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    log::debug!("uploaded {}x{} font atlas", atlas.width, atlas.height);
    Ok((texture, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{ClipRect, DrawCmd, DrawList, DrawVert};

    fn quad_list() -> DrawList {
        DrawList {
            vertices: vec![DrawVert::default(); 4],
            indices: vec![0, 1, 2, 0, 2, 3],
            commands: vec![DrawCmd {
                elem_count: 6,
                idx_offset: 0,
                vtx_offset: 0,
                clip_rect: ClipRect::new([0.0, 0.0], [800.0, 600.0]),
                texture_id: TextureId(1),
                callback: None,
            }],
        }
    }

    fn frame(lists: Vec<DrawList>) -> DrawData {
        DrawData {
            lists,
            display_pos: [0.0, 0.0],
            display_size: [800.0, 600.0],
            framebuffer_scale: [1.0, 1.0],
        }
    }

    #[test]
    fn empty_frame_still_updates_uniforms() {
        let data = frame(vec![DrawList::new()]);
        let plan = plan_frame(&data, 1.0);

        assert!(plan.geometry.is_none());
        assert_eq!(plan.uniforms, Uniforms::new([0.0, 0.0], [800.0, 600.0], 1.0));
    }

    #[test]
    fn quad_frame_plans_one_draw_with_exact_sizes() {
        let plan = plan_frame(&frame(vec![quad_list()]), 2.2);
        let geometry = plan.geometry.expect("geometry");

        assert_eq!(geometry.vertex_bytes, 80);
        assert_eq!(geometry.index_bytes, 12);
        assert_eq!(geometry.framebuffer, (800, 600));
        assert_eq!(geometry.draws.draws, 1);
        assert_eq!(plan.uniforms.gamma, 2.2);
    }

    #[test]
    fn zero_sized_display_draws_nothing() {
        let mut data = frame(vec![quad_list()]);
        data.display_size = [0.0, 0.0];
        let plan = plan_frame(&data, 1.0);

        assert!(plan.geometry.is_none());
        assert!(plan.uniforms.mvp.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn default_config_has_two_frames_in_flight() {
        let config = OverlayConfig::new(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(config.frames_in_flight, DEFAULT_FRAMES_IN_FLIGHT);
        assert!(config.depth_format.is_none());
    }
}
