/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// one. Hand it back to [`Gpu::present`](super::Gpu) once recorded.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub depth_view: Option<wgpu::TextureView>,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Begins the frame's single pass: clear the color target, store the result.
    ///
    /// Depth, when present, is cleared to 1.0 and discarded at the end.
    pub fn begin_pass(&mut self, clear: wgpu::Color) -> wgpu::RenderPass<'_> {
        let depth_stencil_attachment =
            self.depth_view
                .as_ref()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                });

        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("halo frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
