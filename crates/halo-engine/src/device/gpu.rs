use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::core::{FrameError, PresentTarget};

use super::surface;
use super::{GpuFrame, GpuInit};

/// Owns wgpu core objects and the surface configuration.
///
/// - creates and stores Adapter/Device/Queue
/// - creates and configures the Surface (swapchain) and optional depth target
/// - acquires and presents frames for the frame orchestrator
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the window must outlive `Gpu`.
    surface: wgpu::Surface<'w>,

    /// Selected adapter, kept to re-query surface capabilities.
    adapter: wgpu::Adapter,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current framebuffer size in physical pixels (may be zero when minimized).
    size: PhysicalSize<u32>,

    depth_format: Option<wgpu::TextureFormat>,
    depth_view: Option<wgpu::TextureView>,

    /// Errors reported asynchronously by the driver.
    driver_errors: Arc<AtomicU64>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(surface::is_drawable(size), "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("halo device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let driver_errors = Arc::new(AtomicU64::new(0));
        {
            let counter = Arc::clone(&driver_errors);
            device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
                counter.fetch_add(1, Ordering::Relaxed);
                log::error!("wgpu device error: {err}");
            }));
        }

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let depth_view = init
            .depth_format
            .map(|f| surface::create_depth_view(&device, f, size));

        log::info!(
            "gpu ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            depth_format: init.depth_format,
            depth_view,
            driver_errors,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_format
    }

    /// Returns the current framebuffer size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Number of asynchronous driver errors seen so far.
    pub fn driver_error_count(&self) -> u64 {
        self.driver_errors.load(Ordering::Relaxed)
    }
}

impl PresentTarget for Gpu<'_> {
    type Frame = GpuFrame;

    fn framebuffer_size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn acquire(&mut self) -> std::result::Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("halo frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            depth_view: self.depth_view.clone(),
            encoder,
        })
    }

    /// Configures the surface at `size`, keeping the format the overlay was built for.
    fn reconfigure(&mut self, size: PhysicalSize<u32>) -> Result<(), FrameError> {
        let caps = self.surface.get_capabilities(&self.adapter);
        if !surface::supports_format(&caps.formats, self.config.format) {
            log::error!(
                "surface no longer supports {:?} (offered {:?})",
                self.config.format,
                caps.formats
            );
            return Err(FrameError::FormatUnsupported(self.config.format));
        }

        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);

        if let Some(format) = self.depth_format {
            self.depth_view = Some(surface::create_depth_view(&self.device, format, size));
        }

        log::debug!("surface configured at {}x{}", size.width, size.height);
        Ok(())
    }

    fn present(&mut self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view, depth_view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        drop(depth_view);
        surface_texture.present();
    }
}
