use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::collections::HashMap;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{
    App as CoreApp, AppControl, FrameCtx, FrameOrchestrator, FrameOutcome, SetupCtx, WindowCtx,
};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::feed_window_event;
use crate::render::{Overlay, OverlayConfig, DEFAULT_FRAMES_IN_FLIGHT};
use crate::time::FrameClock;
use crate::ui::DisplayMetrics;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Color the frame pass clears to before the overlay draws.
    pub clear_color: wgpu::Color,

    /// Buffer slots the overlay cycles through.
    pub frames_in_flight: usize,

    /// Depth attachment for the frame pass. Overrides `GpuInit::depth_format`.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "halo".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: wgpu::Color { r: 0.1, g: 0.1, b: 0.12, a: 1.0 },
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
            depth_format: None,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct SurfaceEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything one window needs to produce frames.
///
/// The overlay is declared first so it is disposed before the surface.
struct WindowEntry<U: crate::ui::UiContext> {
    overlay: Overlay<U>,
    surface: SurfaceEntry,
    orchestrator: FrameOrchestrator,
    clock: FrameClock,
    clear_color: wgpu::Color,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    windows: HashMap<WindowId, WindowEntry<A::Ui>>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            windows: HashMap::new(),
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window_entry(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: RuntimeConfig,
    ) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = GpuInit {
            depth_format: config.depth_format,
            ..self.gpu_init.clone()
        };

        let surface = SurfaceEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        let ui = self.app.create_ui();
        let mut overlay = surface
            .with_gpu(|gpu| {
                let overlay_config = OverlayConfig {
                    surface_format: gpu.surface_format(),
                    depth_format: gpu.depth_format(),
                    frames_in_flight: config.frames_in_flight,
                };
                Overlay::initialize(gpu.device(), gpu.queue(), overlay_config, ui)
            })
            .context("overlay initialization failed")?;

        let app = &mut self.app;
        surface.with(|fields| {
            let mut ctx = SetupCtx {
                window: WindowCtx { id, window: fields.window },
                device: fields.gpu.device(),
                queue: fields.gpu.queue(),
                overlay: &mut overlay,
            };
            app.on_overlay_ready(&mut ctx);
        });

        self.windows.insert(
            id,
            WindowEntry {
                overlay,
                surface,
                orchestrator: FrameOrchestrator::new(),
                clock: FrameClock::default(),
                clear_color: config.clear_color,
            },
        );
        Ok(id)
    }

    fn destroy_window_entry(&mut self, id: WindowId) {
        if let Some(entry) = self.windows.remove(&id) {
            let WindowEntry { overlay, surface, .. } = entry;
            let driver_errors = surface.with_gpu(|gpu| gpu.driver_error_count());
            log::info!("closing window {id:?} ({driver_errors} driver error(s) reported)");
            overlay.dispose();
            drop(surface);
        }
    }

    fn resize(&mut self, id: WindowId, size: PhysicalSize<u32>) {
        let Some(entry) = self.windows.get_mut(&id) else {
            return;
        };

        let orchestrator = &mut entry.orchestrator;
        let was_minimized = orchestrator.is_minimized();
        let result = entry
            .surface
            .with_gpu_mut(|gpu| orchestrator.resize(gpu, size));

        if let Err(err) = result {
            log::error!("{:#}", anyhow::Error::from(err));
            self.request_exit();
            return;
        }

        // Time spent minimized must not show up as one huge delta.
        if was_minimized && !entry.orchestrator.is_minimized() {
            entry.clock.reset();
        }
        entry.surface.with_window(|w| w.request_redraw());
    }

    /// Drives one frame for `id`. Returns `false` when the loop should stop.
    fn redraw(&mut self, id: WindowId) -> bool {
        let (app, windows) = (&mut self.app, &mut self.windows);
        let Some(entry) = windows.get_mut(&id) else {
            return true;
        };

        let WindowEntry {
            overlay,
            surface,
            orchestrator,
            clock,
            clear_color,
        } = entry;

        let mut control = AppControl::Continue;

        let result = surface.with_mut(|fields| {
            let window: &Window = fields.window;
            let time = clock.tick();
            let scale = window.scale_factor();
            let logical = window.inner_size().to_logical::<f64>(scale);
            let metrics = DisplayMetrics::new(
                [logical.width as f32, logical.height as f32],
                [scale as f32, scale as f32],
            );

            orchestrator.frame(fields.gpu, |frame| {
                let mut pass = frame.begin_pass(*clear_color);

                overlay.update(time.dt, metrics)?;
                {
                    let mut ctx = FrameCtx {
                        window: WindowCtx { id, window },
                        ui: overlay.ui_mut(),
                        time,
                    };
                    control = app.build(&mut ctx);
                }
                let stats = overlay.render(&mut pass)?;
                drop(pass);

                log::trace!(
                    "frame {}: {} vtx, {} idx, {} draw(s), {} skipped",
                    time.frame_index,
                    stats.vertices,
                    stats.indices,
                    stats.draw_calls,
                    stats.skipped_commands
                );

                window.pre_present_notify();
                Ok(())
            })
        });

        match result {
            Ok(FrameOutcome::Presented) => {}
            Ok(FrameOutcome::Skipped(reason)) => log::trace!("frame skipped: {reason:?}"),
            Err(err) => {
                log::error!("{:#}", anyhow::Error::from(err));
                return false;
            }
        }

        control == AppControl::Continue
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit();
            event_loop.exit();
            return;
        }

        for entry in self.windows.values() {
            entry.surface.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Immediate-mode UI: redraw continuously.
        for entry in self.windows.values() {
            entry.surface.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, windows) = (&mut self.app, &mut self.windows);

        let Some(entry) = windows.get_mut(&window_id) else {
            return;
        };

        let scale = entry.surface.with_window(|w| w.scale_factor());
        feed_window_event(entry.overlay.input_mut(), scale, &event);

        if app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.destroy_window_entry(window_id);
                if self.windows.is_empty() {
                    self.request_exit();
                }
            }

            WindowEvent::Resized(new_size) => self.resize(window_id, *new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = self
                    .windows
                    .get(&window_id)
                    .map(|entry| entry.surface.with_window(|w| w.inner_size()));
                if let Some(size) = new_size {
                    self.resize(window_id, size);
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.redraw(window_id) {
                    self.request_exit();
                }
            }

            _ => {}
        }

        if self.exit_requested {
            for id in self.windows.keys().copied().collect::<Vec<_>>() {
                self.destroy_window_entry(id);
            }
            event_loop.exit();
        }
    }
}
