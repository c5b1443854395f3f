mod demo_ui;
mod painter;

use anyhow::Result;

use halo_engine::core::{App, AppControl, FrameCtx, SetupCtx};
use halo_engine::device::GpuInit;
use halo_engine::input::{Key, MouseButton};
use halo_engine::logging::{init_logging, LoggingConfig};
use halo_engine::render::DEFAULT_FRAMES_IN_FLIGHT;
use halo_engine::ui::TextureId;
use halo_engine::window::{CursorIcon, Runtime, RuntimeConfig};

use demo_ui::DemoUi;

const CHECKER_SIZE: u32 = 64;
const ROW_COUNT: usize = 40;
const ROW_HEIGHT: f32 = 22.0;

const PANEL: [u8; 4] = [36, 38, 46, 235];
const PANEL_EDGE: [u8; 4] = [90, 96, 120, 255];
const ROW_A: [u8; 4] = [52, 56, 70, 255];
const ROW_B: [u8; 4] = [46, 50, 62, 255];
const ACCENT: [u8; 4] = [94, 160, 255, 255];
const HOT: [u8; 4] = [255, 180, 80, 255];

struct Studio {
    checker: Option<(wgpu::Texture, TextureId)>,
    scroll: f32,
    selected: Option<usize>,
}

impl Studio {
    fn new() -> Self {
        Self {
            checker: None,
            scroll: 0.0,
            selected: None,
        }
    }
}

impl App for Studio {
    type Ui = DemoUi;

    fn create_ui(&mut self) -> DemoUi {
        DemoUi::new()
    }

    fn on_overlay_ready(&mut self, ctx: &mut SetupCtx<'_, DemoUi>) {
        let (texture, view) = checker_texture(ctx.device, ctx.queue);
        let id = ctx.overlay.bind_texture(&view);
        log::info!(
            "overlay ready: {} frame slot(s), font {:?}, checker {:?}, {} texture(s) bound",
            ctx.overlay.frames_in_flight(),
            ctx.overlay.font_texture_id(),
            id,
            ctx.overlay.bound_textures()
        );
        self.checker = Some((texture, id));
    }

    fn build(&mut self, ctx: &mut FrameCtx<'_, DemoUi>) -> AppControl {
        let ui = &mut *ctx.ui;

        if ui.last_key() == Some(Key::Escape) {
            return AppControl::Exit;
        }

        let [w, h] = ui.display_size();

        // Side panel with a scrolling, clipped list.
        let panel_min = [16.0, 16.0];
        let panel_max = [(w * 0.35).max(200.0), h - 16.0];
        let list_min = [panel_min[0] + 8.0, panel_min[1] + 40.0];
        let list_max = [panel_max[0] - 8.0, panel_max[1] - 8.0];

        let content = ROW_COUNT as f32 * ROW_HEIGHT;
        let visible = (list_max[1] - list_min[1]).max(0.0);
        if ui.hovered(list_min, list_max) {
            self.scroll -= ui.wheel()[1] * ROW_HEIGHT;
        }
        self.scroll = self.scroll.clamp(0.0, (content - visible).max(0.0));

        let mut hovered_row = None;
        for i in 0..ROW_COUNT {
            let y = list_min[1] + i as f32 * ROW_HEIGHT - self.scroll;
            let row_min = [list_min[0], y];
            let row_max = [list_max[0], y + ROW_HEIGHT - 2.0];
            if y + ROW_HEIGHT >= list_min[1] && y < list_max[1] && ui.hovered(row_min, row_max) {
                hovered_row = Some(i);
            }
        }
        if let Some(i) = hovered_row {
            if ui.hovered(list_min, list_max) && ui.was_clicked(MouseButton::Left) {
                self.selected = Some(i);
            }
        }

        let pulse = (ui.time() * 2.0).sin() * 0.5 + 0.5;
        let mouse = ui.mouse_pos();
        let typed = ui.typed().len();
        let shift = ui.modifiers().shift;
        let checker = self.checker.as_ref().map(|(_, id)| *id);

        let p = ui.painter();
        p.fill_rect(panel_min, panel_max, PANEL);
        p.outline(panel_min, panel_max, 1.0, PANEL_EDGE);
        p.fill_rect(
            [panel_min[0] + 8.0, panel_min[1] + 8.0],
            [panel_min[0] + 8.0 + 120.0 * pulse + 16.0, panel_min[1] + 28.0],
            ACCENT,
        );

        p.push_clip(list_min, list_max);
        for i in 0..ROW_COUNT {
            let y = list_min[1] + i as f32 * ROW_HEIGHT - self.scroll;
            if y + ROW_HEIGHT < list_min[1] || y > list_max[1] {
                continue;
            }
            let col = match (self.selected == Some(i), hovered_row == Some(i)) {
                (true, _) => ACCENT,
                (false, true) => HOT,
                _ if i % 2 == 0 => ROW_A,
                _ => ROW_B,
            };
            p.fill_rect([list_min[0], y], [list_max[0], y + ROW_HEIGHT - 2.0], col);
        }
        p.pop_clip();

        // Image preview.
        if let Some(id) = checker {
            let size = if shift { 256.0 } else { 160.0 };
            let min = [panel_max[0] + 24.0, 16.0];
            p.image(min, [min[0] + size, min[1] + size], id);
            p.outline(min, [min[0] + size, min[1] + size], 1.0, PANEL_EDGE);
        }

        // One block per typed character.
        for i in 0..typed.min(64) {
            let x = panel_max[0] + 24.0 + i as f32 * 10.0;
            p.fill_rect([x, h - 32.0], [x + 8.0, h - 16.0], HOT);
        }

        if let Some([x, y]) = mouse {
            p.fill_rect([x - 3.0, y - 3.0], [x + 3.0, y + 3.0], HOT);
        }

        let cursor = if hovered_row.is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        ctx.window.set_cursor(cursor);

        AppControl::Continue
    }
}

/// Two-tone checkerboard uploaded as an RGBA8 texture.
fn checker_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: CHECKER_SIZE,
        height: CHECKER_SIZE,
        depth_or_array_layers: 1,
    };

    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let on = ((x / 8) + (y / 8)) % 2 == 0;
            let px: [u8; 4] = if on { [230, 230, 235, 255] } else { [60, 64, 80, 255] };
            pixels.extend_from_slice(&px);
        }
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("studio checker"),
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
        &pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(CHECKER_SIZE * 4),
            rows_per_image: Some(CHECKER_SIZE),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Reads `HALO_FRAMES_IN_FLIGHT`, falling back to the default on absence or garbage.
fn frames_in_flight() -> usize {
    match std::env::var("HALO_FRAMES_IN_FLIGHT") {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                log::warn!("ignoring HALO_FRAMES_IN_FLIGHT={raw:?}; expected a positive integer");
                DEFAULT_FRAMES_IN_FLIGHT
            }
        },
        Err(_) => DEFAULT_FRAMES_IN_FLIGHT,
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "halo studio".to_string(),
        frames_in_flight: frames_in_flight(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), Studio::new())
}
