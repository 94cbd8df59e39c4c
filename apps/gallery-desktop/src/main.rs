use anyhow::{anyhow, Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use gallery_assets::{TextureHost, UploadedFile};
use gallery_common::{GalleryConfig, ImageHandle};
use gallery_input::{Embodiment, InputAdapter};
use gallery_kernel::Gallery;
use gallery_motion::{MotionController, MotionState};
use gallery_render::{FrameGeometry, TextureSampling, CAPTION_FONT_SIZE};
use gallery_render_wgpu::{GalleryCamera, WgpuRenderer};
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "gallery-desktop", about = "Walk through a gallery of your images")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Images to hang on startup
    images: Vec<PathBuf>,
}

/// Deferred gallery mutations requested from the UI.
enum UiAction {
    Remove(ImageHandle),
}

/// Application state.
struct AppState {
    gallery: Gallery,
    camera: GalleryCamera,
    controller: MotionController,
    motion: MotionState,
    input: InputAdapter,
    embodiment: Embodiment,
    show_panel: bool,
    path_field: String,
    pending_files: Vec<PathBuf>,
    actions: Vec<UiAction>,
    mouse_captured: bool,
    gpu_textures: usize,
    last_frame: Instant,
}

impl AppState {
    fn new(config: &GalleryConfig, images: Vec<PathBuf>) -> Result<Self> {
        let controller = MotionController::new(config.motion, config.room, config.camera.spawn);
        Ok(Self {
            gallery: Gallery::new(config.room, config.layout),
            camera: GalleryCamera::from_config(&config.camera),
            motion: controller.spawn_state(),
            controller,
            input: InputAdapter::from_config(&config.input)?,
            embodiment: Embodiment::Desktop,
            show_panel: true,
            path_field: String::new(),
            pending_files: images,
            actions: Vec::new(),
            mouse_captured: false,
            gpu_textures: 0,
            last_frame: Instant::now(),
        })
    }

    fn update(&mut self, dt: f32) {
        self.motion = self
            .controller
            .drive(self.motion, self.input.state(), &mut self.camera, dt);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        // Bindings are keyed by the physical code name ("KeyW", "ArrowUp").
        self.input.handle_key(&format!("{key:?}"), pressed);

        if !pressed {
            return;
        }
        match key {
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::Escape => self.mouse_captured = false,
            _ => {}
        }
    }

    /// Apply queued uploads and removals; the layout is current when this
    /// returns.
    fn apply_pending(&mut self, host: &mut dyn TextureHost) {
        if !self.pending_files.is_empty() {
            let mut files = Vec::new();
            for path in self.pending_files.drain(..) {
                match UploadedFile::read(&path) {
                    Ok(file) => files.push(file),
                    Err(e) => tracing::error!("failed to read {}: {e}", path.display()),
                }
            }
            let report = self.gallery.upload(files, host);
            tracing::info!(
                added = report.descriptors.len(),
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "images uploaded"
            );
        }

        for action in self.actions.drain(..) {
            match action {
                UiAction::Remove(handle) => {
                    self.gallery.remove(handle, host);
                }
            }
        }

        for event in self.gallery.drain_events() {
            tracing::debug!(?event, "gallery event");
        }
    }

    fn teardown(&mut self, host: &mut dyn TextureHost) {
        let released = self.gallery.teardown(host);
        self.input.clear();
        tracing::info!(released, "gallery closed");
    }

    fn draw_ui(&mut self, ctx: &EguiContext, viewport: (f32, f32)) {
        self.draw_captions(ctx, viewport);

        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("gallery")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Gallery");
                ui.label("WASD / arrows: walk");
                ui.label("Hold right mouse button: look around");
                ui.label("Drop image files on the window to hang them");
                ui.small(format!("Mode: {}", self.embodiment));
                ui.separator();

                ui.horizontal(|ui| {
                    let field = ui.text_edit_singleline(&mut self.path_field);
                    let submitted =
                        field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if (ui.button("Add").clicked() || submitted) && !self.path_field.trim().is_empty()
                    {
                        self.pending_files
                            .push(PathBuf::from(self.path_field.trim()));
                        self.path_field.clear();
                    }
                });
                ui.separator();

                let placed = self.gallery.placements().len();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (i, d) in self.gallery.descriptors().iter().enumerate() {
                        ui.horizontal(|ui| {
                            if i < placed {
                                ui.label(d.title());
                            } else {
                                ui.weak(format!("{} (not shown)", d.title()));
                            }
                            if ui.small_button("Remove").clicked() {
                                self.actions.push(UiAction::Remove(d.handle()));
                            }
                        });
                    }
                });

                ui.separator();
                if self.gallery.is_empty() {
                    ui.label("No images yet. Add some to fill the walls.");
                } else {
                    ui.label(format!("{} images in gallery", self.gallery.len()));
                }
                if self.gallery.dropped() > 0 {
                    ui.colored_label(
                        egui::Color32::from_rgb(200, 120, 0),
                        format!(
                            "{} not shown (walls hold {})",
                            self.gallery.dropped(),
                            self.gallery.capacity()
                        ),
                    );
                }
                ui.small(format!("GPU textures: {}", self.gpu_textures));
                ui.small(format!(
                    "Position: ({:.1}, {:.1}, {:.1})",
                    self.camera.position.x, self.camera.position.y, self.camera.position.z
                ));
                ui.small("F1: Toggle panel");
            });
    }

    /// Titles under each canvas, drawn at the projected caption anchor.
    fn draw_captions(&self, ctx: &EguiContext, (width, height): (f32, f32)) {
        let painter = ctx.layer_painter(egui::LayerId::background());
        let ppp = ctx.pixels_per_point();

        for artwork in self.gallery.artworks() {
            let geometry = FrameGeometry::new(artwork.placement);
            let anchor = geometry.caption_anchor;
            let (Some(top), Some(bottom)) = (
                self.camera.project(anchor, width, height),
                self.camera
                    .project(anchor - Vec3::Y * CAPTION_FONT_SIZE, width, height),
            ) else {
                continue;
            };

            // Pixels per world unit at the caption's depth.
            let scale = (bottom.y - top.y) / CAPTION_FONT_SIZE / ppp;
            let font_size = CAPTION_FONT_SIZE * scale;
            if font_size < 4.0 {
                continue;
            }
            let galley = painter.layout(
                artwork.descriptor.title().to_string(),
                egui::FontId::proportional(font_size),
                egui::Color32::from_gray(30),
                geometry.caption_max_width * scale,
            );
            let pos = egui::pos2(top.x / ppp - galley.size().x * 0.5, top.y / ppp);
            painter.galley(pos, galley, egui::Color32::from_gray(30));
        }
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Gallery")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gallery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.set_viewport(config.width, config.height);

        let mut renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            TextureSampling::default(),
        );
        self.state
            .apply_pending(&mut renderer.uploader(&device, &queue));
        self.state.gpu_textures = renderer.texture_count();

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(renderer),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        // Layout settles before anything is drawn.
        self.state.apply_pending(&mut renderer.uploader(device, queue));
        self.state.gpu_textures = renderer.texture_count();

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(device, queue, &view, &self.state.camera, &self.state.gallery);

        let viewport = (config.width as f32, config.height as f32);
        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, viewport);
        });
        if self.egui_ctx.wants_keyboard_input() {
            self.state.input.clear();
        }

        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let (Some(device), Some(queue), Some(renderer)) =
            (&self.device, &self.queue, &mut self.renderer)
        {
            self.state.teardown(&mut renderer.uploader(device, queue));
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.set_viewport(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused.
                self.state.input.clear();
                self.state.mouse_captured = false;
            }
            WindowEvent::DroppedFile(path) => {
                tracing::debug!("file dropped: {}", path.display());
                self.state.pending_files.push(path);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(window) = &self.window {
                    window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = GalleryConfig::load_or_default(cli.config.as_deref())?;
    tracing::info!(images = cli.images.len(), "gallery-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(&config, cli.images)?);
    event_loop.run_app(&mut app)?;

    Ok(())
}
