// src/viewer/mod.rs
// Interactive viewer: winit window + surface, continuous redraw, keyboard
// mapping onto RenderSettings. The renderer itself stays host-agnostic;
// this module owns the swapchain and the event loop.
// RELEVANT FILES:src/path_tracing/mod.rs,src/bin/viewer.rs,src/scene/loader.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::path_tracing::{Renderer, MAX_SAMPLES_PER_PIXEL};
use crate::scene::loader;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Scene manifests cycled with Tab; the first one loads at startup.
    pub scene_paths: Vec<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            title: "lumen3d".to_string(),
            scene_paths: Vec::new(),
        }
    }
}

struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    scene_paths: Vec<PathBuf>,
    scene_index: usize,
}

impl ViewerState {
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter for the window surface")?;

        let mut limits = adapter.limits().using_resolution(wgpu::Limits::downlevel_defaults());
        limits.max_storage_buffers_per_shader_stage =
            limits.max_storage_buffers_per_shader_stage.max(8);
        limits.max_storage_textures_per_shader_stage =
            limits.max_storage_textures_per_shader_stage.max(4);
        let required_features =
            adapter.features() & wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                required_features,
                required_limits: limits,
                label: Some("lumen3d-viewer-device"),
            },
            None,
        ))
        .context("request_device failed")?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let caps = surface.get_capabilities(&adapter);
        // Accumulated values are already display-ready; prefer a non-sRGB
        // format so they are not re-encoded on present.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let mut renderer = Renderer::new(
            device.clone(),
            queue.clone(),
            surface_config.width,
            surface_config.height,
            format,
        )?;
        renderer.settings.samples_per_pixel = 1;

        let mut state = Self {
            window,
            surface,
            device,
            surface_config,
            renderer,
            scene_paths: config.scene_paths.clone(),
            scene_index: 0,
        };
        if !state.scene_paths.is_empty() {
            state.load_scene_at(0);
        } else {
            warn!("no scene manifests given; rendering a black frame (pass --scene <path>)");
        }
        Ok(state)
    }

    /// Load the manifest at `index`. A failing load keeps the previous
    /// scene intact and reports through the error sink.
    fn load_scene_at(&mut self, index: usize) {
        let path = &self.scene_paths[index];
        match loader::load_scene(path) {
            Ok(scene) => {
                if let Err(e) = self.renderer.load_scene(&scene) {
                    error!("uploading scene {}: {e}", path.display());
                    return;
                }
                self.scene_index = index;
                if let Some(stats) = self.renderer.bvh_stats() {
                    info!(
                        "{}: {} nodes, {} leaves, max depth {}",
                        path.display(),
                        stats.total_nodes,
                        stats.leaf_nodes,
                        stats.max_depth
                    );
                }
            }
            Err(e) => error!("loading scene {}: {e:#}", path.display()),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer.resize(width, height);
    }

    fn render(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(e) => {
                error!("surface error: {e:?}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        if let Err(e) = self.renderer.render_frame(&view) {
            error!("render frame failed: {e}");
        }
        frame.present();
    }

    fn handle_key(&mut self, key: KeyCode) {
        let settings = &mut self.renderer.settings;
        match key {
            KeyCode::Digit1 => settings.samples_per_pixel = 1,
            KeyCode::Digit2 => settings.samples_per_pixel = 2,
            KeyCode::Digit3 => settings.samples_per_pixel = 3,
            KeyCode::Digit4 => settings.samples_per_pixel = 4,
            KeyCode::Digit5 => settings.samples_per_pixel = 5,
            KeyCode::Digit6 => settings.samples_per_pixel = 6,
            KeyCode::Digit7 => settings.samples_per_pixel = 7,
            KeyCode::Digit8 => settings.samples_per_pixel = 8,
            KeyCode::Digit9 => settings.samples_per_pixel = 9,
            KeyCode::Digit0 => settings.samples_per_pixel = MAX_SAMPLES_PER_PIXEL,
            KeyCode::KeyB => {
                settings.debug_enabled = !settings.debug_enabled;
                info!("BVH debug overlay: {}", settings.debug_enabled);
            }
            KeyCode::BracketLeft => {
                settings.bvh_depth = settings.bvh_depth.saturating_sub(1);
                info!("BVH depth: {}", settings.bvh_depth);
            }
            KeyCode::BracketRight => {
                settings.bvh_depth += 1;
                info!("BVH depth: {}", settings.bvh_depth);
            }
            KeyCode::KeyR => settings.request_reset(),
            KeyCode::Tab => {
                if !self.scene_paths.is_empty() {
                    let next = (self.scene_index + 1) % self.scene_paths.len();
                    self.load_scene_at(next);
                }
            }
            _ => {}
        }
    }
}

/// Run the viewer until the window closes.
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("creating event loop")?;

    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.width as f64,
                config.height as f64,
            ))
            .build(&event_loop)
            .context("creating window")?,
    );

    let mut state: Option<ViewerState> = None;

    event_loop.run(move |event, elwt| match event {
        Event::Resumed => {
            if state.is_none() {
                match ViewerState::new(Arc::clone(&window), &config) {
                    Ok(s) => state = Some(s),
                    Err(e) => {
                        error!("viewer init failed: {e:#}");
                        elwt.exit();
                    }
                }
            }
        }
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                if let Some(s) = state.as_mut() {
                    s.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let (Some(s), PhysicalKey::Code(code)) =
                        (state.as_mut(), event.physical_key)
                    {
                        s.handle_key(code);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(s) = state.as_mut() {
                    s.render();
                    s.window.request_redraw();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            elwt.set_control_flow(ControlFlow::Poll);
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
