// src/path_tracing/mod.rs
// Renderer: owns the pipelines, per-scene GPU resources and the per-frame
// sequence (uniforms -> compute -> accumulate -> optional overlay).
// Pipelines are created once; scene buffers are rebuilt on scene change;
// the uniform buffer is the only buffer rewritten every frame.
// RELEVANT FILES:src/path_tracing/compute.rs,src/path_tracing/accum.rs,src/shaders/pt_kernel.wgsl

pub mod accum;
pub mod compute;
pub mod counters;
pub mod cpu;
pub mod gpu_types;
pub mod intersect;
pub mod offscreen;
pub mod overlay;
pub mod pack;
pub mod rng;

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::accel::{build_bvh, flatten, wireframe_vertices, BuildOptions, BuildStats, BvhTree};
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::path_tracing::accum::AccumPipeline;
use crate::path_tracing::compute::KernelPipeline;
use crate::path_tracing::counters::PerfCounters;
use crate::path_tracing::gpu_types::{
    OverlayUniforms, Uniforms, COUNTER_SPHERE_TESTS, COUNTER_STACK_CLAMPS, COUNTER_TRIANGLE_TESTS,
};
use crate::path_tracing::overlay::OverlayPipeline;
use crate::path_tracing::pack::pack_scene;
use crate::scene::Scene;

pub use cpu::TracerParams;

use wgpu::util::DeviceExt;

/// Upper bound for the samples-per-pixel control.
pub const MAX_SAMPLES_PER_PIXEL: u32 = 16;

/// Mutable control knobs exposed to the UI. Persistence across sessions
/// is out of scope.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Clamped to [1, MAX_SAMPLES_PER_PIXEL] each frame.
    pub samples_per_pixel: u32,
    pub debug_enabled: bool,
    /// Wireframe depth cutoff; values above the tree depth show everything.
    pub bvh_depth: u32,
    reset_requested: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            debug_enabled: false,
            bvh_depth: 0,
            reset_requested: false,
        }
    }
}

impl RenderSettings {
    /// Restart accumulation on the next frame. No in-flight resources are
    /// touched; frame_index simply goes back to zero before dispatch.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }
}

struct FrameTargets {
    width: u32,
    height: u32,
    output_bind_group: wgpu::BindGroup,
    accum_bind_group: wgpu::BindGroup,
    _estimate: wgpu::Texture,
    _accum: [wgpu::Texture; 3],
}

struct SceneResources {
    scene_bind_group: wgpu::BindGroup,
    wire_vertex_buffer: wgpu::Buffer,
    wire_vertex_count: u32,
    wire_depth: u32,
    tree: BvhTree,
    camera: Camera,
    _spheres: wgpu::Buffer,
    _triangles: wgpu::Buffer,
    _nodes: wgpu::Buffer,
    _indices: wgpu::Buffer,
}

pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    kernel: KernelPipeline,
    accum: AccumPipeline,
    overlay: OverlayPipeline,
    counters: PerfCounters,
    uniform_buffer: wgpu::Buffer,
    overlay_uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    overlay_bind_group: wgpu::BindGroup,
    targets: FrameTargets,
    scene: Option<SceneResources>,
    pub settings: RenderSettings,
    frame_index: u32,
    counter_window: Instant,
    frames_in_window: u32,
}

impl Renderer {
    /// Create all pipelines and frame targets. `target_format` is the
    /// format of the view later passed to [`Renderer::render_frame`].
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        width: u32,
        height: u32,
        target_format: wgpu::TextureFormat,
    ) -> RenderResult<Self> {
        let kernel = KernelPipeline::new(&device)?;
        let accum = AccumPipeline::new(&device, target_format)?;
        let overlay = OverlayPipeline::new(&device, target_format)?;
        let counters = PerfCounters::new(&device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pt-uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let overlay_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay-uniforms"),
            size: std::mem::size_of::<OverlayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = kernel.create_uniform_bind_group(&device, &uniform_buffer);
        let overlay_bind_group = overlay.create_bind_group(&device, &overlay_uniform_buffer);

        let targets = Self::create_targets(&device, &kernel, &accum, &uniform_buffer, width, height);

        Ok(Self {
            device,
            queue,
            kernel,
            accum,
            overlay,
            counters,
            uniform_buffer,
            overlay_uniform_buffer,
            uniform_bind_group,
            overlay_bind_group,
            targets,
            scene: None,
            settings: RenderSettings::default(),
            frame_index: 0,
            counter_window: Instant::now(),
            frames_in_window: 0,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        kernel: &KernelPipeline,
        accum: &AccumPipeline,
        uniform_buffer: &wgpu::Buffer,
        width: u32,
        height: u32,
    ) -> FrameTargets {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let estimate = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pt-estimate"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let estimate_view = estimate.create_view(&wgpu::TextureViewDescriptor::default());

        let make_accum = |label: &str| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R32Float,
                usage: wgpu::TextureUsages::STORAGE_BINDING,
                view_formats: &[],
            })
        };
        let accum_r = make_accum("accum-r");
        let accum_g = make_accum("accum-g");
        let accum_b = make_accum("accum-b");
        let accum_r_view = accum_r.create_view(&wgpu::TextureViewDescriptor::default());
        let accum_g_view = accum_g.create_view(&wgpu::TextureViewDescriptor::default());
        let accum_b_view = accum_b.create_view(&wgpu::TextureViewDescriptor::default());

        let output_bind_group = kernel.create_output_bind_group(device, &estimate_view);
        let accum_bind_group = accum.create_bind_group(
            device,
            uniform_buffer,
            &estimate_view,
            &accum_r_view,
            &accum_g_view,
            &accum_b_view,
        );

        FrameTargets {
            width,
            height,
            output_bind_group,
            accum_bind_group,
            _estimate: estimate,
            _accum: [accum_r, accum_g, accum_b],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if self.targets.width == width && self.targets.height == height {
            return;
        }
        self.targets = Self::create_targets(
            &self.device,
            &self.kernel,
            &self.accum,
            &self.uniform_buffer,
            width,
            height,
        );
        self.frame_index = 0;
    }

    /// Rebuild the BVH and all scene buffers. Pipelines and frame targets
    /// survive; accumulation restarts.
    pub fn load_scene(&mut self, scene: &Scene) -> RenderResult<()> {
        let tree = build_bvh(&scene.triangles, &BuildOptions::default());
        let flat = flatten(&tree);
        let packed = pack_scene(scene, &flat);

        let make_storage = |label: &str, contents: &[u8]| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage: wgpu::BufferUsages::STORAGE,
                })
        };
        let spheres = make_storage("scene-spheres", bytemuck::cast_slice(&packed.spheres));
        let triangles = make_storage("scene-triangles", bytemuck::cast_slice(&packed.triangles));
        let nodes = make_storage("scene-bvh-nodes", bytemuck::cast_slice(&flat.nodes));
        let indices = make_storage(
            "scene-tri-indices",
            bytemuck::cast_slice(&packed.triangle_indices),
        );

        let scene_bind_group = self.kernel.create_scene_bind_group(
            &self.device,
            &spheres,
            &triangles,
            &nodes,
            &indices,
            self.counters.buffer(),
        );

        let wire_depth = self.settings.bvh_depth;
        let (wire_vertex_buffer, wire_vertex_count) =
            create_wire_buffer(&self.device, &tree, wire_depth);

        self.scene = Some(SceneResources {
            scene_bind_group,
            wire_vertex_buffer,
            wire_vertex_count,
            wire_depth,
            tree,
            camera: scene.camera,
            _spheres: spheres,
            _triangles: triangles,
            _nodes: nodes,
            _indices: indices,
        });
        self.frame_index = 0;
        Ok(())
    }

    pub fn bvh_stats(&self) -> Option<&BuildStats> {
        self.scene.as_ref().map(|s| &s.tree.stats)
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.scene.as_ref().map(|s| &s.camera)
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Render one frame into `target`: apply settings, write uniforms,
    /// compute pass, accumulation pass, optional overlay, submit.
    pub fn render_frame(&mut self, target: &wgpu::TextureView) -> RenderResult<()> {
        self.settings.samples_per_pixel = self.settings.samples_per_pixel.clamp(1, MAX_SAMPLES_PER_PIXEL);
        if self.settings.take_reset() {
            self.frame_index = 0;
        }

        let Some(scene) = self.scene.as_mut() else {
            // No scene yet: just present black.
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("clear-encoder"),
                });
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            drop(_pass);
            self.queue.submit([encoder.finish()]);
            return Ok(());
        };

        if scene.wire_depth != self.settings.bvh_depth {
            let depth = self.settings.bvh_depth;
            let (buffer, count) = create_wire_buffer(&self.device, &scene.tree, depth);
            scene.wire_vertex_buffer = buffer;
            scene.wire_vertex_count = count;
            scene.wire_depth = depth;
        }

        let camera = scene.camera;
        let uniforms = Uniforms {
            cam_pos: camera.position.to_array(),
            _pad0: 0.0,
            cam_rot: camera.rotation.to_array(),
            _pad1: 0.0,
            fov: camera.fov,
            near_plane: camera.near_plane,
            far_plane: camera.far_plane,
            _pad2: [0.0; 2],
            frame_index: self.frame_index,
            _pad3: 0,
            res_w: self.targets.width,
            res_h: self.targets.height,
            samples_per_pixel: self.settings.samples_per_pixel,
            debug_enabled: self.settings.debug_enabled as u32,
            _pad4: 0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if self.settings.debug_enabled {
            let aspect = self.targets.width as f32 / self.targets.height as f32;
            let overlay_uniforms = OverlayUniforms {
                view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            };
            self.queue.write_buffer(
                &self.overlay_uniform_buffer,
                0,
                bytemuck::bytes_of(&overlay_uniforms),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        self.kernel.record(
            &mut encoder,
            &self.uniform_bind_group,
            &scene.scene_bind_group,
            &self.targets.output_bind_group,
            self.targets.width,
            self.targets.height,
        );
        self.accum
            .record(&mut encoder, &self.targets.accum_bind_group, target);
        if self.settings.debug_enabled {
            self.overlay.record(
                &mut encoder,
                &self.overlay_bind_group,
                &scene.wire_vertex_buffer,
                scene.wire_vertex_count,
                target,
            );
        }

        self.queue.submit([encoder.finish()]);
        self.frame_index += 1;
        self.frames_in_window += 1;

        self.report_counters()?;
        Ok(())
    }

    /// Once per second: read + reset the perf counters and log rates.
    fn report_counters(&mut self) -> RenderResult<()> {
        let elapsed = self.counter_window.elapsed();
        if elapsed.as_secs_f32() < 1.0 {
            return Ok(());
        }
        let snapshot = self.counters.read_and_reset(&self.device, &self.queue)?;
        let frames = self.frames_in_window.max(1) as f32;
        let fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        // tests/sec = per-frame counter value * fps.
        info!(
            "{:.1} fps, {:.2}M triangle tests/s, {:.2}M sphere tests/s",
            fps,
            snapshot[COUNTER_TRIANGLE_TESTS] as f32 / frames * fps / 1.0e6,
            snapshot[COUNTER_SPHERE_TESTS] as f32 / frames * fps / 1.0e6,
        );
        if snapshot[COUNTER_STACK_CLAMPS] > 0 {
            debug!(
                "traversal stack clamped {} times this window",
                snapshot[COUNTER_STACK_CLAMPS]
            );
        }
        self.counter_window = Instant::now();
        self.frames_in_window = 0;
        Ok(())
    }
}

fn create_wire_buffer(device: &wgpu::Device, tree: &BvhTree, depth: u32) -> (wgpu::Buffer, u32) {
    let vertices = wireframe_vertices(tree, depth);
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("bvh-wireframe"),
        contents: if vertices.is_empty() {
            &[0u8; 24]
        } else {
            bytemuck::cast_slice(&vertices)
        },
        usage: wgpu::BufferUsages::VERTEX,
    });
    (buffer, vertices.len() as u32)
}
