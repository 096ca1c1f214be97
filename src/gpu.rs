// src/gpu.rs
// Global GPU context helpers and utilities
// Exists to share wgpu device creation across the renderer, binaries and tests
// RELEVANT FILES: src/path_tracing/compute.rs, src/path_tracing/offscreen.rs

use once_cell::sync::OnceCell;
use std::sync::Arc;

pub struct GpuContext {
    pub instance: Arc<wgpu::Instance>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter: Arc<wgpu::Adapter>,
}

static CTX: OnceCell<Option<GpuContext>> = OnceCell::new();

fn backends_from_env() -> wgpu::Backends {
    use std::env;
    if let Ok(s) = env::var("WGPU_BACKENDS").or_else(|_| env::var("WGPU_BACKEND")) {
        let s_l = s.to_lowercase();
        if s_l.contains("metal") {
            return wgpu::Backends::METAL;
        }
        if s_l.contains("vulkan") {
            return wgpu::Backends::VULKAN;
        }
        if s_l.contains("dx12") {
            return wgpu::Backends::DX12;
        }
        if s_l.contains("gl") {
            return wgpu::Backends::GL;
        }
    }
    wgpu::Backends::all()
}

fn init_context() -> Option<GpuContext> {
    let instance = Arc::new(wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: backends_from_env(),
        ..Default::default()
    }));
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;

    let mut limits = adapter.limits();
    let baseline = wgpu::Limits::downlevel_defaults();
    limits = limits.using_resolution(baseline);
    // The kernel binds spheres, triangles, nodes, indices and counters in one stage.
    let desired_storage_buffers = 8;
    limits.max_storage_buffers_per_shader_stage = limits
        .max_storage_buffers_per_shader_stage
        .max(desired_storage_buffers);
    let desired_storage_textures = 4;
    limits.max_storage_textures_per_shader_stage = limits
        .max_storage_textures_per_shader_stage
        .max(desired_storage_textures);

    let required_features =
        adapter.features() & wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            required_features,
            required_limits: limits,
            label: Some("lumen3d-device"),
        },
        None,
    ))
    .ok()?;

    Some(GpuContext {
        instance,
        device: Arc::new(device),
        queue: Arc::new(queue),
        adapter: Arc::new(adapter),
    })
}

/// Shared GPU context, or None when no suitable adapter exists.
/// Tests use this to skip GPU coverage on headless CI machines.
pub fn try_ctx() -> Option<&'static GpuContext> {
    CTX.get_or_init(init_context).as_ref()
}

/// Shared GPU context. Panics when no adapter is available.
pub fn ctx() -> &'static GpuContext {
    try_ctx().expect("No suitable GPU adapter")
}

/// Align to WebGPU's required bytes-per-row for copies.
#[inline]
pub fn align_copy_bpr(unpadded: u32) -> u32 {
    let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + a - 1) / a) * a
}
