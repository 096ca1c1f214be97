// src/path_tracing/gpu_types.rs
// Contractual GPU byte layouts. The WGSL kernel reads these unchanged, so
// every struct here is Pod with explicit padding to 16-byte vec slots.
// Sizes: Sphere 64, Triangle 96, FlatNode 48 (accel/types.rs), Uniforms 80.
// RELEVANT FILES:src/shaders/pt_kernel.wgsl,src/path_tracing/pack.rs,src/accel/types.rs

use bytemuck::{Pod, Zeroable};

/// 64-byte sphere slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereGpu {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub smoothness: f32,
    pub emission_color: [f32; 3],
    pub emission_strength: f32,
    pub specular_probability: f32,
    pub _pad: [f32; 3],
}

/// 96-byte triangle slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TriangleGpu {
    pub v0: [f32; 3],
    pub _pad0: f32,
    pub v1: [f32; 3],
    pub _pad1: f32,
    pub v2: [f32; 3],
    pub _pad2: f32,
    pub color: [f32; 3],
    pub _pad3: f32,
    pub emission_color: [f32; 3],
    pub emission_strength: f32,
    pub smoothness: f32,
    pub specular_probability: f32,
    pub _pad4: [f32; 2],
}

/// 80-byte per-frame uniform block, rewritten by the host before each
/// dispatch.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub cam_pos: [f32; 3],
    pub _pad0: f32,
    pub cam_rot: [f32; 3],
    pub _pad1: f32,
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub _pad2: [f32; 2],
    pub frame_index: u32,
    pub _pad3: u32,
    pub res_w: u32,
    pub res_h: u32,
    pub samples_per_pixel: u32,
    pub debug_enabled: u32,
    pub _pad4: u32,
}

/// Overlay pass uniform: a single view-projection matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Number of u32 slots in the performance-counter buffer.
pub const COUNTER_SLOTS: usize = 8;

pub const COUNTER_TRIANGLE_TESTS: usize = 0;
pub const COUNTER_SPHERE_TESTS: usize = 1;
pub const COUNTER_STACK_CLAMPS: usize = 2;
