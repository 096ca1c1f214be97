// src/path_tracing/pack.rs
// Packs a world-space scene and its flat BVH into the byte layouts the
// kernel reads. Triangles keep scene order; only the BVH index array is
// reordered, so light-sampling indices stay deterministic.
// RELEVANT FILES:src/path_tracing/gpu_types.rs,src/accel/flatten.rs,src/shaders/pt_kernel.wgsl

use bytemuck::Zeroable;

use crate::accel::FlatBvh;
use crate::path_tracing::gpu_types::{SphereGpu, TriangleGpu};
use crate::scene::{Scene, Sphere, Triangle};

pub fn pack_sphere(sphere: &Sphere) -> SphereGpu {
    let m = &sphere.material;
    SphereGpu {
        center: sphere.center.to_array(),
        radius: sphere.radius,
        color: m.color.to_array(),
        smoothness: m.smoothness,
        emission_color: m.emission_color.to_array(),
        emission_strength: m.emission_strength,
        specular_probability: m.specular_probability,
        _pad: [0.0; 3],
    }
}

pub fn pack_triangle(tri: &Triangle) -> TriangleGpu {
    let m = &tri.material;
    TriangleGpu {
        v0: tri.v0.to_array(),
        _pad0: 0.0,
        v1: tri.v1.to_array(),
        _pad1: 0.0,
        v2: tri.v2.to_array(),
        _pad2: 0.0,
        color: m.color.to_array(),
        _pad3: 0.0,
        emission_color: m.emission_color.to_array(),
        emission_strength: m.emission_strength,
        smoothness: m.smoothness,
        specular_probability: m.specular_probability,
        _pad4: [0.0; 2],
    }
}

/// GPU-ready scene arrays. Empty lists are padded with a single zeroed
/// slot because wgpu rejects zero-sized bindings; the uniform counts keep
/// the kernel from reading the padding.
#[derive(Debug, Clone)]
pub struct PackedScene {
    pub spheres: Vec<SphereGpu>,
    pub triangles: Vec<TriangleGpu>,
    pub sphere_count: u32,
    pub triangle_count: u32,
    pub triangle_indices: Vec<u32>,
}

pub fn pack_scene(scene: &Scene, bvh: &FlatBvh) -> PackedScene {
    let sphere_count = scene.spheres.len() as u32;
    let triangle_count = scene.triangles.len() as u32;

    let mut spheres: Vec<SphereGpu> = scene.spheres.iter().map(pack_sphere).collect();
    if spheres.is_empty() {
        spheres.push(SphereGpu::zeroed());
    }

    let mut triangles: Vec<TriangleGpu> = scene.triangles.iter().map(pack_triangle).collect();
    if triangles.is_empty() {
        triangles.push(TriangleGpu::zeroed());
    }

    let mut triangle_indices = bvh.triangle_indices.clone();
    if triangle_indices.is_empty() {
        triangle_indices.push(0);
    }

    PackedScene {
        spheres,
        triangles,
        sphere_count,
        triangle_count,
        triangle_indices,
    }
}
